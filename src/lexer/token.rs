//! Token definitions for the Pigeon language
//!
//! A token is `(kind, content, line, column)`. Whitespace that matters to
//! the grammar (newlines, indentation, single spaces) is kept as tokens.

use crate::error::SourceLocation;
use std::fmt;

/// A token in the Pigeon language
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    /// Raw source text of the token (newline tokens hold `"\n"`)
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, lexeme: String, location: SourceLocation) -> Self {
        Self {
            token_type,
            lexeme,
            location,
        }
    }

    pub fn is(&self, token_type: &TokenType) -> bool {
        &self.token_type == token_type
    }
}

/// Token types in the Pigeon language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Reserved(Keyword),
    Operator(Operator),
    Identifier,
    /// Identifier whose first letter is uppercase
    TypeName,
    Number,
    String,
    MultiLineString,
    Boolean,
    Nil,

    Newline,
    Indentation,
    Space,

    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenAngle,
    CloseAngle,
    Dot,
    Colon,
    Comma,
}

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Func,
    Global,
    Struct,
    Interface,
    Import,
    NativeImport,
    NativeFunc,
    NativeStruct,
    Method,
    Foreach,
    Go,
    Typeswitch,
    Case,
    Default,
    Break,
    Continue,
    Forinc,
    Fordec,
    If,
    Else,
    Elseif,
    While,
    Return,
    As,
    Locals,
    LocalFunc,
    Select,
    Sending,
    Rcving,
}

impl Keyword {
    /// Get keyword from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "func" => Some(Self::Func),
            "global" => Some(Self::Global),
            "struct" => Some(Self::Struct),
            "interface" => Some(Self::Interface),
            "import" => Some(Self::Import),
            "nativeimport" => Some(Self::NativeImport),
            "nativefunc" => Some(Self::NativeFunc),
            "nativestruct" => Some(Self::NativeStruct),
            "method" => Some(Self::Method),
            "foreach" => Some(Self::Foreach),
            "go" => Some(Self::Go),
            "typeswitch" => Some(Self::Typeswitch),
            "case" => Some(Self::Case),
            "default" => Some(Self::Default),
            "break" => Some(Self::Break),
            "continue" => Some(Self::Continue),
            "forinc" => Some(Self::Forinc),
            "fordec" => Some(Self::Fordec),
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "elseif" => Some(Self::Elseif),
            "while" => Some(Self::While),
            "return" => Some(Self::Return),
            "as" => Some(Self::As),
            "locals" => Some(Self::Locals),
            "localfunc" => Some(Self::LocalFunc),
            "select" => Some(Self::Select),
            "sending" => Some(Self::Sending),
            "rcving" => Some(Self::Rcving),
            _ => None,
        }
    }

    /// Get string representation of keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Func => "func",
            Self::Global => "global",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Import => "import",
            Self::NativeImport => "nativeimport",
            Self::NativeFunc => "nativefunc",
            Self::NativeStruct => "nativestruct",
            Self::Method => "method",
            Self::Foreach => "foreach",
            Self::Go => "go",
            Self::Typeswitch => "typeswitch",
            Self::Case => "case",
            Self::Default => "default",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Forinc => "forinc",
            Self::Fordec => "fordec",
            Self::If => "if",
            Self::Else => "else",
            Self::Elseif => "elseif",
            Self::While => "while",
            Self::Return => "return",
            Self::As => "as",
            Self::Locals => "locals",
            Self::LocalFunc => "localfunc",
            Self::Select => "select",
            Self::Sending => "sending",
            Self::Rcving => "rcving",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator words. Their typing rules live in `types::operators`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,

    // Comparison
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,

    // Logical
    Not,
    And,
    Or,

    // Containers
    Get,
    Set,
    Push,
    Append,
    Slice,
    Len,

    // References
    Ref,
    Dr,

    // Bitwise
    Band,
    Bor,
    Bxor,
    Bnot,

    // I/O
    Print,
    Println,
    Prompt,

    // Strings and conversions
    Concat,
    GetChar,
    GetRune,
    CharList,
    RuneList,
    CharSlice,
    RuneSlice,
    ByteSlice,

    IsType,

    // Math and RNG
    RandInt,
    RandIntN,
    RandFloat,
    Floor,
    Ceil,

    // Parsing and formatting
    ParseInt,
    ParseFloat,
    FormatInt,
    FormatFloat,

    // Time
    TimeNow,
    FormatTime,
    ParseTime,

    // Files
    CreateFile,
    OpenFile,
    CloseFile,
    ReadFile,
    WriteFile,
    SeekFile,
    SeekFileStart,
    SeekFileEnd,

    // Channels
    Send,
    Rcv,
}

impl Operator {
    pub const ALL: [Operator; 62] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Inc,
        Self::Dec,
        Self::Eq,
        Self::Neq,
        Self::Lt,
        Self::Gt,
        Self::Lte,
        Self::Gte,
        Self::Not,
        Self::And,
        Self::Or,
        Self::Get,
        Self::Set,
        Self::Push,
        Self::Append,
        Self::Slice,
        Self::Len,
        Self::Ref,
        Self::Dr,
        Self::Band,
        Self::Bor,
        Self::Bxor,
        Self::Bnot,
        Self::Print,
        Self::Println,
        Self::Prompt,
        Self::Concat,
        Self::GetChar,
        Self::GetRune,
        Self::CharList,
        Self::RuneList,
        Self::CharSlice,
        Self::RuneSlice,
        Self::ByteSlice,
        Self::IsType,
        Self::RandInt,
        Self::RandIntN,
        Self::RandFloat,
        Self::Floor,
        Self::Ceil,
        Self::ParseInt,
        Self::ParseFloat,
        Self::FormatInt,
        Self::FormatFloat,
        Self::TimeNow,
        Self::FormatTime,
        Self::ParseTime,
        Self::CreateFile,
        Self::OpenFile,
        Self::CloseFile,
        Self::ReadFile,
        Self::WriteFile,
        Self::SeekFile,
        Self::SeekFileStart,
        Self::SeekFileEnd,
        Self::Send,
        Self::Rcv,
    ];

    /// Get operator from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "sub" => Some(Self::Sub),
            "mul" => Some(Self::Mul),
            "div" => Some(Self::Div),
            "mod" => Some(Self::Mod),
            "inc" => Some(Self::Inc),
            "dec" => Some(Self::Dec),
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "lt" => Some(Self::Lt),
            "gt" => Some(Self::Gt),
            "lte" => Some(Self::Lte),
            "gte" => Some(Self::Gte),
            "not" => Some(Self::Not),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "get" => Some(Self::Get),
            "set" => Some(Self::Set),
            "push" => Some(Self::Push),
            "append" => Some(Self::Append),
            "slice" => Some(Self::Slice),
            "len" => Some(Self::Len),
            "ref" => Some(Self::Ref),
            "dr" => Some(Self::Dr),
            "band" => Some(Self::Band),
            "bor" => Some(Self::Bor),
            "bxor" => Some(Self::Bxor),
            "bnot" => Some(Self::Bnot),
            "print" => Some(Self::Print),
            "println" => Some(Self::Println),
            "prompt" => Some(Self::Prompt),
            "concat" => Some(Self::Concat),
            "getchar" => Some(Self::GetChar),
            "getrune" => Some(Self::GetRune),
            "charlist" => Some(Self::CharList),
            "runelist" => Some(Self::RuneList),
            "charslice" => Some(Self::CharSlice),
            "runeslice" => Some(Self::RuneSlice),
            "byteslice" => Some(Self::ByteSlice),
            "istype" => Some(Self::IsType),
            "randInt" => Some(Self::RandInt),
            "randIntN" => Some(Self::RandIntN),
            "randFloat" => Some(Self::RandFloat),
            "floor" => Some(Self::Floor),
            "ceil" => Some(Self::Ceil),
            "parseInt" => Some(Self::ParseInt),
            "parseFloat" => Some(Self::ParseFloat),
            "formatInt" => Some(Self::FormatInt),
            "formatFloat" => Some(Self::FormatFloat),
            "timeNow" => Some(Self::TimeNow),
            "formatTime" => Some(Self::FormatTime),
            "parseTime" => Some(Self::ParseTime),
            "createFile" => Some(Self::CreateFile),
            "openFile" => Some(Self::OpenFile),
            "closeFile" => Some(Self::CloseFile),
            "readFile" => Some(Self::ReadFile),
            "writeFile" => Some(Self::WriteFile),
            "seekFile" => Some(Self::SeekFile),
            "seekFileStart" => Some(Self::SeekFileStart),
            "seekFileEnd" => Some(Self::SeekFileEnd),
            "send" => Some(Self::Send),
            "rcv" => Some(Self::Rcv),
            _ => None,
        }
    }

    /// Get string representation of operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Inc => "inc",
            Self::Dec => "dec",
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Lte => "lte",
            Self::Gte => "gte",
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::Get => "get",
            Self::Set => "set",
            Self::Push => "push",
            Self::Append => "append",
            Self::Slice => "slice",
            Self::Len => "len",
            Self::Ref => "ref",
            Self::Dr => "dr",
            Self::Band => "band",
            Self::Bor => "bor",
            Self::Bxor => "bxor",
            Self::Bnot => "bnot",
            Self::Print => "print",
            Self::Println => "println",
            Self::Prompt => "prompt",
            Self::Concat => "concat",
            Self::GetChar => "getchar",
            Self::GetRune => "getrune",
            Self::CharList => "charlist",
            Self::RuneList => "runelist",
            Self::CharSlice => "charslice",
            Self::RuneSlice => "runeslice",
            Self::ByteSlice => "byteslice",
            Self::IsType => "istype",
            Self::RandInt => "randInt",
            Self::RandIntN => "randIntN",
            Self::RandFloat => "randFloat",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::ParseInt => "parseInt",
            Self::ParseFloat => "parseFloat",
            Self::FormatInt => "formatInt",
            Self::FormatFloat => "formatFloat",
            Self::TimeNow => "timeNow",
            Self::FormatTime => "formatTime",
            Self::ParseTime => "parseTime",
            Self::CreateFile => "createFile",
            Self::OpenFile => "openFile",
            Self::CloseFile => "closeFile",
            Self::ReadFile => "readFile",
            Self::WriteFile => "writeFile",
            Self::SeekFile => "seekFile",
            Self::SeekFileStart => "seekFileStart",
            Self::SeekFileEnd => "seekFileEnd",
            Self::Send => "send",
            Self::Rcv => "rcv",
        }
    }

    /// Operators allowed as a bare expression-statement
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::Set
                | Self::Push
                | Self::Print
                | Self::Println
                | Self::Prompt
                | Self::Send
                | Self::Rcv
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved(kw) => write!(f, "reserved word '{}'", kw),
            Self::Operator(op) => write!(f, "operator '{}'", op),
            Self::Identifier => write!(f, "identifier"),
            Self::TypeName => write!(f, "type name"),
            Self::Number => write!(f, "number literal"),
            Self::String => write!(f, "string literal"),
            Self::MultiLineString => write!(f, "multi-line string literal"),
            Self::Boolean => write!(f, "boolean literal"),
            Self::Nil => write!(f, "nil"),
            Self::Newline => write!(f, "newline"),
            Self::Indentation => write!(f, "indentation"),
            Self::Space => write!(f, "space"),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::OpenSquare => write!(f, "["),
            Self::CloseSquare => write!(f, "]"),
            Self::OpenAngle => write!(f, "<"),
            Self::CloseAngle => write!(f, ">"),
            Self::Dot => write!(f, "."),
            Self::Colon => write!(f, ":"),
            Self::Comma => write!(f, ","),
        }
    }
}
