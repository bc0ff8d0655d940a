//! Abstract Syntax Tree definitions
//!
//! The untyped tree produced by the parser. Three disjoint families:
//! definitions (top level), statements (inside bodies) and expressions.

use crate::error::SourceLocation;
use crate::lexer::Operator;

/// Output of parsing one source file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedPackage {
    pub definitions: Vec<Definition>,
}

/// The syntactic form of a type: `Name`, `Name<P1 P2>`, `Fn<P1 : R1 R2>`.
///
/// A numeric parameter (the size of `A<T N>`) is kept as a parameter whose
/// name is the numeral.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDataType {
    pub name: String,
    pub params: Vec<ParsedDataType>,
    pub return_types: Vec<ParsedDataType>,
    pub location: SourceLocation,
}

impl ParsedDataType {
    pub fn simple(name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_types: Vec::new(),
            location,
        }
    }
}

impl std::fmt::Display for ParsedDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if self.params.is_empty() && self.return_types.is_empty() {
            return Ok(());
        }
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "<{}", params.join(" "))?;
        if !self.return_types.is_empty() {
            let returns: Vec<String> = self.return_types.iter().map(|r| r.to_string()).collect();
            if !params.is_empty() {
                write!(f, " ")?;
            }
            write!(f, ": {}", returns.join(" "))?;
        }
        write!(f, ">")
    }
}

/// A `name Type` pair: parameters, struct members, locals, loop variables
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub data_type: ParsedDataType,
    pub location: SourceLocation,
}

/// Top-level definition
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Import(ImportDefinition),
    Struct(StructDefinition),
    Interface(InterfaceDefinition),
    Method(MethodDefinition),
    Function(FunctionDefinition),
    Global(GlobalDefinition),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Import(d) => &d.name,
            Definition::Struct(d) => &d.name,
            Definition::Interface(d) => &d.name,
            Definition::Method(d) => &d.name,
            Definition::Function(d) => &d.name,
            Definition::Global(d) => &d.name,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Definition::Import(d) => &d.location,
            Definition::Struct(d) => &d.location,
            Definition::Interface(d) => &d.location,
            Definition::Method(d) => &d.location,
            Definition::Function(d) => &d.location,
            Definition::Global(d) => &d.location,
        }
    }
}

/// `import "path" name` / `nativeimport "path" name`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDefinition {
    pub name: String,
    pub path: String,
    /// Explicit alias given in source
    pub alias: Option<String>,
    pub native: bool,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDefinition {
    pub name: String,
    pub members: Vec<Param>,
    /// Raw target code appended to the emitted struct (`nativestruct`)
    pub native_code: Option<String>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDefinition {
    pub name: String,
    pub methods: Vec<InterfaceMethod>,
    pub location: SourceLocation,
}

/// One method signature line of an interface
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMethod {
    pub name: String,
    pub params: Vec<ParsedDataType>,
    pub return_types: Vec<ParsedDataType>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub params: Vec<Param>,
    pub return_types: Vec<ParsedDataType>,
    pub body: Vec<Stmt>,
    /// Verbatim target body (`nativefunc`)
    pub native_code: Option<String>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    pub name: String,
    pub receiver: Param,
    pub params: Vec<Param>,
    pub return_types: Vec<ParsedDataType>,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDefinition {
    pub name: String,
    pub data_type: ParsedDataType,
    pub value: Expr,
    pub location: SourceLocation,
}

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `locals a I b Str`
    Locals {
        vars: Vec<Param>,
        location: SourceLocation,
    },

    /// Nested function bound to a local name
    LocalFunc {
        func: Box<FunctionDefinition>,
        location: SourceLocation,
    },

    If {
        condition: Expr,
        body: Vec<Stmt>,
        elseifs: Vec<ElseIf>,
        else_body: Option<Vec<Stmt>>,
        location: SourceLocation,
    },

    While {
        condition: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },

    /// `foreach i I v T collection`
    Foreach {
        index: Param,
        value: Param,
        collection: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },

    /// `forinc i I start end` / `fordec i I start end`
    Forinc {
        var: Param,
        start: Expr,
        end: Expr,
        descending: bool,
        body: Vec<Stmt>,
        location: SourceLocation,
    },

    Typeswitch {
        subject: Expr,
        cases: Vec<TypeCase>,
        default: Option<Vec<Stmt>>,
        location: SourceLocation,
    },

    Select {
        clauses: Vec<SelectClause>,
        default: Option<Vec<Stmt>>,
        location: SourceLocation,
    },

    /// `as t1 t2 value`
    Assignment {
        targets: Vec<Expr>,
        value: Expr,
        location: SourceLocation,
    },

    Return {
        values: Vec<Expr>,
        location: SourceLocation,
    },

    Break {
        location: SourceLocation,
    },

    Continue {
        location: SourceLocation,
    },

    Go {
        call: Expr,
        location: SourceLocation,
    },

    /// Bare call or whitelisted operation
    Expression {
        expr: Expr,
        location: SourceLocation,
    },
}

impl Stmt {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Stmt::Locals { location, .. }
            | Stmt::LocalFunc { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::Foreach { location, .. }
            | Stmt::Forinc { location, .. }
            | Stmt::Typeswitch { location, .. }
            | Stmt::Select { location, .. }
            | Stmt::Assignment { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Go { location, .. }
            | Stmt::Expression { location, .. } => location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// `case name Type` inside a typeswitch
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCase {
    pub binding: Param,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectKind {
    /// `sending channel value`
    Sending { channel: Expr, value: Expr },
    /// `rcving name Type channel`
    Rcving { binding: Param, channel: Expr },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub kind: SelectKind,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier {
        name: String,
        location: SourceLocation,
    },

    Literal {
        value: Literal,
        location: SourceLocation,
    },

    /// `(op operands...)`
    Operation {
        operator: Operator,
        operands: Vec<Expr>,
        location: SourceLocation,
    },

    /// `(fn args...)`
    FunctionCall {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        location: SourceLocation,
    },

    /// `(.method receiver args...)`
    MethodCall {
        method: String,
        receiver: Box<Expr>,
        arguments: Vec<Expr>,
        location: SourceLocation,
    },

    /// `(Type args...)`: construction or conversion
    TypeExpression {
        data_type: ParsedDataType,
        arguments: Vec<Expr>,
        location: SourceLocation,
    },

    /// A type used as a value (first operand of `istype`)
    DataType {
        data_type: ParsedDataType,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Expr::Identifier { location, .. }
            | Expr::Literal { location, .. }
            | Expr::Operation { location, .. }
            | Expr::FunctionCall { location, .. }
            | Expr::MethodCall { location, .. }
            | Expr::TypeExpression { location, .. }
            | Expr::DataType { location, .. } => location,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expr::FunctionCall { .. } | Expr::MethodCall { .. })
    }
}

/// Literal value, kept as source text
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Numerals, optional `-`, optional single `.`
    Number(String),
    /// Contents between the quotes, escapes untouched
    String(String),
    /// Contents between the `'''` delimiters
    MultiLineString(String),
    Boolean(bool),
    Nil,
}
