//! Runtime library surface
//!
//! Generated programs link against a fixed companion module. The compiler never
//! implements it; this module pins down the names the emitter is allowed to
//! reference so that every call site agrees on them.

use crate::lexer::Operator;

/// Import path of the runtime module
pub const DEFAULT_IMPORT_PATH: &str = "pigeon/stdlib";

/// Local alias under which emitted code refers to the runtime
pub const DEFAULT_ALIAS: &str = "rt";

/// Heap-backed list type: `*List[T]` with `Append`, `Get`, `Set`, `Len`
pub const LIST: &str = "List";

/// Variadic sink that marks values as used
pub const NO_OP: &str = "NoOp";

/// Rune count of a string
pub const STR_LEN: &str = "StrLen";

/// Condition test for boxed values (dynamic dialect)
pub const TRUTHY: &str = "Truthy";

/// Boxed list constructor (dynamic dialect)
pub const NEW_LIST: &str = "NewList";

/// Boxed map constructor (dynamic dialect)
pub const NEW_MAP: &str = "NewMap";

/// Boxed scalar conversion (dynamic dialect)
pub const CONVERT: &str = "Convert";

/// Key/value pairs of a boxed collection, as `[]Entry{Key, Value}` (dynamic dialect)
pub const ENTRIES: &str = "Entries";

/// Method names on the runtime list type
pub mod list {
    pub const APPEND: &str = "Append";
    pub const GET: &str = "Get";
    pub const SET: &str = "Set";
    pub const LEN: &str = "Len";
}

/// Runtime routine backing an operator in the static dialect.
///
/// Operators rendered with target-language syntax (arithmetic, comparison,
/// logic, indexing, channels) have no routine and return `None`.
pub fn operator_function(op: Operator) -> Option<&'static str> {
    let name = match op {
        Operator::Prompt => "Prompt",
        Operator::Floor => "Floor",
        Operator::Ceil => "Ceil",
        Operator::RandInt => "RandInt",
        Operator::RandIntN => "RandIntN",
        Operator::RandFloat => "RandFloat",
        Operator::ParseInt => "ParseInt",
        Operator::ParseFloat => "ParseFloat",
        Operator::FormatInt => "FormatInt",
        Operator::FormatFloat => "FormatFloat",
        Operator::TimeNow => "TimeNow",
        Operator::FormatTime => "FormatTime",
        Operator::ParseTime => "ParseTime",
        Operator::CreateFile => "CreateFile",
        Operator::OpenFile => "OpenFile",
        Operator::CloseFile => "CloseFile",
        Operator::ReadFile => "ReadFile",
        Operator::WriteFile => "WriteFile",
        Operator::SeekFile => "SeekFile",
        Operator::SeekFileStart => "SeekFileStart",
        Operator::SeekFileEnd => "SeekFileEnd",
        Operator::CharList => "Charlist",
        Operator::RuneList => "Runelist",
        Operator::CharSlice => "Charslice",
        Operator::RuneSlice => "Runeslice",
        _ => return None,
    };
    Some(name)
}

/// Which string conversion routine turns a sequence back into a `Str`.
///
/// `element_is_int` selects the rune form, otherwise the char form.
pub fn to_string_function(is_list: bool, element_is_int: bool) -> &'static str {
    match (is_list, element_is_int) {
        (true, true) => "Runelist2string",
        (true, false) => "Charlist2string",
        (false, true) => "Runeslice2string",
        (false, false) => "Charslice2string",
    }
}

/// Runtime helper that evaluates an operator over boxed values.
///
/// Used by the dynamic dialect, where every operand is `Any` and dispatch
/// happens on the runtime tag. The helper is the operator word with its first
/// letter uppercased: `add` becomes `Add`, `randIntN` becomes `RandIntN`.
pub fn dynamic_helper(op: Operator) -> String {
    let word = op.as_str();
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
