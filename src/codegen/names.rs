//! Symbol naming and type rendering for emitted Go.
//!
//! Every user name gets a prefix so it can never collide with a Go keyword,
//! a predeclared identifier or a compiler temporary.

use crate::types::type_def::{DataType, FunctionType, Scalar};

pub fn local(name: &str) -> String {
    format!("_{}", name)
}

pub fn global(name: &str) -> String {
    format!("G_{}", name)
}

pub fn function(name: &str) -> String {
    format!("F_{}", name)
}

pub fn method(name: &str) -> String {
    format!("M_{}", name)
}

/// Struct fields are exported: first letter uppercased
pub fn field(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Compiler temporary; user names never start with an underscore
pub fn temp(prefix: &str, n: usize) -> String {
    format!("__{}{}", prefix, n)
}

/// Renders semantic types as Go types
#[derive(Debug, Clone)]
pub struct TypeRenderer {
    alias: String,
}

impl TypeRenderer {
    pub fn new(runtime_alias: &str) -> Self {
        Self {
            alias: runtime_alias.to_string(),
        }
    }

    pub fn render(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Scalar(scalar) => match scalar {
                Scalar::I => "int64".to_string(),
                Scalar::F => "float64".to_string(),
                Scalar::Byte => "byte".to_string(),
                Scalar::Bool => "bool".to_string(),
                Scalar::Str => "string".to_string(),
                Scalar::Err => "error".to_string(),
                Scalar::Any | Scalar::Type => "interface{}".to_string(),
            },
            DataType::List(element) => format!("*{}.List[{}]", self.alias, self.render(element)),
            DataType::Slice(element) => format!("[]{}", self.render(element)),
            DataType::Channel(element) => format!("chan {}", self.render(element)),
            DataType::Pointer(target) => format!("*{}", self.render(target)),
            DataType::Map(key, value) => {
                format!("map[{}]{}", self.render(key), self.render(value))
            }
            DataType::Array(size, element) => format!("[{}]{}", size, self.render(element)),
            DataType::Function(signature) => format!("func{}", self.signature(signature)),
            DataType::Struct(name) | DataType::Interface(name) => name.clone(),
            DataType::Nil => "interface{}".to_string(),
        }
    }

    /// `(A, B) R` for a function type, parameters unnamed
    pub fn signature(&self, signature: &FunctionType) -> String {
        let params: Vec<String> = signature.params.iter().map(|p| self.render(p)).collect();
        format!("({}){}", params.join(", "), self.results(&signature.return_types))
    }

    /// Result list with its leading space: ``, ` T` or ` (T, U)`
    pub fn results(&self, return_types: &[DataType]) -> String {
        match return_types {
            [] => String::new(),
            [single] => format!(" {}", self.render(single)),
            many => {
                let rendered: Vec<String> = many.iter().map(|t| self.render(t)).collect();
                format!(" ({})", rendered.join(", "))
            }
        }
    }
}

/// Re-quote a string literal's contents as a Go interpreted string.
///
/// Escapes Go also understands pass through; a backslash before anything
/// else is kept literally.
pub fn quote(contents: &str) -> String {
    let mut quoted = String::with_capacity(contents.len() + 2);
    quoted.push('"');
    let mut chars = contents.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            quoted.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\' | '"')) => {
                quoted.push('\\');
                quoted.push(next);
            }
            Some('\'') => quoted.push('\''),
            Some(other) => {
                quoted.push_str("\\\\");
                quoted.push(other);
            }
            None => quoted.push_str("\\\\"),
        }
    }
    quoted.push('"');
    quoted
}

/// Render verbatim multi-line contents as a Go interpreted string
pub fn escape_verbatim(contents: &str) -> String {
    let mut quoted = String::with_capacity(contents.len() + 2);
    quoted.push('"');
    for c in contents.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prefixes() {
        assert_eq!(local("count"), "_count");
        assert_eq!(global("limit"), "G_limit");
        assert_eq!(function("main"), "F_main");
        assert_eq!(method("speak"), "M_speak");
        assert_eq!(field("name"), "Name");
        assert_eq!(temp("loop", 3), "__loop3");
    }

    #[test]
    fn test_type_rendering() {
        let types = TypeRenderer::new("rt");
        assert_eq!(types.render(&DataType::list(DataType::INT)), "*rt.List[int64]");
        assert_eq!(
            types.render(&DataType::map(DataType::STR, DataType::slice(DataType::BYTE))),
            "map[string][]byte"
        );
        assert_eq!(
            types.render(&DataType::Array(4, Box::new(DataType::pointer(DataType::Struct("Dog".into()))))),
            "[4]*Dog"
        );
        assert_eq!(
            types.render(&DataType::Function(FunctionType::new(
                vec![DataType::INT, DataType::STR],
                vec![DataType::BOOL, DataType::ERR]
            ))),
            "func(int64, string) (bool, error)"
        );
        assert_eq!(types.render(&DataType::channel(DataType::ANY)), "chan interface{}");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("hi"), "\"hi\"");
        assert_eq!(quote(r#"a\nb\"c"#), r#""a\nb\"c""#);
        assert_eq!(quote(r"it\'s"), "\"it's\"");
        assert_eq!(quote(r"\d"), r#""\\d""#);
    }

    #[test]
    fn test_escape_verbatim() {
        assert_eq!(escape_verbatim("a\n\"b\"\\"), r#""a\n\"b\"\\""#);
    }
}
