//! Resolution of syntactic types to semantic types.

use std::collections::HashSet;

use super::package::Package;
use crate::error::{PigeonError, PigeonResult};
use crate::parser::ast::ParsedDataType;
use crate::types::type_def::{DataType, FunctionType, Scalar};

/// The user-declared type names visible to resolution
#[derive(Debug, Clone, Default)]
pub struct TypeNames {
    structs: HashSet<String>,
    interfaces: HashSet<String>,
    /// Structs with a member that cannot be compared
    incomparable: HashSet<String>,
}

impl TypeNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_package(package: &Package) -> Self {
        let mut names = Self {
            structs: package.structs.keys().cloned().collect(),
            interfaces: package.interfaces.keys().cloned().collect(),
            incomparable: HashSet::new(),
        };
        names.mark_incomparable(package);
        names
    }

    /// Record which structs cannot be compared; needs materialized members
    pub fn mark_incomparable(&mut self, package: &Package) {
        self.incomparable = package
            .structs
            .keys()
            .filter(|name| !package.is_comparable(&DataType::Struct(name.to_string())))
            .cloned()
            .collect();
    }

    /// Whether `data_type` may be used as a map key
    pub fn is_comparable(&self, data_type: &DataType) -> bool {
        match data_type {
            DataType::Array(_, element) => self.is_comparable(element),
            DataType::Struct(name) => !self.incomparable.contains(name),
            other => other.is_comparable(),
        }
    }

    pub fn declare_struct(&mut self, name: &str) {
        self.structs.insert(name.to_string());
    }

    pub fn declare_interface(&mut self, name: &str) {
        self.interfaces.insert(name.to_string());
    }

    /// Resolve a parsed type, enforcing the arity of built-in constructors
    pub fn resolve(&self, parsed: &ParsedDataType) -> PigeonResult<DataType> {
        let name = parsed.name.as_str();

        if name != "Fn" && !parsed.return_types.is_empty() {
            return Err(error(parsed, format!("only Fn types take return types, found {}", parsed)));
        }

        if let Some(scalar) = Scalar::from_str(name) {
            self.expect_params(parsed, 0)?;
            return Ok(DataType::Scalar(scalar));
        }

        match name {
            "L" => Ok(DataType::list(self.single_param(parsed)?)),
            "S" => Ok(DataType::slice(self.single_param(parsed)?)),
            "Ch" => Ok(DataType::channel(self.single_param(parsed)?)),
            "P" => Ok(DataType::pointer(self.single_param(parsed)?)),
            "M" => {
                self.expect_params(parsed, 2)?;
                let key = self.resolve(&parsed.params[0])?;
                if !self.is_comparable(&key) {
                    return Err(error(
                        &parsed.params[0],
                        format!("map key type {} is not comparable", key),
                    ));
                }
                let value = self.resolve(&parsed.params[1])?;
                Ok(DataType::map(key, value))
            }
            "A" => {
                self.expect_params(parsed, 2)?;
                let element = self.resolve(&parsed.params[0])?;
                let size_param = &parsed.params[1];
                let size = size_param
                    .name
                    .parse::<usize>()
                    .map_err(|_| error(size_param, "array size must be an integer literal"))?;
                Ok(DataType::Array(size, Box::new(element)))
            }
            "Fn" => {
                let params = parsed
                    .params
                    .iter()
                    .map(|p| self.resolve(p))
                    .collect::<PigeonResult<Vec<_>>>()?;
                let return_types = parsed
                    .return_types
                    .iter()
                    .map(|p| self.resolve(p))
                    .collect::<PigeonResult<Vec<_>>>()?;
                Ok(DataType::Function(FunctionType::new(params, return_types)))
            }
            _ if self.structs.contains(name) => {
                self.expect_params(parsed, 0)?;
                Ok(DataType::Struct(name.to_string()))
            }
            _ if self.interfaces.contains(name) => {
                self.expect_params(parsed, 0)?;
                Ok(DataType::Interface(name.to_string()))
            }
            _ if name.starts_with(|c: char| c.is_ascii_digit() || c == '-') => {
                Err(error(parsed, format!("expected type, found number {}", name)))
            }
            _ => Err(PigeonError::semantic_error(
                format!("unknown type '{}'", name),
                parsed.location.clone(),
            )),
        }
    }

    fn single_param(&self, parsed: &ParsedDataType) -> PigeonResult<DataType> {
        self.expect_params(parsed, 1)?;
        self.resolve(&parsed.params[0])
    }

    fn expect_params(&self, parsed: &ParsedDataType, count: usize) -> PigeonResult<()> {
        if parsed.params.len() == count {
            return Ok(());
        }
        let message = match count {
            0 => format!("type {} takes no parameters", parsed.name),
            1 => format!("type {} requires exactly one type parameter", parsed.name),
            n => format!("type {} requires exactly {} type parameters", parsed.name, n),
        };
        Err(error(parsed, message))
    }
}

fn error(parsed: &ParsedDataType, message: impl Into<String>) -> PigeonError {
    PigeonError::semantic_error(message, parsed.location.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::ast::{Definition, ParsedPackage};
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    /// Parse `global g <type> nil` and hand back the parsed type
    fn parsed_type(text: &str) -> ParsedDataType {
        let source = format!("global g {} nil\n", text);
        let tokens = Lexer::new(&source, None).tokenize().unwrap();
        let ParsedPackage { definitions } = Parser::new(tokens).parse().unwrap();
        match definitions.into_iter().next() {
            Some(Definition::Global(g)) => g.data_type,
            other => panic!("unexpected {:?}", other),
        }
    }

    fn names() -> TypeNames {
        let mut names = TypeNames::new();
        names.declare_struct("Dog");
        names.declare_interface("Animal");
        names
    }

    fn resolve(text: &str) -> PigeonResult<DataType> {
        names().resolve(&parsed_type(text))
    }

    #[test]
    fn test_resolves_builtins() {
        assert_eq!(resolve("I").unwrap(), DataType::INT);
        assert_eq!(
            resolve("M<Str L<Dog>>").unwrap(),
            DataType::map(DataType::STR, DataType::list(DataType::Struct("Dog".into())))
        );
        assert_eq!(
            resolve("A<Animal 3>").unwrap(),
            DataType::Array(3, Box::new(DataType::Interface("Animal".into())))
        );
        assert_eq!(
            resolve("Fn<I : Str Err>").unwrap(),
            DataType::Function(FunctionType::new(
                vec![DataType::INT],
                vec![DataType::STR, DataType::ERR]
            ))
        );
    }

    #[test]
    fn test_arity_errors() {
        assert_eq!(
            resolve("L<I Str>").unwrap_err().message(),
            "type L requires exactly one type parameter"
        );
        assert_eq!(
            resolve("M<Str>").unwrap_err().message(),
            "type M requires exactly 2 type parameters"
        );
        assert_eq!(resolve("I<Str>").unwrap_err().message(), "type I takes no parameters");
        assert_eq!(
            resolve("A<I Str>").unwrap_err().message(),
            "array size must be an integer literal"
        );
        assert_eq!(
            resolve("L<5>").unwrap_err().message(),
            "expected type, found number 5"
        );
        assert_eq!(
            resolve("M<S<I> I>").unwrap_err().message(),
            "map key type S<I> is not comparable"
        );
    }

    #[test]
    fn test_unknown_type() {
        let err = resolve("L<Cat>").unwrap_err();
        assert_eq!(err.message(), "unknown type 'Cat'");
        assert_eq!(err.location().unwrap().column, 12);
    }
}
