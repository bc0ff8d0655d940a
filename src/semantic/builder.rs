//! Semantic model builder
//!
//! Turns the parsed definitions into a `Package`: checks the top-level
//! namespace, materializes structs, rejects recursive containment, attaches
//! methods and computes which interfaces each struct implements.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use super::package::{
    Function, Global, Import, Interface, Member, Method, Package, Struct, Variable,
};
use super::resolve::TypeNames;
use crate::config::CompilerConfig;
use crate::error::{PigeonError, PigeonResult, SourceLocation};
use crate::parser::ast::*;
use crate::types::type_def::{is_builtin_name, DataType, FunctionType};

/// Build the package model from a parsed file
pub fn build(parsed: ParsedPackage, config: &CompilerConfig) -> PigeonResult<Package> {
    Builder::new(config).build(parsed)
}

struct Builder<'a> {
    config: &'a CompilerConfig,
    package: Package,
    names: TypeNames,
}

impl<'a> Builder<'a> {
    fn new(config: &'a CompilerConfig) -> Self {
        Self {
            config,
            package: Package::new(),
            names: TypeNames::new(),
        }
    }

    fn build(mut self, parsed: ParsedPackage) -> PigeonResult<Package> {
        self.check_namespace(&parsed.definitions)?;

        let mut structs = Vec::new();
        let mut interfaces = Vec::new();
        let mut methods = Vec::new();
        let mut functions = Vec::new();
        let mut globals = Vec::new();

        for definition in parsed.definitions {
            match definition {
                Definition::Import(import) => {
                    self.package.imports.insert(
                        import.name.clone(),
                        Import {
                            name: import.name,
                            path: import.path,
                            native: import.native,
                            location: import.location,
                        },
                    );
                }
                Definition::Struct(s) => structs.push(s),
                Definition::Interface(i) => interfaces.push(i),
                Definition::Method(m) => methods.push(m),
                Definition::Function(f) => functions.push(f),
                Definition::Global(g) => globals.push(g),
            }
        }

        // declare every type name before resolving anything so references
        // may point forward
        for s in &structs {
            self.names.declare_struct(&s.name);
        }
        for i in &interfaces {
            self.names.declare_interface(&i.name);
        }

        for s in structs {
            self.materialize_struct(s)?;
        }
        self.check_struct_cycles()?;
        self.names.mark_incomparable(&self.package);
        self.check_member_keys()?;

        for i in interfaces {
            self.add_interface(i)?;
        }
        for m in methods {
            self.attach_method(m)?;
        }
        self.compute_implements();

        for f in functions {
            self.add_function(f)?;
        }
        for g in globals {
            self.add_global(g)?;
        }

        tracing::debug!(
            structs = self.package.structs.len(),
            interfaces = self.package.interfaces.len(),
            functions = self.package.functions.len(),
            methods = self.package.methods.len(),
            "built package"
        );
        Ok(self.package)
    }

    /// Top-level names are unique regardless of case
    fn check_namespace(&self, definitions: &[Definition]) -> PigeonResult<()> {
        let mut seen: HashMap<String, SourceLocation> = HashMap::new();

        for definition in definitions {
            if self.config.is_dynamic() {
                let unsupported = match definition {
                    Definition::Struct(_) => Some("structs"),
                    Definition::Interface(_) => Some("interfaces"),
                    Definition::Method(_) => Some("methods"),
                    _ => None,
                };
                if let Some(what) = unsupported {
                    return Err(PigeonError::semantic_error(
                        format!("{} are not supported in the dynamic dialect", what),
                        definition.location().clone(),
                    ));
                }
            }

            let name = definition.name();
            match definition {
                Definition::Method(_) => continue,
                Definition::Struct(_) | Definition::Interface(_) if is_builtin_name(name) => {
                    return Err(PigeonError::semantic_error(
                        format!("cannot redefine built-in type '{}'", name),
                        definition.location().clone(),
                    ));
                }
                Definition::Import(_) if name == "fmt" || name == self.config.runtime_alias => {
                    return Err(PigeonError::semantic_error(
                        format!("import name '{}' is reserved", name),
                        definition.location().clone(),
                    ));
                }
                _ => {}
            }

            let key = name.to_lowercase();
            if let Some(first) = seen.get(&key) {
                return Err(PigeonError::semantic_error(
                    format!(
                        "duplicate definition of '{}' (first defined at {})",
                        name, first
                    ),
                    definition.location().clone(),
                ));
            }
            seen.insert(key, definition.location().clone());
        }

        Ok(())
    }

    fn materialize_struct(&mut self, definition: StructDefinition) -> PigeonResult<()> {
        let mut members: Vec<Member> = Vec::with_capacity(definition.members.len());
        for param in &definition.members {
            if members.iter().any(|m| m.name == param.name) {
                return Err(PigeonError::semantic_error(
                    format!("duplicate member '{}' in struct {}", param.name, definition.name),
                    param.location.clone(),
                ));
            }
            members.push(Member {
                name: param.name.clone(),
                data_type: self.names.resolve(&param.data_type)?,
                location: param.location.clone(),
            });
        }

        self.package.structs.insert(
            definition.name.clone(),
            Struct {
                name: definition.name,
                members,
                implements: IndexSet::new(),
                methods: IndexMap::new(),
                native_code: definition.native_code,
                location: definition.location,
            },
        );
        Ok(())
    }

    /// Depth-first search over value containment only: struct members and
    /// arrays of structs extend the frontier, every other constructor stops it.
    fn check_struct_cycles(&self) -> PigeonResult<()> {
        for s in self.package.structs.values() {
            let mut stack = vec![s.name.as_str()];
            self.visit_struct(s, &mut stack)?;
        }
        Ok(())
    }

    fn visit_struct<'p>(&'p self, s: &'p Struct, stack: &mut Vec<&'p str>) -> PigeonResult<()> {
        for member in &s.members {
            let contained = match contained_struct(&member.data_type) {
                Some(name) => name,
                None => continue,
            };
            if stack.contains(&contained) {
                return Err(PigeonError::semantic_error(
                    "Struct cannot recursively contain itself",
                    member.location.clone(),
                ));
            }
            if let Some(next) = self.package.structs.get(contained) {
                stack.push(next.name.as_str());
                self.visit_struct(next, stack)?;
                stack.pop();
            }
        }
        Ok(())
    }

    /// Members were resolved before every struct was known, so a struct
    /// used as a map key is only judged now
    fn check_member_keys(&self) -> PigeonResult<()> {
        for s in self.package.structs.values() {
            for member in &s.members {
                if let Some(key) = self.incomparable_key(&member.data_type) {
                    return Err(PigeonError::semantic_error(
                        format!("map key type {} is not comparable", key),
                        member.location.clone(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn incomparable_key<'t>(&self, data_type: &'t DataType) -> Option<&'t DataType> {
        match data_type {
            DataType::Map(key, value) => {
                if !self.names.is_comparable(key) {
                    return Some(key);
                }
                self.incomparable_key(key)
                    .or_else(|| self.incomparable_key(value))
            }
            DataType::List(inner)
            | DataType::Slice(inner)
            | DataType::Channel(inner)
            | DataType::Pointer(inner)
            | DataType::Array(_, inner) => self.incomparable_key(inner),
            DataType::Function(signature) => signature
                .params
                .iter()
                .chain(&signature.return_types)
                .find_map(|t| self.incomparable_key(t)),
            _ => None,
        }
    }

    fn add_interface(&mut self, definition: InterfaceDefinition) -> PigeonResult<()> {
        let mut methods = IndexMap::new();
        for method in &definition.methods {
            if methods.contains_key(&method.name) {
                return Err(PigeonError::semantic_error(
                    format!(
                        "duplicate method '{}' in interface {}",
                        method.name, definition.name
                    ),
                    method.location.clone(),
                ));
            }
            let params = self.resolve_all(&method.params)?;
            let return_types = self.resolve_all(&method.return_types)?;
            methods.insert(method.name.clone(), FunctionType::new(params, return_types));
        }

        self.package.interfaces.insert(
            definition.name.clone(),
            Interface {
                name: definition.name,
                methods,
                location: definition.location,
            },
        );
        Ok(())
    }

    fn attach_method(&mut self, definition: MethodDefinition) -> PigeonResult<()> {
        let receiver_type = self.names.resolve(&definition.receiver.data_type)?;
        let receiver_struct = match &receiver_type {
            DataType::Struct(name) => name.clone(),
            other => {
                return Err(PigeonError::semantic_error(
                    format!("method receiver must be a struct, found {}", other),
                    definition.receiver.data_type.location.clone(),
                ))
            }
        };

        let key = (definition.name.clone(), receiver_struct.clone());
        if self.package.methods.contains_key(&key) {
            return Err(PigeonError::semantic_error(
                format!(
                    "duplicate method '{}' on {}",
                    definition.name, receiver_struct
                ),
                definition.location.clone(),
            ));
        }

        let receiver = Variable {
            name: definition.receiver.name.clone(),
            data_type: receiver_type,
            location: definition.receiver.location.clone(),
        };
        let params = self.variables(&definition.params, Some(&receiver.name))?;
        let return_types = self.resolve_all(&definition.return_types)?;
        let signature = FunctionType::new(
            params.iter().map(|p| p.data_type.clone()).collect(),
            return_types,
        );

        if let Some(s) = self.package.structs.get_mut(&receiver_struct) {
            s.methods.insert(definition.name.clone(), signature.clone());
        }

        self.package.methods.insert(
            key,
            Method {
                name: definition.name,
                receiver,
                receiver_struct,
                params,
                signature,
                body: definition.body,
                location: definition.location,
            },
        );
        Ok(())
    }

    /// `implements[I]` holds iff every method of `I` exists on the struct with
    /// an identical signature
    fn compute_implements(&mut self) {
        let interfaces = &self.package.interfaces;
        for s in self.package.structs.values_mut() {
            for interface in interfaces.values() {
                let satisfied = interface
                    .methods
                    .iter()
                    .all(|(name, signature)| s.methods.get(name) == Some(signature));
                if satisfied {
                    tracing::debug!(structure = %s.name, interface = %interface.name, "implements");
                    s.implements.insert(interface.name.clone());
                }
            }
        }
    }

    fn add_function(&mut self, definition: FunctionDefinition) -> PigeonResult<()> {
        let params = self.variables(&definition.params, None)?;
        let return_types = self.resolve_declared_all(&definition.return_types)?;
        let signature = FunctionType::new(
            params.iter().map(|p| p.data_type.clone()).collect(),
            return_types,
        );

        self.package.functions.insert(
            definition.name.clone(),
            Function {
                name: definition.name,
                params,
                signature,
                body: definition.body,
                native_code: definition.native_code,
                location: definition.location,
            },
        );
        Ok(())
    }

    fn add_global(&mut self, definition: GlobalDefinition) -> PigeonResult<()> {
        let data_type = self.resolve_declared(&definition.data_type)?;
        self.package.globals.insert(
            definition.name.clone(),
            Global {
                name: definition.name,
                data_type,
                value: definition.value,
                location: definition.location,
            },
        );
        Ok(())
    }

    /// Resolve parameters, rejecting repeated names
    fn variables(
        &self,
        params: &[Param],
        receiver: Option<&str>,
    ) -> PigeonResult<Vec<Variable>> {
        let mut variables: Vec<Variable> = Vec::with_capacity(params.len());
        for param in params {
            let repeated = receiver == Some(param.name.as_str())
                || variables.iter().any(|v| v.name == param.name);
            if repeated {
                return Err(PigeonError::semantic_error(
                    format!("duplicate parameter '{}'", param.name),
                    param.location.clone(),
                ));
            }
            variables.push(Variable {
                name: param.name.clone(),
                data_type: self.resolve_declared(&param.data_type)?,
                location: param.location.clone(),
            });
        }
        Ok(variables)
    }

    fn resolve_all(&self, types: &[ParsedDataType]) -> PigeonResult<Vec<DataType>> {
        types.iter().map(|t| self.names.resolve(t)).collect()
    }

    /// Resolve a declared type; the dynamic dialect erases it to `Any`
    fn resolve_declared(&self, parsed: &ParsedDataType) -> PigeonResult<DataType> {
        let resolved = self.names.resolve(parsed)?;
        if self.config.is_dynamic() {
            Ok(DataType::ANY)
        } else {
            Ok(resolved)
        }
    }

    fn resolve_declared_all(&self, types: &[ParsedDataType]) -> PigeonResult<Vec<DataType>> {
        types.iter().map(|t| self.resolve_declared(t)).collect()
    }
}

/// Struct held by value in a member of this type
fn contained_struct(data_type: &DataType) -> Option<&str> {
    match data_type {
        DataType::Struct(name) => Some(name),
        DataType::Array(_, element) => contained_struct(element),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn build_with(source: &str, config: &CompilerConfig) -> PigeonResult<Package> {
        let tokens = Lexer::new(source, None).tokenize()?;
        let parsed = Parser::new(tokens).parse()?;
        build(parsed, config)
    }

    fn build_source(source: &str) -> PigeonResult<Package> {
        build_with(source, &CompilerConfig::new())
    }

    fn build_error(source: &str) -> String {
        build_source(source).unwrap_err().message().to_string()
    }

    const ANIMAL: &str = "\
interface Animal
    speak : Str
struct Dog
    name Str
";

    #[test]
    fn test_implements_relation() {
        let source = format!("{}method speak d Dog : Str\n    return \"woof\"\n", ANIMAL);
        let package = build_source(&source).unwrap();
        let dog = &package.structs["Dog"];
        assert!(dog.implements("Animal"));
        assert_eq!(
            dog.methods["speak"],
            FunctionType::new(vec![], vec![DataType::STR])
        );
        assert!(package
            .methods
            .contains_key(&("speak".to_string(), "Dog".to_string())));
    }

    #[test]
    fn test_mismatched_signature_does_not_implement() {
        let source = format!("{}method speak d Dog : I\n    return 1\n", ANIMAL);
        let package = build_source(&source).unwrap();
        assert!(!package.structs["Dog"].implements("Animal"));
    }

    #[test]
    fn test_forward_references() {
        let source = "\
struct Owner
    pet Dog
struct Dog
    tags L<Str>
func main
    locals o Owner
";
        let package = build_source(source).unwrap();
        assert_eq!(
            package.structs["Owner"].members[0].data_type,
            DataType::Struct("Dog".into())
        );
    }

    #[test]
    fn test_recursive_struct_rejected() {
        let err = build_source("struct Node\n    next Node\n").unwrap_err();
        assert_eq!(err.message(), "Struct cannot recursively contain itself");
        assert_eq!(err.location().unwrap().line, 2);

        assert_eq!(
            build_error("struct Left\n    r Right\nstruct Right\n    items A<Left 2>\n"),
            "Struct cannot recursively contain itself"
        );
    }

    #[test]
    fn test_indirect_containment_accepted() {
        let source = "\
struct Node
    next P<Node>
    children L<Node>
    parts S<Node>
    index M<Str Node>
    link Ch<Node>
    visit Fn<Node : Bool>
";
        assert!(build_source(source).is_ok());
    }

    #[test]
    fn test_case_insensitive_duplicates() {
        let err = build_source("func dog\n    return\nstruct Dog\n    n I\n").unwrap_err();
        assert_eq!(
            err.message(),
            "duplicate definition of 'Dog' (first defined at line 1, column 1)"
        );
        assert_eq!(err.location().unwrap().line, 3);
    }

    #[test]
    fn test_method_errors() {
        assert_eq!(
            build_error("method speak n I : Str\n    return \"x\"\n"),
            "method receiver must be a struct, found I"
        );
        let twice = format!(
            "{}method speak d Dog : Str\n    return \"a\"\nmethod speak d Dog : Str\n    return \"b\"\n",
            ANIMAL
        );
        assert_eq!(build_error(&twice), "duplicate method 'speak' on Dog");
    }

    #[test]
    fn test_other_duplicates() {
        assert_eq!(
            build_error("struct Dog\n    n I\n    n Str\n"),
            "duplicate member 'n' in struct Dog"
        );
        assert_eq!(
            build_error("func f a I a Str\n    return\n"),
            "duplicate parameter 'a'"
        );
        assert_eq!(
            build_error("interface Shape\n    area : F\n    area : I\n"),
            "duplicate method 'area' in interface Shape"
        );
        assert_eq!(
            build_error("struct Str\n    n I\n"),
            "cannot redefine built-in type 'Str'"
        );
        assert_eq!(
            build_error("nativeimport \"fmt\"\n"),
            "import name 'fmt' is reserved"
        );
    }

    #[test]
    fn test_dynamic_dialect() {
        let config = CompilerConfig::dynamic();
        let package = build_with("func sum a I b I : I\n    return (add a b)\n", &config).unwrap();
        let sum = &package.functions["sum"];
        assert_eq!(sum.signature.params, vec![DataType::ANY, DataType::ANY]);
        assert_eq!(sum.signature.return_types, vec![DataType::ANY]);

        let err = build_with("struct Dog\n    n I\n", &config).unwrap_err();
        assert_eq!(err.message(), "structs are not supported in the dynamic dialect");
    }

    #[test]
    fn test_map_keys_must_be_comparable() {
        let tagged = "struct Tagged\n    tags S<Str>\n";
        assert_eq!(
            build_error(&format!("{}struct Index\n    byTag M<Tagged I>\n", tagged)),
            "map key type Tagged is not comparable"
        );
        assert_eq!(
            build_error(&format!("struct Index\n    byTag L<M<A<Tagged 2> I>>\n{}", tagged)),
            "map key type A<Tagged 2> is not comparable"
        );
        assert_eq!(
            build_error(&format!("{}func count m M<Tagged I> : I\n    return 0\n", tagged)),
            "map key type Tagged is not comparable"
        );
        assert!(build_source(
            "struct Point\n    x I\n    y I\nstruct Grid\n    cells M<Point Str>\n"
        )
        .is_ok());
    }
}
