//! The package model: everything the builder learns about one source file.

use indexmap::{IndexMap, IndexSet};

use crate::error::SourceLocation;
use crate::parser::ast::{Expr, Stmt};
use crate::types::type_def::{DataType, FunctionType};

/// A struct after its member types have been resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub members: Vec<Member>,
    /// Names of the interfaces this struct satisfies
    pub implements: IndexSet<String>,
    /// Method name to signature (receiver excluded)
    pub methods: IndexMap<String, FunctionType>,
    pub native_code: Option<String>,
    pub location: SourceLocation,
}

impl Struct {
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn implements(&self, interface: &str) -> bool {
        self.implements.contains(interface)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub data_type: DataType,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    pub methods: IndexMap<String, FunctionType>,
    pub location: SourceLocation,
}

/// A named, typed binding: parameter or local
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub data_type: DataType,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Variable>,
    pub signature: FunctionType,
    pub body: Vec<Stmt>,
    pub native_code: Option<String>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub receiver: Variable,
    /// Name of the receiving struct
    pub receiver_struct: String,
    pub params: Vec<Variable>,
    pub signature: FunctionType,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub name: String,
    pub data_type: DataType,
    pub value: Expr,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub name: String,
    pub path: String,
    pub native: bool,
    pub location: SourceLocation,
}

/// The unit of compilation
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub imports: IndexMap<String, Import>,
    pub structs: IndexMap<String, Struct>,
    pub interfaces: IndexMap<String, Interface>,
    pub globals: IndexMap<String, Global>,
    pub functions: IndexMap<String, Function>,
    /// Keyed by `(method name, receiver struct name)`
    pub methods: IndexMap<(String, String), Method>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a value of type `child` may be stored where `parent` is expected
    pub fn is_assignable(&self, child: &DataType, parent: &DataType) -> bool {
        if child == parent || parent.is_any() {
            return true;
        }
        match (child, parent) {
            (DataType::Nil, parent) => parent.is_nilable(),
            (DataType::Struct(s), DataType::Interface(i)) => self
                .structs
                .get(s)
                .map_or(false, |st| st.implements(i)),
            _ => false,
        }
    }

    /// Whether values of `data_type` can be compared with `eq`, looking
    /// through struct members and array elements
    pub fn is_comparable(&self, data_type: &DataType) -> bool {
        match data_type {
            DataType::Array(_, element) => self.is_comparable(element),
            DataType::Struct(name) => self.structs.get(name).map_or(true, |s| {
                s.members.iter().all(|m| self.is_comparable(&m.data_type))
            }),
            other => other.is_comparable(),
        }
    }

    /// Signature of `method` on a struct or interface type
    pub fn method_signature(&self, receiver: &DataType, method: &str) -> Option<&FunctionType> {
        if let Some(name) = receiver.struct_name() {
            return self.structs.get(name)?.methods.get(method);
        }
        match receiver {
            DataType::Interface(name) => self.interfaces.get(name)?.methods.get(method),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog_and_animal(implements: bool) -> Package {
        let mut package = Package::new();
        let mut dog = Struct {
            name: "Dog".to_string(),
            members: vec![Member {
                name: "name".to_string(),
                data_type: DataType::STR,
                location: SourceLocation::at(2, 5),
            }],
            implements: IndexSet::new(),
            methods: IndexMap::new(),
            native_code: None,
            location: SourceLocation::at(1, 1),
        };
        dog.methods.insert(
            "speak".to_string(),
            FunctionType::new(vec![], vec![DataType::STR]),
        );
        if implements {
            dog.implements.insert("Animal".to_string());
        }
        package.structs.insert("Dog".to_string(), dog);
        package
    }

    #[test]
    fn test_assignability() {
        let package = dog_and_animal(true);
        let dog = DataType::Struct("Dog".into());
        let animal = DataType::Interface("Animal".into());

        assert!(package.is_assignable(&DataType::INT, &DataType::INT));
        assert!(package.is_assignable(&DataType::INT, &DataType::ANY));
        assert!(!package.is_assignable(&DataType::ANY, &DataType::INT));
        assert!(package.is_assignable(&dog, &animal));
        assert!(!package.is_assignable(&animal, &dog));
        assert!(package.is_assignable(&DataType::Nil, &DataType::pointer(dog.clone())));
        assert!(!package.is_assignable(&DataType::Nil, &dog));
        assert!(!package.is_assignable(
            &DataType::list(DataType::INT),
            &DataType::slice(DataType::INT)
        ));

        let package = dog_and_animal(false);
        assert!(!package.is_assignable(&dog, &animal));
    }

    #[test]
    fn test_method_signature() {
        let package = dog_and_animal(true);
        let dog = DataType::Struct("Dog".into());
        assert!(package.method_signature(&dog, "speak").is_some());
        assert!(package
            .method_signature(&DataType::pointer(dog.clone()), "speak")
            .is_some());
        assert!(package.method_signature(&dog, "bark").is_none());
        assert!(package.method_signature(&DataType::INT, "speak").is_none());
    }

    #[test]
    fn test_member_lookup() {
        let package = dog_and_animal(true);
        let dog = &package.structs["Dog"];
        assert_eq!(dog.member("name").map(|m| &m.data_type), Some(&DataType::STR));
        assert!(dog.member("age").is_none());
    }
}
