//! Type definitions
//!
//! This module defines the semantic type model. Structs and interfaces are
//! nominal and referenced by name; everything else is structural, so derived
//! equality is the deep equality the implements relation needs.

use std::fmt;

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// 64-bit integer
    I,
    /// 64-bit float
    F,
    Byte,
    Bool,
    Str,
    Err,
    Any,
    /// Type of a type used as a value
    Type,
}

impl Scalar {
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "I" => Some(Self::I),
            "F" => Some(Self::F),
            "Byte" => Some(Self::Byte),
            "Bool" => Some(Self::Bool),
            "Str" => Some(Self::Str),
            "Err" => Some(Self::Err),
            "Any" => Some(Self::Any),
            "Type" => Some(Self::Type),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::F => "F",
            Self::Byte => "Byte",
            Self::Bool => "Bool",
            Self::Str => "Str",
            Self::Err => "Err",
            Self::Any => "Any",
            Self::Type => "Type",
        }
    }
}

/// Names of the parametric built-in constructors
pub const CONSTRUCTOR_NAMES: [&str; 7] = ["L", "S", "Ch", "P", "M", "A", "Fn"];

/// Whether `name` is reserved for a built-in type
pub fn is_builtin_name(name: &str) -> bool {
    Scalar::from_str(name).is_some() || CONSTRUCTOR_NAMES.contains(&name)
}

/// Parameter and return lists of a function, method or `Fn` type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FunctionType {
    pub params: Vec<DataType>,
    pub return_types: Vec<DataType>,
}

impl FunctionType {
    pub fn new(params: Vec<DataType>, return_types: Vec<DataType>) -> Self {
        Self {
            params,
            return_types,
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fn<")?;
        write_list(f, &self.params)?;
        if !self.return_types.is_empty() {
            if self.params.is_empty() {
                write!(f, ": ")?;
            } else {
                write!(f, " : ")?;
            }
            write_list(f, &self.return_types)?;
        }
        write!(f, ">")
    }
}

/// Semantic type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Scalar(Scalar),
    /// `L<T>`: heap list
    List(Box<DataType>),
    /// `S<T>`: contiguous slice
    Slice(Box<DataType>),
    /// `Ch<T>`
    Channel(Box<DataType>),
    /// `P<T>`
    Pointer(Box<DataType>),
    /// `M<K V>`
    Map(Box<DataType>, Box<DataType>),
    /// `A<T N>`
    Array(usize, Box<DataType>),
    Function(FunctionType),
    /// Materialized struct, by name
    Struct(String),
    /// Interface, by name
    Interface(String),
    /// Type of the `nil` literal
    Nil,
}

impl DataType {
    pub const INT: DataType = DataType::Scalar(Scalar::I);
    pub const FLOAT: DataType = DataType::Scalar(Scalar::F);
    pub const BYTE: DataType = DataType::Scalar(Scalar::Byte);
    pub const BOOL: DataType = DataType::Scalar(Scalar::Bool);
    pub const STR: DataType = DataType::Scalar(Scalar::Str);
    pub const ERR: DataType = DataType::Scalar(Scalar::Err);
    pub const ANY: DataType = DataType::Scalar(Scalar::Any);
    pub const TYPE: DataType = DataType::Scalar(Scalar::Type);

    pub fn list(element: DataType) -> Self {
        DataType::List(Box::new(element))
    }

    pub fn slice(element: DataType) -> Self {
        DataType::Slice(Box::new(element))
    }

    pub fn pointer(target: DataType) -> Self {
        DataType::Pointer(Box::new(target))
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        DataType::Map(Box::new(key), Box::new(value))
    }

    pub fn channel(element: DataType) -> Self {
        DataType::Channel(Box::new(element))
    }

    /// `I`, `F` or `Byte`
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Scalar(Scalar::I) | DataType::Scalar(Scalar::F) | DataType::Scalar(Scalar::Byte)
        )
    }

    /// `I` or `Byte`
    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Scalar(Scalar::I) | DataType::Scalar(Scalar::Byte))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, DataType::Scalar(Scalar::Any))
    }

    /// Interfaces and `Any`: the types a type assertion can inspect
    pub fn is_interface_like(&self) -> bool {
        matches!(self, DataType::Interface(_) | DataType::Scalar(Scalar::Any))
    }

    /// Types whose zero value is `nil`
    pub fn is_nilable(&self) -> bool {
        matches!(
            self,
            DataType::List(_)
                | DataType::Slice(_)
                | DataType::Channel(_)
                | DataType::Pointer(_)
                | DataType::Map(_, _)
                | DataType::Function(_)
                | DataType::Interface(_)
                | DataType::Scalar(Scalar::Err)
                | DataType::Scalar(Scalar::Any)
                | DataType::Nil
        )
    }

    /// Whether values of this type can be compared with `eq`.
    ///
    /// Struct members are not visible here; `Package::is_comparable` looks
    /// through them.
    pub fn is_comparable(&self) -> bool {
        match self {
            DataType::Slice(_) | DataType::Map(_, _) | DataType::Function(_) => false,
            DataType::Array(_, element) => element.is_comparable(),
            _ => true,
        }
    }

    /// Element type of an indexable sequence (`L`, `S`, `A`)
    pub fn element_type(&self) -> Option<&DataType> {
        match self {
            DataType::List(element) | DataType::Slice(element) | DataType::Array(_, element) => {
                Some(element)
            }
            _ => None,
        }
    }

    /// Struct name reached directly or through one pointer
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            DataType::Struct(name) => Some(name),
            DataType::Pointer(target) => match target.as_ref() {
                DataType::Struct(name) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Scalar(scalar) => write!(f, "{}", scalar.as_str()),
            DataType::List(element) => write!(f, "L<{}>", element),
            DataType::Slice(element) => write!(f, "S<{}>", element),
            DataType::Channel(element) => write!(f, "Ch<{}>", element),
            DataType::Pointer(target) => write!(f, "P<{}>", target),
            DataType::Map(key, value) => write!(f, "M<{} {}>", key, value),
            DataType::Array(size, element) => write!(f, "A<{} {}>", element, size),
            DataType::Function(func) => write!(f, "{}", func),
            DataType::Struct(name) | DataType::Interface(name) => write!(f, "{}", name),
            DataType::Nil => write!(f, "nil"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[DataType]) -> fmt::Result {
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", t)?;
    }
    Ok(())
}

/// Render a sequence of result types, e.g. for arity errors
pub fn format_types(types: &[DataType]) -> String {
    match types {
        [] => "nothing".to_string(),
        [single] => single.to_string(),
        many => {
            let names: Vec<String> = many.iter().map(|t| t.to_string()).collect();
            format!("({})", names.join(", "))
        }
    }
}
