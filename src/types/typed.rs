//! Typed tree produced by the checker and consumed by the emitter.
//!
//! Every expression carries the sequence of types it yields, every name is
//! already resolved to the kind of binding it refers to, and every special
//! form the emitter renders differently has its own node.

use indexmap::IndexMap;

use crate::config::Dialect;
use crate::error::SourceLocation;
use crate::lexer::Operator;
use crate::semantic::{Import, Interface, Struct, Variable};
use crate::types::type_def::DataType;

static NO_TYPE: DataType = DataType::Nil;

#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: ExprKind,
    /// What the expression yields; empty for statement-only forms
    pub types: Vec<DataType>,
    pub location: SourceLocation,
}

impl TypedExpr {
    pub fn new(kind: ExprKind, types: Vec<DataType>, location: SourceLocation) -> Self {
        Self {
            kind,
            types,
            location,
        }
    }

    /// The single type of a one-valued expression
    pub fn data_type(&self) -> &DataType {
        match self.types.first() {
            Some(t) => t,
            None => &NO_TYPE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Local(String),
    Global(String),
    Function(String),

    Int(String),
    Float(String),
    /// Quoted literal contents, escapes untouched
    Str(String),
    /// Multi-line literal contents, verbatim
    RawStr(String),
    Bool(bool),
    Nil,

    Operation {
        operator: Operator,
        operands: Vec<TypedExpr>,
    },

    /// Struct member read
    Member {
        target: Box<TypedExpr>,
        member: String,
    },

    /// Struct member write (`set` on a struct)
    SetMember {
        target: Box<TypedExpr>,
        member: String,
        value: Box<TypedExpr>,
    },

    FunctionCall {
        callee: Box<TypedExpr>,
        arguments: Vec<TypedExpr>,
    },

    MethodCall {
        receiver: Box<TypedExpr>,
        method: String,
        arguments: Vec<TypedExpr>,
    },

    /// `(T args...)`: construction or conversion to `data_type`
    Construct {
        data_type: DataType,
        arguments: Vec<TypedExpr>,
    },

    /// A type used as a value
    TypeValue(DataType),
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// Local or global variable
    Variable(TypedExpr),
    /// `(dr p)`
    Deref(TypedExpr),
    /// `(get s member)` on a struct
    Member { target: TypedExpr, member: String },
    /// `(get c index)` on a list, slice, array or map
    Index {
        container: TypedExpr,
        index: TypedExpr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedStmt {
    pub kind: StmtKind,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Locals(Vec<Variable>),
    LocalFunc(Box<CheckedFunction>),
    If {
        condition: TypedExpr,
        body: Vec<TypedStmt>,
        elseifs: Vec<(TypedExpr, Vec<TypedStmt>)>,
        else_body: Option<Vec<TypedStmt>>,
    },
    While {
        condition: TypedExpr,
        body: Vec<TypedStmt>,
    },
    Foreach {
        index: Variable,
        value: Variable,
        collection: TypedExpr,
        body: Vec<TypedStmt>,
    },
    Forinc {
        var: Variable,
        start: TypedExpr,
        end: TypedExpr,
        descending: bool,
        body: Vec<TypedStmt>,
    },
    Typeswitch {
        subject: TypedExpr,
        cases: Vec<(Variable, Vec<TypedStmt>)>,
        default: Option<Vec<TypedStmt>>,
    },
    Select {
        clauses: Vec<TypedSelectClause>,
        default: Option<Vec<TypedStmt>>,
    },
    Assignment {
        targets: Vec<AssignTarget>,
        value: TypedExpr,
    },
    Return(Vec<TypedExpr>),
    Break,
    Continue,
    Go(TypedExpr),
    Expression(TypedExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedSelectClause {
    Sending {
        channel: TypedExpr,
        value: TypedExpr,
        body: Vec<TypedStmt>,
    },
    Rcving {
        binding: Variable,
        channel: TypedExpr,
        body: Vec<TypedStmt>,
    },
}

/// A function, method or local function with a checked body
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedFunction {
    pub name: String,
    pub params: Vec<Variable>,
    pub return_types: Vec<DataType>,
    pub body: Vec<TypedStmt>,
    pub native_code: Option<String>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckedMethod {
    pub receiver: Variable,
    pub receiver_struct: String,
    pub function: CheckedFunction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckedGlobal {
    pub name: String,
    pub data_type: DataType,
    pub value: TypedExpr,
    pub location: SourceLocation,
}

/// Output of the type checker: everything the emitter needs
#[derive(Debug, Clone)]
pub struct CheckedPackage {
    pub dialect: Dialect,
    pub imports: Vec<Import>,
    pub structs: IndexMap<String, Struct>,
    pub interfaces: IndexMap<String, Interface>,
    pub globals: Vec<CheckedGlobal>,
    pub functions: Vec<CheckedFunction>,
    pub methods: Vec<CheckedMethod>,
    /// User entry function, when present
    pub entry: Option<String>,
}
