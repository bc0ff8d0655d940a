//! Type system module
//!
//! This module handles type checking of bodies against the package model.

pub mod checker;
mod expr;
pub mod operators;
pub mod type_def;
pub mod typed;

pub use checker::TypeChecker;
pub use type_def::{DataType, FunctionType, Scalar};
pub use typed::{
    AssignTarget, CheckedFunction, CheckedGlobal, CheckedMethod, CheckedPackage, ExprKind,
    StmtKind, TypedExpr, TypedSelectClause, TypedStmt,
};
