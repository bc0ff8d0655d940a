//! Parser module
//!
//! This module handles parsing tokens into an Abstract Syntax Tree (AST).

pub mod ast;
mod expr;
pub mod parser;

pub use ast::{Definition, Expr, Literal, ParsedDataType, ParsedPackage, Stmt};
pub use parser::Parser;
