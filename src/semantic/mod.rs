//! Semantic model module
//!
//! This module builds the package model from parsed definitions.

pub mod builder;
pub mod package;
pub mod resolve;

pub use builder::build;
pub use package::{Function, Global, Import, Interface, Member, Method, Package, Struct, Variable};
pub use resolve::TypeNames;
