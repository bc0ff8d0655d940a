//! Code generation module
//!
//! This module renders a checked package as a Go source file.

pub mod emitter;
mod expr;
pub mod names;

pub use emitter::{EmittedPackage, Emitter};
