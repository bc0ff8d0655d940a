//! Lexical analysis module
//!
//! This module handles tokenization of Pigeon source code.

pub mod filter;
pub mod scanner;
pub mod token;

pub use scanner::Lexer;
pub use token::{Keyword, Operator, Token, TokenType};

/// Width of one indentation level, in spaces
pub const INDENT_WIDTH: usize = 4;
