//! Error handling and diagnostics for the Pigeon compiler
//!
//! Every failure the compiler reports is a position-tagged message. There is
//! no recovery: the first error aborts the pipeline.

use std::fmt;

use thiserror::Error;

pub mod diagnostic;

pub use diagnostic::Diagnostic;

/// Result type alias for Pigeon operations
pub type PigeonResult<T> = Result<T, PigeonError>;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Optional filename
    pub filename: Option<String>,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize, filename: Option<String>) -> Self {
        Self {
            line,
            column,
            filename,
        }
    }

    /// Create a source location without a filename
    pub fn at(line: usize, column: usize) -> Self {
        Self::new(line, column, None)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref filename) = self.filename {
            write!(f, "{}: line {}, column {}", filename, self.line, self.column)
        } else {
            write!(f, "line {}, column {}", self.line, self.column)
        }
    }
}

/// Main error type for the Pigeon compiler
#[derive(Debug, Clone, Error)]
pub enum PigeonError {
    /// Lexer or parser error
    #[error("{location}: {message}")]
    Syntax {
        message: String,
        location: SourceLocation,
    },
    /// Undefined or duplicate names, ill-formed types, recursive structs
    #[error("{location}: {message}")]
    Semantic {
        message: String,
        location: SourceLocation,
    },
    /// Arity, assignability, interface and control-flow errors
    #[error("{location}: {message}")]
    Type {
        message: String,
        location: SourceLocation,
    },
    /// Reading source or writing emitted output failed
    #[error("{message}")]
    Io { message: String },
    /// Internal compiler error (should not happen in normal operation)
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl PigeonError {
    /// Create a new syntax error
    pub fn syntax_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Syntax {
            message: message.into(),
            location,
        }
    }

    /// Create a new semantic error
    pub fn semantic_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Semantic {
            message: message.into(),
            location,
        }
    }

    /// Create a new type error
    pub fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Type {
            message: message.into(),
            location,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the error kind as a string
    pub fn kind(&self) -> &str {
        match self {
            Self::Syntax { .. } => "Syntax Error",
            Self::Semantic { .. } => "Semantic Error",
            Self::Type { .. } => "Type Error",
            Self::Io { .. } => "I/O Error",
            Self::Internal { .. } => "Internal Error",
        }
    }

    /// Get the error message without its position
    pub fn message(&self) -> &str {
        match self {
            Self::Syntax { message, .. }
            | Self::Semantic { message, .. }
            | Self::Type { message, .. }
            | Self::Io { message }
            | Self::Internal { message } => message,
        }
    }

    /// Get the source location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Syntax { location, .. }
            | Self::Semantic { location, .. }
            | Self::Type { location, .. } => Some(location),
            Self::Io { .. } | Self::Internal { .. } => None,
        }
    }
}

impl From<std::io::Error> for PigeonError {
    fn from(error: std::io::Error) -> Self {
        Self::io_error(error.to_string())
    }
}
