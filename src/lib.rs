//! # Pigeon
//!
//! A compiler for the Pigeon language:
//! - Indentation-structured source with prefix operator expressions
//! - Static typing with structs, interfaces and parametric built-in types
//! - Emitted as a single Go source file linked against a small runtime
//!
//! ## Architecture
//!
//! The compiler is organized into one module per phase:
//! - `lexer`: Tokenization and the whitespace post-pass
//! - `parser`: Parsing tokens into top-level definitions
//! - `semantic`: Building the package model (structs, interfaces, signatures)
//! - `types`: Type checking of bodies into a typed tree
//! - `codegen`: Go emission
//! - `runtime`: Names the emitted code may use from the runtime library
//! - `error`: Error handling and diagnostics

pub mod codegen;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod semantic;
pub mod types;

// Re-export commonly used types
pub use codegen::{EmittedPackage, Emitter};
pub use config::{CompilerConfig, Dialect};
pub use error::{Diagnostic, PigeonError, PigeonResult, SourceLocation};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{ParsedPackage, Parser};
pub use semantic::Package;
pub use types::{CheckedPackage, TypeChecker};

/// Version of the Pigeon compiler
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile a Pigeon source file to Go
///
/// Runs every phase in order: lexing, parsing, building the package model,
/// type checking and emission. The first error stops compilation.
///
/// # Arguments
///
/// * `source` - The source code to compile
/// * `filename` - Optional filename for error reporting
/// * `config` - Dialect and emission options
pub fn compile(
    source: &str,
    filename: Option<&str>,
    config: &CompilerConfig,
) -> PigeonResult<EmittedPackage> {
    let _span = tracing::info_span!("compile", file = filename.unwrap_or("<input>")).entered();

    let checked = check(source, filename, config)?;
    let emitted = Emitter::new(&checked, config).emit()?;

    tracing::info!(
        bytes = emitted.code.len(),
        breakpoints = emitted.breakpoints.len(),
        "compiled"
    );
    Ok(emitted)
}

/// Run every phase up to and including type checking
pub fn check(
    source: &str,
    filename: Option<&str>,
    config: &CompilerConfig,
) -> PigeonResult<CheckedPackage> {
    // Phase 1: Lexical Analysis
    let tokens = Lexer::new(source, filename).tokenize()?;

    // Phase 2: Parsing
    let parsed = Parser::new(tokens).parse()?;

    // Phase 3: Package model
    let package = semantic::build(parsed, config)?;

    // Phase 4: Type Checking
    TypeChecker::new(&package, config).check()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_check_stops_before_emission() {
        let checked = check("func main\n    (println 1)\n", None, &CompilerConfig::new()).unwrap();
        assert_eq!(checked.entry.as_deref(), Some("main"));
        assert_eq!(checked.functions.len(), 1);
    }

    #[test]
    fn test_compile_reports_filename() {
        let err = compile("func main\n    (add 1)\n", Some("bad.pg"), &CompilerConfig::new())
            .unwrap_err();
        let location = err.location().unwrap();
        assert_eq!(location.filename.as_deref(), Some("bad.pg"));
        assert_eq!(location.line, 2);
    }
}
