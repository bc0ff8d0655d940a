//! Diagnostic formatting for compiler errors
//!
//! Renders a `PigeonError` with the offending source line and a caret under
//! the reported column.

use super::{PigeonError, SourceLocation};
use colored::Colorize;

/// Diagnostic information for displaying errors with context
pub struct Diagnostic<'a> {
    error: &'a PigeonError,
    source: Option<&'a str>,
}

impl<'a> Diagnostic<'a> {
    pub fn new(error: &'a PigeonError) -> Self {
        Self {
            error,
            source: None,
        }
    }

    /// Create a diagnostic with source code context
    pub fn with_source(error: &'a PigeonError, source: &'a str) -> Self {
        Self {
            error,
            source: Some(source),
        }
    }

    /// Format the diagnostic with color and context
    pub fn format(&self) -> String {
        let mut output = String::new();

        let kind = self.error.kind().red().bold();
        output.push_str(&format!("{}: ", kind));
        output.push_str(self.error.message());
        output.push('\n');

        if let Some(location) = self.error.location() {
            output.push_str(&format!("  {} {}\n", "-->".blue().bold(), location));

            if let Some(source) = self.source {
                output.push_str(&Self::format_source_context(source, location));
            }
        }

        output
    }

    fn format_source_context(source: &str, location: &SourceLocation) -> String {
        let mut output = String::new();
        let lines: Vec<&str> = source.lines().collect();

        if location.line == 0 || location.line > lines.len() {
            return output;
        }

        let line_idx = location.line - 1;
        let line_num_width = (location.line + 1).to_string().len();

        if line_idx > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                format!("{:width$}", line_idx, width = line_num_width).blue(),
                lines[line_idx - 1]
            ));
        }

        output.push_str(&format!(
            "  {} {}\n",
            format!("{:width$}", location.line, width = line_num_width)
                .blue()
                .bold(),
            lines[line_idx]
        ));

        let indicator_padding = " ".repeat(line_num_width + 2 + location.column.saturating_sub(1));
        output.push_str(&format!("{}{}\n", indicator_padding, "^".red().bold()));

        output
    }
}

impl std::fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_without_source() {
        let err = PigeonError::syntax_error("tab character", SourceLocation::at(1, 1));
        let formatted = Diagnostic::new(&err).format();

        assert!(formatted.contains("Syntax Error"));
        assert!(formatted.contains("tab character"));
    }

    #[test]
    fn test_diagnostic_with_source() {
        let source = "func main\n    as x\n";
        let err = PigeonError::syntax_error("expected space after 'as'", SourceLocation::at(2, 7));
        let formatted = Diagnostic::with_source(&err, source).format();

        assert!(formatted.contains("Syntax Error"));
        assert!(formatted.contains("    as x"));
        assert!(formatted.contains("func main"));
    }

    #[test]
    fn test_diagnostic_out_of_range_line() {
        let err = PigeonError::type_error("bad", SourceLocation::at(40, 1));
        let formatted = Diagnostic::with_source(&err, "func main\n").format();
        assert!(!formatted.contains('^'));
    }
}
