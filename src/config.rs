//! Compiler configuration.

use crate::runtime;

/// Which flavor of the language is being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Nominal structs, interfaces and parametric built-in types.
    #[default]
    Static,
    /// Every value boxed as `Any`; operators dispatch at runtime.
    Dynamic,
}

/// Options that shape checking and emission.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub dialect: Dialect,
    /// Name of the emitted module
    pub package_name: String,
    /// Import path of the runtime library
    pub runtime_import: String,
    /// Local alias under which emitted code refers to the runtime
    pub runtime_alias: String,
    /// User function called from the emitted entry point
    pub entry_function: String,
    /// Whether a missing entry function is an error
    pub require_entry: bool,
    /// Whether to emit the valid-breakpoint table
    pub emit_breakpoint_table: bool,
}

impl CompilerConfig {
    /// Configuration for a static-dialect executable.
    pub fn new() -> Self {
        CompilerConfig {
            dialect: Dialect::Static,
            package_name: "main".to_string(),
            runtime_import: runtime::DEFAULT_IMPORT_PATH.to_string(),
            runtime_alias: runtime::DEFAULT_ALIAS.to_string(),
            entry_function: "main".to_string(),
            require_entry: true,
            emit_breakpoint_table: true,
        }
    }

    /// Configuration for the dynamic dialect.
    pub fn dynamic() -> Self {
        CompilerConfig {
            dialect: Dialect::Dynamic,
            ..Self::new()
        }
    }

    /// Configuration that does not require an entry function.
    pub fn library() -> Self {
        CompilerConfig {
            require_entry: false,
            ..Self::new()
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.dialect == Dialect::Dynamic
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.dialect, Dialect::Static);
        assert_eq!(config.package_name, "main");
        assert_eq!(config.runtime_alias, "rt");
        assert!(config.require_entry);
    }

    #[test]
    fn test_named_constructors() {
        assert!(CompilerConfig::dynamic().is_dynamic());
        assert!(!CompilerConfig::library().require_entry);
        assert!(!CompilerConfig::library().is_dynamic());
    }
}
