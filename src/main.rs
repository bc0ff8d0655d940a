//! Pigeon CLI
//!
//! Command-line interface for the Pigeon compiler.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser as CliParser;
use tracing_subscriber::EnvFilter;

use pigeon::{compile, check, CompilerConfig, Diagnostic, Dialect, Lexer, PigeonError, VERSION};

/// Compile a Pigeon source file to Go
#[derive(Debug, CliParser)]
#[command(name = "pigeon", version = VERSION)]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Write the generated Go here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compile the dynamic dialect
    #[arg(long)]
    dynamic: bool,

    /// Name of the emitted package
    #[arg(long, default_value = "main")]
    package: String,

    /// Import path of the runtime library
    #[arg(long, default_value = pigeon::runtime::DEFAULT_IMPORT_PATH)]
    runtime: String,

    /// Do not require or emit an entry function
    #[arg(long)]
    no_entry: bool,

    /// Show tokenization output (lexer only)
    #[arg(short, long)]
    tokens: bool,

    /// Stop after type checking
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn config(&self) -> CompilerConfig {
        CompilerConfig {
            dialect: if self.dynamic {
                Dialect::Dynamic
            } else {
                Dialect::Static
            },
            package_name: self.package.clone(),
            runtime_import: self.runtime.clone(),
            require_entry: !self.no_entry,
            ..CompilerConfig::new()
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PIGEON_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(message) = run(&cli) {
        eprintln!("{}", message);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let filename = cli.input.display().to_string();
    let source = fs::read_to_string(&cli.input)
        .map_err(|e| format!("Failed to read file '{}': {}", filename, e))?;

    if cli.tokens {
        return show_tokens(&source, &filename);
    }

    let config = cli.config();
    if cli.check {
        check(&source, Some(&filename), &config).map_err(|e| report(&e, &source))?;
        return Ok(());
    }

    let emitted = compile(&source, Some(&filename), &config).map_err(|e| report(&e, &source))?;
    match &cli.output {
        Some(path) => fs::write(path, &emitted.code)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e)),
        None => {
            print!("{}", emitted.code);
            Ok(())
        }
    }
}

fn report(error: &PigeonError, source: &str) -> String {
    Diagnostic::with_source(error, source).format()
}

/// Show tokens from lexing a file
fn show_tokens(source: &str, filename: &str) -> Result<(), String> {
    let tokens = Lexer::new(source, Some(filename))
        .tokenize()
        .map_err(|e| report(&e, source))?;

    println!("Tokens for '{}':", filename);
    println!("{}", "=".repeat(60));

    for (i, token) in tokens.iter().enumerate() {
        println!(
            "{:4}: {:20} | {:?}",
            i,
            format!("{:?}", token.token_type),
            token.lexeme
        );
    }

    println!("{}", "=".repeat(60));
    println!("Total tokens: {}", tokens.len());

    Ok(())
}
