//! Rule Export CLI
//!
//! Compiles a JSON or TOML schema document into the flattened rule mapping
//! consumed by the validation engine.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use ruletree::{BuilderConfig, OutputFormat, SchemaDocument};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ruletree-export")]
#[command(about = "Compile schema documents into dot-path validation rules")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rule mapping of a document as JSON
    Compile {
        /// Schema document (.json or .toml)
        document: PathBuf,

        /// Single-line JSON regardless of configuration
        #[arg(long)]
        compact: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the dot-paths a document produces
    Paths {
        /// Schema document (.json or .toml)
        document: PathBuf,

        /// Show `|`-joined rules next to each path
        #[arg(short, long)]
        rules: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli
        .config
        .as_ref()
        .map(|path| path.to_string_lossy().into_owned());
    let config = BuilderConfig::load_from(config_path.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Compile {
            document,
            compact,
            output,
        } => {
            let rules = compile(&document, &config)?;
            let format = if compact {
                OutputFormat::Compact
            } else {
                config.export.output_format
            };
            let json = rules.to_json(format)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{}\n", json))
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("✅ Wrote {} paths to {}", rules.len(), path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Paths { document, rules } => {
            let compiled = compile(&document, &config)?;
            if rules {
                for (path, joined) in compiled.to_pipe_strings() {
                    println!("{:<40} {}", display_key(&path), joined);
                }
            } else {
                for path in compiled.paths() {
                    println!("{}", display_key(path));
                }
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn compile(document: &Path, config: &BuilderConfig) -> anyhow::Result<ruletree::RuleSet> {
    let doc = SchemaDocument::from_path(document)
        .with_context(|| format!("Failed to load {}", document.display()))?;
    let rules = doc
        .compile(config.clone())
        .with_context(|| format!("Failed to compile {}", document.display()))?;
    Ok(rules)
}

/// The root's own key is empty; show it quoted so it is visible
fn display_key(path: &str) -> &str {
    if path.is_empty() {
        "\"\""
    } else {
        path
    }
}
