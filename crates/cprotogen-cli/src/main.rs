//! cprotogen CLI
//!
//! Generate or refresh the prototypes of a C header from its source file.

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use cprotogen_core::Config;
use cprotogen_header::{generate_prototypes, GenerateOptions};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cprotogen")]
#[command(author, version, about = "Generate C prototypes from source files.", long_about = None)]
struct Cli {
    /// Path to the source C file
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Path to the header file to create or update
    #[arg(long, value_name = "PATH")]
    header: Option<PathBuf>,

    /// Overwrite an existing header file (true/false/yes/no/1/0)
    #[arg(
        long,
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    overwrite: bool,

    /// Increase output verbosity
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run the C preprocessor before parsing
    #[arg(long)]
    preprocess: bool,

    /// Include directory for the preprocessor
    #[arg(short = 'I', value_name = "DIR")]
    include: Vec<PathBuf>,

    /// Macro definition for the preprocessor (NAME or NAME=VALUE)
    #[arg(short = 'D', value_name = "MACRO")]
    define: Vec<String>,

    /// Leave static functions out of the header
    #[arg(long)]
    no_static: bool,

    /// How to print prototypes when no header is given
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    debug!("Configuration: {:?}", config);

    let options = GenerateOptions {
        header: cli.header.clone(),
        overwrite: cli.overwrite,
    };
    let prototypes = generate_prototypes(&cli.source, &options, &config)
        .with_context(|| format!("failed to process {}", cli.source.display()))?;

    if options.header.is_none() {
        print_prototypes(&prototypes, cli.format)?;
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration file first, command-line flags on top
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };

    if cli.preprocess {
        config.parser.preprocess = true;
    }
    config.parser.include_dirs.extend(cli.include.iter().cloned());
    config.parser.defines.extend(cli.define.iter().cloned());
    if cli.no_static {
        config.header.include_static = false;
    }

    Ok(config)
}

fn print_prototypes(prototypes: &[String], format: Format) -> Result<()> {
    match format {
        Format::Text => {
            for prototype in prototypes {
                print!("{}", prototype);
            }
        }
        Format::Json => {
            let trimmed: Vec<&str> = prototypes.iter().map(|p| p.trim_end()).collect();
            println!("{}", serde_json::to_string_pretty(&trimmed)?);
        }
    }
    Ok(())
}
