use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cheatsheet::Config;

#[derive(Parser)]
#[command(name = "cheatsheet")]
#[command(about = "Render cheat-sheet guides to Typst and PDF")]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a guide to PDF
    Pdf {
        /// Input guide file
        input: PathBuf,

        /// Output PDF file (defaults to input name with .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (defaults to the built-in theme)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the Typst markup for a guide
    Typst {
        /// Input guide file
        input: PathBuf,

        /// Config file (defaults to the built-in theme)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the parsed block tree as JSON
    Tree {
        /// Input guide file
        input: PathBuf,
    },

    /// Print the highlighted lines of a source file as JSON
    Highlight {
        /// Source file to highlight
        input: PathBuf,

        /// Language tag, as written after a code fence
        #[arg(short, long, default_value = cheatsheet::DEFAULT_LANGUAGE)]
        language: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Pdf {
            input,
            output,
            config,
        } => {
            let text = read_input(&input)?;
            let config = load_config(config.as_deref())?;
            let pdf_bytes = cheatsheet::markdown_to_pdf_with_config(&text, &config)?;

            // Determine output path
            let output = output.unwrap_or_else(|| input.with_extension("pdf"));
            fs::write(&output, pdf_bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;

            info!(path = %output.display(), "wrote pdf");
            println!("Created {}", output.display());
        }
        Command::Typst { input, config } => {
            let text = read_input(&input)?;
            let config = load_config(config.as_deref())?;
            print!("{}", cheatsheet::markdown_to_typst_with_config(&text, &config));
        }
        Command::Tree { input } => {
            let text = read_input(&input)?;
            let blocks = cheatsheet::parse(&text);
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
        Command::Highlight { input, language } => {
            let code = read_input(&input)?;
            let lines = cheatsheet::highlight(&code, &language);
            println!("{}", serde_json::to_string_pretty(&lines)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::compiled_default()),
    }
}

