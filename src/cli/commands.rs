//! CLI commands implementation.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;

use crate::config::ExtractConfig;
use crate::extract::{tools, Extractor};

#[derive(Parser)]
#[command(name = "pdftext")]
#[command(about = "PDF text extraction with per-page OCR fallback")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a PDF, with OCR fallback for sparse pages
    Extract {
        /// PDF file to extract
        file: PathBuf,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,

        /// Number of concurrent OCR workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Rasterization resolution in DPI
        #[arg(long)]
        dpi: Option<u32>,

        /// Minimum embedded-text length before a page falls back to OCR
        #[arg(long)]
        min_chars: Option<usize>,

        /// Tesseract language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Check that the required external tools are installed
    Tools,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ExtractConfig::from_file(path)?,
        None => ExtractConfig::default(),
    };

    match cli.command {
        Commands::Extract {
            file,
            json,
            workers,
            dpi,
            min_chars,
            language,
        } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if let Some(dpi) = dpi {
                config.dpi = dpi;
            }
            if let Some(min_chars) = min_chars {
                config.min_direct_chars = min_chars;
            }
            if let Some(language) = language {
                config.language = language;
            }
            extract_command(&file, json, config).await
        }
        Commands::Tools => tools_command(),
    }
}

async fn extract_command(file: &Path, json: bool, config: ExtractConfig) -> anyhow::Result<()> {
    let extractor = Extractor::new(config);
    let result = extractor.extract(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "  {} {} pages, OCR {}",
        style("✓").green(),
        result.page_count,
        if result.ocr_used { "used" } else { "not needed" }
    );
    for page in &result.pages {
        println!();
        println!("{}", style(format!("--- Page {} ---", page.page_number)).cyan());
        println!("{}", page.text);
    }

    Ok(())
}

fn tools_command() -> anyhow::Result<()> {
    let mut all_available = true;
    for (tool, available) in tools::check_tools() {
        if available {
            println!("  {} {}", style("✓").green(), tool);
        } else {
            println!("  {} {} (missing)", style("✗").red(), tool);
            all_available = false;
        }
    }
    if !all_available {
        println!();
        println!(
            "  install poppler-utils and tesseract-ocr to enable all extraction paths"
        );
    }
    Ok(())
}
