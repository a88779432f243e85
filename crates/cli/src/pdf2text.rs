//! pdf2text - Extract plain text from PDF files
//!
//! Writes the text of the selected pages, pages separated by a blank line.

mod common;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use pdfrows_core::{BackendKind, PageSelection, extract_text, number_of_pages};

use common::{init_logging, open_output, parse_backend, parse_pages};

/// Extract plain text from PDF files.
#[derive(Parser, Debug)]
#[command(name = "pdf2text")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more paths to PDF files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Pages to read (1-indexed), e.g. "1,3,5-10"
    #[arg(short = 'p', long)]
    pages: Option<String>,

    /// PDF engine: pdf-extract or pdfium (default: first available)
    #[arg(short = 'b', long)]
    backend: Option<String>,

    /// Print the page count of each file instead of its text
    #[arg(long = "count-pages", action = ArgAction::SetTrue)]
    count_pages: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

fn process_file(
    path: &Path,
    pages: &PageSelection,
    backend: Option<BackendKind>,
    output: &mut dyn Write,
) -> Result<()> {
    let mut first = true;
    for text in extract_text(path, pages, backend)? {
        if !first {
            writeln!(output)?;
        }
        first = false;
        writeln!(output, "{}", text?)?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let pages = parse_pages(args.pages.as_deref())?;
    let backend = parse_backend(args.backend.as_deref())?;
    let mut output = open_output(&args.outfile)?;
    for path in &args.files {
        if !path.exists() {
            anyhow::bail!("file not found: {}", path.display());
        }
        tracing::debug!(file = %path.display(), "reading");
        if args.count_pages {
            let count = number_of_pages(path.as_path(), backend)
                .with_context(|| format!("error processing {}", path.display()))?;
            writeln!(output, "{}\t{count}", path.display())?;
            continue;
        }
        process_file(path, &pages, backend, &mut output)
            .with_context(|| format!("error processing {}", path.display()))?;
    }
    output.flush()?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(err) = run(&args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
