//! pdf2table - Extract tables from PDF files
//!
//! Groups the positioned text of each page into rows and columns and
//! writes the resulting table as TSV or JSON.

mod common;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use pdfrows_core::api::{TableOptions, extract_table};
use pdfrows_core::{AlgorithmChoice, ObjectMatcher};
use regex::Regex;
use serde::Serialize;

use common::{init_logging, open_output, parse_backend, parse_pages};

/// Output format for the extracted rows.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Tab-separated values, one row per line (default)
    #[default]
    Tsv,
    /// One JSON document per input file
    Json,
}

/// Extract tables from PDF files.
#[derive(Parser, Debug)]
#[command(name = "pdf2table")]
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

    /// Extraction algorithm: y-groups, header-position or rects-boundaries
    #[arg(short = 'a', long, default_value = "y-groups")]
    algorithm: String,

    /// PDF engine: pdf-extract or pdfium (default: first available)
    #[arg(short = 'b', long)]
    backend: Option<String>,

    /// Column grouping tolerance in points
    #[arg(long = "x-threshold", default_value = "0.5")]
    x_threshold: f64,

    /// Row grouping tolerance in points
    #[arg(long = "y-threshold", default_value = "0.5")]
    y_threshold: f64,

    /// Derive both tolerances from the text size instead
    #[arg(long = "auto-threshold", action = ArgAction::SetTrue)]
    auto_threshold: bool,

    /// Start at the first text equal to this (the text itself is kept)
    #[arg(long = "starts-after", conflicts_with = "starts_after_regex")]
    starts_after: Option<String>,

    /// Start at the first text matching this regular expression
    #[arg(long = "starts-after-regex")]
    starts_after_regex: Option<String>,

    /// Stop before the first text equal to this
    #[arg(long = "ends-before", conflicts_with = "ends_before_regex")]
    ends_before: Option<String>,

    /// Stop before the first text matching this regular expression
    #[arg(long = "ends-before-regex")]
    ends_before_regex: Option<String>,

    /// Type of output to generate
    #[arg(short = 'f', long, value_enum, default_value = "tsv")]
    format: OutputFormat,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

#[derive(Serialize)]
struct FileTable<'a> {
    file: &'a Path,
    rows: Vec<Vec<String>>,
}

fn matcher(exact: Option<&str>, pattern: Option<&str>, flag: &str) -> Result<Option<ObjectMatcher>> {
    if let Some(pattern) = pattern {
        let regex = Regex::new(pattern).with_context(|| format!("invalid --{flag}-regex"))?;
        return Ok(Some(regex.into()));
    }
    Ok(exact.map(ObjectMatcher::from))
}

fn build_options(args: &Args) -> Result<TableOptions> {
    let algorithm = args.algorithm.parse::<AlgorithmChoice>().context("invalid --algorithm")?;
    let (x_threshold, y_threshold) = if args.auto_threshold {
        (None, None)
    } else {
        (Some(args.x_threshold), Some(args.y_threshold))
    };
    Ok(TableOptions {
        pages: parse_pages(args.pages.as_deref())?,
        algorithm,
        starts_after: matcher(
            args.starts_after.as_deref(),
            args.starts_after_regex.as_deref(),
            "starts-after",
        )?,
        ends_before: matcher(
            args.ends_before.as_deref(),
            args.ends_before_regex.as_deref(),
            "ends-before",
        )?,
        x_threshold,
        y_threshold,
        backend: parse_backend(args.backend.as_deref())?,
    })
}

/// Escape the characters that would break a TSV row.
fn tsv_cell(cell: &str) -> String {
    cell.replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
}

fn process_file(path: &Path, options: &TableOptions, format: OutputFormat, output: &mut dyn Write) -> Result<()> {
    let lines = extract_table(path, options.clone())?;
    match format {
        OutputFormat::Tsv => {
            for line in lines {
                let cells: Vec<String> = line?.iter().map(|cell| tsv_cell(cell)).collect();
                writeln!(output, "{}", cells.join("\t"))?;
            }
        }
        OutputFormat::Json => {
            let rows = lines.collect::<pdfrows_core::Result<Vec<_>>>()?;
            serde_json::to_writer_pretty(&mut *output, &FileTable { file: path, rows })?;
            writeln!(output)?;
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let options = build_options(args)?;
    tracing::debug!(?options, "parsed options");
    let mut output = open_output(&args.outfile)?;
    for path in &args.files {
        if !path.exists() {
            anyhow::bail!("file not found: {}", path.display());
        }
        process_file(path, &options, args.format, &mut output)
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
