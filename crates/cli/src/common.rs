//! Pieces shared by the command line tools.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use pdfrows_core::{BackendKind, PageSelection};

/// Install the log subscriber. `RUST_LOG` wins over `--debug`.
pub fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

/// Stdout for `-`, otherwise a newly created file.
pub fn open_output(outfile: &str) -> Result<Box<dyn Write>> {
    if outfile == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file =
        File::create(outfile).with_context(|| format!("failed to create output file {outfile}"))?;
    Ok(Box::new(BufWriter::new(file)))
}

pub fn parse_pages(pages: Option<&str>) -> Result<PageSelection> {
    match pages {
        Some(ranges) => ranges.parse::<PageSelection>().context("invalid --pages"),
        None => Ok(PageSelection::All),
    }
}

pub fn parse_backend(backend: Option<&str>) -> Result<Option<BackendKind>> {
    backend
        .map(|name| name.parse::<BackendKind>().context("invalid --backend"))
        .transpose()
}
