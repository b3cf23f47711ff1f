//! `mark`: highlight terms in a PDF from the command line
//!
//! ```text
//! mark report.pdf -t "revenue" -t "cost" -c "#00ff00" -o marked.pdf
//! ```
//!
//! The i-th `-t` gets the i-th `-c`; terms without a color use the configured
//! default. Nothing is written when no term occurs in the document.

pub mod config;

use anyhow::{bail, Context};
use clap::Parser;
use markme_core::{
    apply_highlights_with, count_occurrences, pair_terms, with_uniform_color, ApplySummary,
    TermColorPair,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub use config::Config;

#[derive(Parser, Debug, Clone)]
#[command(name = "mark")]
#[command(version, about = "Highlight terms in a PDF with per-term colors")]
pub struct Args {
    /// PDF file to highlight
    #[arg(value_name = "PDF")]
    pub input: PathBuf,

    /// Term to highlight (repeatable)
    #[arg(short = 't', long = "term", value_name = "TERM")]
    pub terms: Vec<String>,

    /// Hex color for the term in the same position (repeatable)
    #[arg(short = 'c', long = "color", value_name = "HEX")]
    pub colors: Vec<String>,

    /// One color for every term, overriding -c
    #[arg(long, value_name = "HEX")]
    pub color_all: Option<String>,

    /// Output file; defaults to <name>_marked.pdf next to the input
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// TOML config file (falls back to $MARKME_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a JSON report instead of a status line
    #[arg(long)]
    pub json: bool,
}

/// What a run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Done(Report),
    NothingToDo { input: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub input: PathBuf,
    pub output: PathBuf,
    pub pairs: Vec<TermColorPair>,
    pub occurrences: usize,
    pub summary: ApplySummary,
}

impl Outcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Done(_) => 0,
            Outcome::NothingToDo { .. } => 1,
        }
    }

    pub fn render(&self, json: bool) -> anyhow::Result<String> {
        if json {
            return serde_json::to_string_pretty(self).context("Failed to serialize report");
        }
        Ok(match self {
            Outcome::Done(report) => format!("Done: {}", report.output.display()),
            Outcome::NothingToDo { .. } => {
                "No occurrences of the terms in the PDF. Nothing to do.".to_string()
            }
        })
    }
}

/// Highlight the requested terms in `args.input`
pub fn run(args: &Args, config: &Config) -> anyhow::Result<Outcome> {
    let terms: Vec<String> = args
        .terms
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        bail!("give at least one term (-t 'term')");
    }

    let input = absolute(&args.input)?;
    if !input.is_file() {
        bail!("file not found: {}", input.display());
    }

    let pairs = match &args.color_all {
        Some(color) => with_uniform_color(&terms, color),
        None => pair_terms(&terms, &args.colors, &config.default_color),
    };

    let occurrences = count_occurrences(&input, &pairs)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    if occurrences == 0 {
        tracing::info!(input = %input.display(), "No occurrences found");
        return Ok(Outcome::NothingToDo { input });
    }

    let output = match &args.output {
        Some(path) => absolute(path)?,
        None => default_output(&input, &config.output_suffix),
    };
    if same_file(&input, &output) {
        bail!("output would overwrite the input: {}", output.display());
    }

    tracing::info!(
        terms = pairs.len(),
        occurrences,
        output = %output.display(),
        "Applying highlights"
    );
    let summary = apply_highlights_with(&input, &output, &pairs, &config.apply_options())
        .with_context(|| format!("Failed to process {}", input.display()))?;

    Ok(Outcome::Done(Report {
        input,
        output,
        pairs,
        occurrences,
        summary,
    }))
}

/// `<dir>/<stem><suffix>.pdf`
pub fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}{}.pdf", stem, suffix))
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display()))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
