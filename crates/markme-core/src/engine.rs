//! Multi-term highlight engine
//!
//! Two entry points share one traversal order: pages first, then pairs in
//! the order given. `count_occurrences` only reads; `apply_highlights`
//! writes one highlight annotation per occurrence into a new file.

use crate::annotate::HighlightAnnotation;
use crate::color::hex_to_rgb;
use crate::document::{PdfDocument, SaveOptions};
use crate::error::{DocumentError, HighlightError};
use crate::pair::{normalize_pairs, TermColorPair};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    /// Structural optimization when saving
    pub optimize: bool,
    /// Annotation opacity; unset leaves it to the viewer
    pub opacity: Option<f32>,
    /// Annotation author (`/T`)
    pub author: Option<String>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            opacity: None,
            author: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub page: u32,
    pub annotations: usize,
}

/// Outcome of a successful apply
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ApplySummary {
    pub pages_scanned: usize,
    pub annotations_added: usize,
    /// Pages that received at least one annotation
    pub pages: Vec<PageSummary>,
    pub processing_time_ms: u64,
}

/// Count occurrences of every pair's term across the whole document.
///
/// Pairs whose term is blank are dropped; with none left the result is 0
/// and the file is not opened. A term shared by two pairs counts twice.
pub fn count_occurrences(
    path: impl AsRef<Path>,
    pairs: &[TermColorPair],
) -> Result<usize, HighlightError> {
    let pairs = normalize_pairs(pairs);
    if pairs.is_empty() {
        return Ok(0);
    }

    let doc = PdfDocument::open(path.as_ref()).map_err(HighlightError::Read)?;
    let total = count_in_document(&doc, &pairs).map_err(HighlightError::Read)?;
    info!(path = %doc.path().display(), terms = pairs.len(), total, "Counted occurrences");
    doc.close();
    Ok(total)
}

/// [`count_occurrences`] over an already open document
pub fn count_in_document(doc: &PdfDocument, pairs: &[TermColorPair]) -> Result<usize, DocumentError> {
    let pairs = normalize_pairs(pairs);
    if pairs.is_empty() {
        return Ok(0);
    }

    let mut total = 0;
    for page in doc.pages() {
        let layer = doc.text_layer(page)?;
        let found: usize = pairs.iter().map(|pair| layer.search(&pair.term).len()).sum();
        debug!(page = page.number, found, "Counted page");
        total += found;
    }
    Ok(total)
}

/// Highlight every occurrence with default options
pub fn apply_highlights(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    pairs: &[TermColorPair],
) -> Result<ApplySummary, HighlightError> {
    apply_highlights_with(input, output, pairs, &ApplyOptions::default())
}

/// Highlight every occurrence of every pair's term and write the result to
/// `output`. The input file is left untouched.
///
/// Writing `output` over `input` is not supported.
pub fn apply_highlights_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    pairs: &[TermColorPair],
    options: &ApplyOptions,
) -> Result<ApplySummary, HighlightError> {
    let start = Instant::now();
    let pairs = normalize_pairs(pairs);
    if pairs.is_empty() {
        return Err(HighlightError::NoTerms);
    }

    let input = input.as_ref();
    let output = output.as_ref();
    let mut doc = PdfDocument::open(input).map_err(HighlightError::Read)?;
    let mut summary = ApplySummary::default();

    for page in doc.pages() {
        let layer = doc.text_layer(page).map_err(HighlightError::Read)?;
        summary.pages_scanned += 1;

        let mut added = 0;
        for pair in &pairs {
            let color = hex_to_rgb(&pair.color);
            let regions = layer.search(&pair.term);
            debug!(
                page = page.number,
                term = %pair.term,
                %color,
                matches = regions.len(),
                "Resolved pair"
            );
            for region in regions {
                HighlightAnnotation::new(page, &region)
                    .set_color(color)
                    .set_opacity(options.opacity)
                    .set_author(options.author.clone())
                    .commit(&mut doc)
                    .map_err(HighlightError::Read)?;
                added += 1;
            }
        }

        debug!(page = page.number, added, "Highlighted page");
        if added > 0 {
            summary.pages.push(PageSummary {
                page: page.number,
                annotations: added,
            });
        }
        summary.annotations_added += added;
    }

    doc.save(
        output,
        &SaveOptions {
            optimize: options.optimize,
        },
    )
    .map_err(HighlightError::Write)?;
    doc.close();

    summary.processing_time_ms = start.elapsed().as_millis() as u64;
    info!(
        input = %input.display(),
        output = %output.display(),
        annotations = summary.annotations_added,
        pages = summary.pages_scanned,
        "Applied highlights"
    );
    Ok(summary)
}
