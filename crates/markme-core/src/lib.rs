//! Multi-term PDF highlighting
//!
//! This crate finds exact occurrences of text terms in a PDF's text layer
//! and overlays one colored highlight annotation per occurrence.
//!
//! - `count_occurrences`: read-only pre-flight count across all pages
//! - `apply_highlights` / `apply_highlights_with`: annotate and write a new file
//!
//! Text extraction is done here rather than by lopdf: `layout` interprets
//! page content streams into positioned glyphs and `search` matches terms
//! against the assembled page text.

pub mod annotate;
pub mod cmap;
pub mod color;
pub mod document;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod layout;
pub mod objects;
pub mod pair;
pub mod search;

pub use annotate::HighlightAnnotation;
pub use color::{hex_to_rgb, normalize_hex, Rgb, DEFAULT_HEX};
pub use document::{PageHandle, PdfDocument, SaveOptions};
pub use engine::{
    apply_highlights, apply_highlights_with, count_in_document, count_occurrences, ApplyOptions,
    ApplySummary, PageSummary,
};
pub use error::{DocumentError, HighlightError};
pub use geometry::{Point, Quad, Rect};
pub use pair::{normalize_pairs, pair_terms, with_uniform_color, TermColorPair};
pub use search::{Region, TextLayer};
