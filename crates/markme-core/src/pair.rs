//! Term/color pairs driving highlight passes

use crate::color::{normalize_hex, DEFAULT_HEX};
use serde::{Deserialize, Serialize};

/// One term to search for and the hex color its highlights get
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermColorPair {
    pub term: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_HEX.to_string()
}

impl TermColorPair {
    pub fn new(term: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            color: color.into(),
        }
    }
}

/// Trim every term and drop pairs whose term ends up empty.
///
/// Order of the surviving pairs is preserved.
pub fn normalize_pairs(pairs: &[TermColorPair]) -> Vec<TermColorPair> {
    pairs
        .iter()
        .filter_map(|pair| {
            let term = pair.term.trim();
            if term.is_empty() {
                None
            } else {
                Some(TermColorPair::new(term, pair.color.clone()))
            }
        })
        .collect()
}

/// Pair terms with colors positionally: the first term gets the first color
/// and so on. Terms without a color get `fallback`. Extra colors are ignored.
pub fn pair_terms(terms: &[String], colors: &[String], fallback: &str) -> Vec<TermColorPair> {
    terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .enumerate()
        .map(|(i, term)| {
            let color = colors
                .get(i)
                .map(|c| normalize_hex(c))
                .unwrap_or_else(|| normalize_hex(fallback));
            TermColorPair::new(term.trim(), color)
        })
        .collect()
}

/// Give every term the same color
pub fn with_uniform_color(terms: &[String], color: &str) -> Vec<TermColorPair> {
    let color = normalize_hex(color);
    terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|term| TermColorPair::new(term.trim(), color.clone()))
        .collect()
}
