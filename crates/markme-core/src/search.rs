//! Page text assembly and exact term search
//!
//! Glyphs are joined into one string per page. A space is inserted where
//! the gap between two glyphs is wide enough to be a word break, and where
//! the text jumps to another line. Whitespace runs collapse to one space.
//! Matching is exact and case-sensitive; the term's own whitespace runs are
//! collapsed the same way before searching.

use crate::geometry::{Quad, Rect};
use crate::layout::Glyph;
use serde::Serialize;

/// Gap along the baseline, in font sizes, read as a word break
const WORD_GAP: f64 = 0.2;
/// Offset across the baseline, in font sizes, read as a new line
const LINE_SHIFT: f64 = 0.5;
/// Backward jump along the baseline, in font sizes, read as a new line
const LINE_BACKTRACK: f64 = 1.0;

/// One occurrence of a term on a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    /// One quad per text line the occurrence covers
    pub quads: Vec<Quad>,
    pub rect: Rect,
}

/// Searchable text of one page
#[derive(Debug, Clone, Default)]
pub struct TextLayer {
    text: String,
    /// Glyph index for every byte of `text`; `None` for inserted spaces
    owners: Vec<Option<usize>>,
    glyphs: Vec<Glyph>,
    /// Line number of each glyph
    lines: Vec<usize>,
}

impl TextLayer {
    pub fn new(glyphs: Vec<Glyph>) -> Self {
        let mut layer = TextLayer {
            text: String::new(),
            owners: Vec::new(),
            lines: Vec::with_capacity(glyphs.len()),
            glyphs: Vec::new(),
        };

        let mut line = 0usize;
        let mut prev: Option<&Glyph> = None;
        for (index, glyph) in glyphs.iter().enumerate() {
            if let Some(p) = prev {
                match Break::between(p, glyph) {
                    Break::Line => {
                        line += 1;
                        layer.push_char(' ', None);
                    }
                    Break::Word => layer.push_char(' ', None),
                    Break::None => {}
                }
            }
            for ch in glyph.text.chars() {
                layer.push_char(ch, Some(index));
            }
            layer.lines.push(line);
            // Space glyphs carry no break information of their own
            if !glyph.text.chars().all(char::is_whitespace) || prev.is_none() {
                prev = Some(glyph);
            }
        }
        layer.glyphs = glyphs;
        layer
    }

    fn push_char(&mut self, ch: char, owner: Option<usize>) {
        if ch.is_whitespace() {
            if self.text.is_empty() || self.text.ends_with(' ') {
                return;
            }
            self.text.push(' ');
            self.owners.push(owner);
            return;
        }
        self.text.push(ch);
        for _ in 0..ch.len_utf8() {
            self.owners.push(owner);
        }
    }

    /// Extracted page text after whitespace normalization
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Find every non-overlapping occurrence of `term`
    pub fn search(&self, term: &str) -> Vec<Region> {
        let needle = normalize_whitespace(term);
        if needle.is_empty() {
            return Vec::new();
        }
        self.text
            .match_indices(needle.as_str())
            .filter_map(|(start, matched)| self.region_for(start, start + matched.len()))
            .collect()
    }

    fn region_for(&self, start: usize, end: usize) -> Option<Region> {
        let mut indices: Vec<usize> = self.owners[start..end].iter().flatten().copied().collect();
        indices.dedup();

        let mut quads: Vec<Quad> = Vec::new();
        let mut current: Option<(usize, Quad)> = None;
        for index in indices {
            let glyph = &self.glyphs[index];
            if glyph.text.chars().all(char::is_whitespace) && current.is_none() {
                continue;
            }
            let line = self.lines[index];
            current = match current {
                Some((l, quad)) if l == line => Some((
                    l,
                    Quad {
                        ul: quad.ul,
                        ll: quad.ll,
                        ur: glyph.quad.ur,
                        lr: glyph.quad.lr,
                    },
                )),
                Some((_, quad)) => {
                    quads.push(quad);
                    Some((line, glyph.quad))
                }
                None => Some((line, glyph.quad)),
            };
        }
        if let Some((_, quad)) = current {
            quads.push(quad);
        }

        let rect = quads
            .iter()
            .map(Quad::bounds)
            .reduce(|a, b| a.union(&b))?;
        Some(Region { quads, rect })
    }
}

#[derive(Debug, PartialEq)]
enum Break {
    None,
    Word,
    Line,
}

impl Break {
    fn between(prev: &Glyph, next: &Glyph) -> Break {
        let size = prev.size.max(next.size).max(f64::EPSILON);
        let dx = next.origin.x - prev.end.x;
        let dy = next.origin.y - prev.end.y;
        let along = dx * prev.direction.x + dy * prev.direction.y;
        let across = -dx * prev.direction.y + dy * prev.direction.x;

        if across.abs() > LINE_SHIFT * size || along < -LINE_BACKTRACK * size {
            Break::Line
        } else if along > WORD_GAP * size {
            Break::Word
        } else {
            Break::None
        }
    }
}

/// Trim and collapse every whitespace run to a single space
pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: normalized text never has leading, trailing or doubled spaces
        #[test]
        fn normalized_has_single_spaces(input in "[a-z \t\n]{0,40}") {
            let out = normalize_whitespace(&input);
            prop_assert!(!out.starts_with(' '));
            prop_assert!(!out.ends_with(' '));
            prop_assert!(!out.contains("  "));
        }

        /// Property: normalization is idempotent
        #[test]
        fn normalize_is_idempotent(input in ".{0,40}") {
            let once = normalize_whitespace(&input);
            prop_assert_eq!(normalize_whitespace(&once), once.clone());
        }
    }
}
