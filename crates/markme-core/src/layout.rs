//! Content stream interpretation
//!
//! Runs a page's content operators through a small graphics/text state
//! machine and records every shown glyph with its position in user space.
//! Only the operators that move text or change its metrics are honored;
//! painting operators are skipped.

use crate::fonts::PdfFont;
use crate::geometry::{Matrix, Point, Quad};
use crate::objects::{self, number};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::rc::Rc;

/// Nesting limit for Form XObjects drawn inside Form XObjects
const MAX_FORM_DEPTH: usize = 8;
/// Parent chain limit when looking up inherited page resources
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// A glyph placed on the page
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    pub quad: Quad,
    /// Start of the glyph on the baseline
    pub origin: Point,
    /// End of the glyph's advance on the baseline
    pub end: Point,
    /// Unit vector along the baseline
    pub direction: Point,
    /// Font size in user space units
    pub size: f64,
}

type FontMap = HashMap<Vec<u8>, Rc<PdfFont>>;

#[derive(Debug, Clone)]
struct TextState {
    font: Option<Rc<PdfFont>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    /// `Tz` divided by 100
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// Collect the glyphs of one page in content order
pub fn page_glyphs(doc: &Document, page_id: ObjectId) -> Result<Vec<Glyph>, lopdf::Error> {
    let data = doc.get_page_content(page_id)?;
    let content = Content::decode(&data)?;
    let resources = page_resources(doc, page_id);

    let mut layout = Layout {
        doc,
        glyphs: Vec::new(),
        default_font: Rc::new(PdfFont::default()),
    };
    layout.run(&content.operations, resources, GraphicsState::default(), 0);
    Ok(layout.glyphs)
}

/// The page's `/Resources`, inherited from the page tree when absent
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Some(resources) = objects::get_dict(doc, node, b"Resources") {
            return Some(resources);
        }
        node = objects::get_dict(doc, node, b"Parent")?;
    }
    None
}

fn load_fonts(doc: &Document, resources: Option<&Dictionary>) -> FontMap {
    let mut fonts = FontMap::new();
    let Some(font_dict) = resources.and_then(|r| objects::get_dict(doc, r, b"Font")) else {
        return fonts;
    };
    for (name, obj) in font_dict.iter() {
        match objects::resolve(doc, obj).and_then(|o| o.as_dict().ok()) {
            Some(dict) => {
                fonts.insert(name.clone(), Rc::new(PdfFont::from_dict(doc, dict)));
            }
            None => tracing::warn!(
                "Font resource /{} is not a dictionary",
                String::from_utf8_lossy(name)
            ),
        }
    }
    fonts
}

struct Layout<'a> {
    doc: &'a Document,
    glyphs: Vec<Glyph>,
    default_font: Rc<PdfFont>,
}

impl<'a> Layout<'a> {
    fn run(
        &mut self,
        operations: &[Operation],
        resources: Option<&'a Dictionary>,
        initial: GraphicsState,
        depth: usize,
    ) {
        let fonts = load_fonts(self.doc, resources);
        let mut state = initial;
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut tm = Matrix::IDENTITY;
        let mut tlm = Matrix::IDENTITY;

        for op in operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operand(operands) {
                        state.ctm = m.then(&state.ctm);
                    }
                }
                "BT" => {
                    tm = Matrix::IDENTITY;
                    tlm = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tf" => {
                    let name = operands.first().and_then(|o| o.as_name().ok());
                    state.text.font_size = operands.get(1).and_then(number).unwrap_or(0.0);
                    state.text.font = name.and_then(|n| fonts.get(n).cloned());
                    if state.text.font.is_none() {
                        tracing::debug!(
                            "Font /{} not found in resources, using default metrics",
                            name.map(|n| String::from_utf8_lossy(n).to_string())
                                .unwrap_or_default()
                        );
                    }
                }
                "Tc" => state.text.char_spacing = first_number(operands),
                "Tw" => state.text.word_spacing = first_number(operands),
                "Tz" => state.text.horizontal_scale = first_number(operands) / 100.0,
                "TL" => state.text.leading = first_number(operands),
                "Ts" => state.text.rise = first_number(operands),
                "Td" => {
                    let (tx, ty) = pair_operand(operands);
                    tlm = Matrix::translation(tx, ty).then(&tlm);
                    tm = tlm;
                }
                "TD" => {
                    let (tx, ty) = pair_operand(operands);
                    state.text.leading = -ty;
                    tlm = Matrix::translation(tx, ty).then(&tlm);
                    tm = tlm;
                }
                "Tm" => {
                    if let Some(m) = matrix_operand(operands) {
                        tlm = m;
                        tm = m;
                    }
                }
                "T*" => {
                    tlm = Matrix::translation(0.0, -state.text.leading).then(&tlm);
                    tm = tlm;
                }
                "Tj" => {
                    if let Some(bytes) = string_operand(operands.first()) {
                        self.show(bytes, &state, &mut tm);
                    }
                }
                "'" => {
                    tlm = Matrix::translation(0.0, -state.text.leading).then(&tlm);
                    tm = tlm;
                    if let Some(bytes) = string_operand(operands.first()) {
                        self.show(bytes, &state, &mut tm);
                    }
                }
                "\"" => {
                    state.text.word_spacing = operands.first().and_then(number).unwrap_or(0.0);
                    state.text.char_spacing = operands.get(1).and_then(number).unwrap_or(0.0);
                    tlm = Matrix::translation(0.0, -state.text.leading).then(&tlm);
                    tm = tlm;
                    if let Some(bytes) = string_operand(operands.get(2)) {
                        self.show(bytes, &state, &mut tm);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => self.show(bytes, &state, &mut tm),
                                other => {
                                    if let Some(adjust) = number(other) {
                                        let tx = -adjust / 1000.0
                                            * state.text.font_size
                                            * state.text.horizontal_scale;
                                        tm = Matrix::translation(tx, 0.0).then(&tm);
                                    }
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                        self.draw_form(name, resources, &state, depth);
                    }
                }
                _ => {}
            }
        }
    }

    fn show(&mut self, bytes: &[u8], state: &GraphicsState, tm: &mut Matrix) {
        let text = &state.text;
        let font = text.font.clone().unwrap_or_else(|| self.default_font.clone());
        let size = text.font_size;
        let th = text.horizontal_scale;

        for ch in font.decode(bytes) {
            let trm = Matrix::new(size * th, 0.0, 0.0, size, 0.0, text.rise)
                .then(tm)
                .then(&state.ctm);

            let w = ch.width;
            let quad = Quad {
                ul: trm.transform_point(0.0, font.ascent),
                ur: trm.transform_point(w, font.ascent),
                ll: trm.transform_point(0.0, font.descent),
                lr: trm.transform_point(w, font.descent),
            };
            let along = trm.transform_vector(1.0, 0.0);
            let up = trm.transform_vector(0.0, 1.0);
            let along_len = (along.x * along.x + along.y * along.y).sqrt();
            let direction = if along_len > f64::EPSILON {
                Point::new(along.x / along_len, along.y / along_len)
            } else {
                Point::new(1.0, 0.0)
            };

            self.glyphs.push(Glyph {
                text: ch.text,
                quad,
                origin: trm.transform_point(0.0, 0.0),
                end: trm.transform_point(w, 0.0),
                direction,
                size: (up.x * up.x + up.y * up.y).sqrt(),
            });

            let spacing = if ch.is_word_space {
                text.char_spacing + text.word_spacing
            } else {
                text.char_spacing
            };
            let tx = (w * size + spacing) * th;
            *tm = Matrix::translation(tx, 0.0).then(tm);
        }
    }

    fn draw_form(
        &mut self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        state: &GraphicsState,
        depth: usize,
    ) {
        if depth >= MAX_FORM_DEPTH {
            tracing::warn!("Form XObject nesting deeper than {}, skipping", MAX_FORM_DEPTH);
            return;
        }
        let doc = self.doc;
        let Some(stream) = resources
            .and_then(|r| objects::get_dict(doc, r, b"XObject"))
            .and_then(|xobjects| objects::get_stream(doc, xobjects, name))
        else {
            return;
        };
        if objects::get_name(doc, &stream.dict, b"Subtype") != Some(&b"Form"[..]) {
            return;
        }

        let operations = match objects::stream_content(stream)
            .and_then(|data| Content::decode(&data))
        {
            Ok(content) => content.operations,
            Err(e) => {
                tracing::warn!(
                    "Skipping unreadable Form XObject /{}: {}",
                    String::from_utf8_lossy(name),
                    e
                );
                return;
            }
        };

        let matrix = objects::get_array(doc, &stream.dict, b"Matrix")
            .and_then(|m| matrix_operand(m))
            .unwrap_or(Matrix::IDENTITY);
        let form_resources = objects::get_dict(doc, &stream.dict, b"Resources").or(resources);

        let mut inner = state.clone();
        inner.ctm = matrix.then(&state.ctm);
        self.run(&operations, form_resources, inner, depth + 1);
    }
}

fn first_number(operands: &[Object]) -> f64 {
    operands.first().and_then(number).unwrap_or(0.0)
}

fn pair_operand(operands: &[Object]) -> (f64, f64) {
    (
        operands.first().and_then(number).unwrap_or(0.0),
        operands.get(1).and_then(number).unwrap_or(0.0),
    )
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let v: Option<Vec<f64>> = operands[..6].iter().map(number).collect();
    v.map(|v| Matrix::new(v[0], v[1], v[2], v[3], v[4], v[5]))
}

fn string_operand(obj: Option<&Object>) -> Option<&[u8]> {
    match obj {
        Some(Object::String(bytes, _)) => Some(bytes.as_slice()),
        _ => None,
    }
}
