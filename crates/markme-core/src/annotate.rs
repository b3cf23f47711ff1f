//! Highlight annotation builder
//!
//! ```text
//! HighlightAnnotation::new(page, &region)
//!     .set_color(rgb)
//!     .commit(&mut doc)?;
//! ```

use crate::color::Rgb;
use crate::document::{PageHandle, PdfDocument};
use crate::error::DocumentError;
use crate::geometry::{Quad, Rect};
use crate::search::Region;
use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Annotation flag: print the annotation with the page
const FLAG_PRINT: i64 = 4;

#[derive(Debug, Clone)]
pub struct HighlightAnnotation {
    page: PageHandle,
    quads: Vec<Quad>,
    rect: Rect,
    color: Rgb,
    opacity: Option<f32>,
    author: Option<String>,
}

impl HighlightAnnotation {
    pub fn new(page: PageHandle, region: &Region) -> Self {
        Self {
            page,
            quads: region.quads.clone(),
            rect: region.rect,
            color: Rgb::YELLOW,
            opacity: None,
            author: None,
        }
    }

    pub fn set_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Constant opacity (`/CA`), clamped to `[0, 1]`
    pub fn set_opacity(mut self, opacity: Option<f32>) -> Self {
        self.opacity = opacity.map(|o| o.clamp(0.0, 1.0));
        self
    }

    pub fn set_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    /// Add the annotation to its page and return the new object id
    pub fn commit(self, doc: &mut PdfDocument) -> Result<ObjectId, DocumentError> {
        let page = self.page;
        let fail = |reason: String| DocumentError::Annotate {
            page: page.number,
            reason,
        };
        if self.quads.is_empty() {
            return Err(fail("highlight has no quads".to_string()));
        }

        let inner = doc.inner_mut();
        let appearance = self.appearance_stream().map_err(|e| fail(e.to_string()))?;
        let appearance_id = inner.add_object(appearance);
        let annot_id = inner.add_object(self.to_dict(appearance_id));
        add_annotation_to_page(inner, page.id, annot_id).map_err(|e| fail(e.to_string()))?;
        Ok(annot_id)
    }

    fn to_dict(&self, appearance_id: ObjectId) -> Dictionary {
        let [r, g, b] = self.color.to_pdf_components();
        let quad_points: Vec<Object> = self
            .quads
            .iter()
            .flat_map(Quad::to_quad_points)
            .map(|v| Object::Real(v as f32))
            .collect();
        let now = pdf_date();

        let mut annot = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Highlight",
            "Rect" => rect_array(&self.rect),
            "QuadPoints" => quad_points,
            "C" => vec![Object::Real(r), Object::Real(g), Object::Real(b)],
            "F" => FLAG_PRINT,
            "P" => self.page.id,
            "M" => Object::String(now.clone().into_bytes(), StringFormat::Literal),
            "CreationDate" => Object::String(now.into_bytes(), StringFormat::Literal),
            "AP" => dictionary! { "N" => appearance_id },
        };
        if let Some(opacity) = self.opacity {
            annot.set("CA", Object::Real(opacity));
        }
        if let Some(author) = &self.author {
            annot.set("T", Object::string_literal(author.as_str()));
        }
        annot
    }

    /// Normal appearance: the quads filled with multiply blending
    fn appearance_stream(&self) -> Result<Stream, lopdf::Error> {
        let [r, g, b] = self.color.to_pdf_components();
        let mut operations = vec![
            Operation::new("gs", vec![Object::Name(b"GS0".to_vec())]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
        ];
        for quad in &self.quads {
            let path = [quad.ll, quad.lr, quad.ur, quad.ul];
            for (i, point) in path.iter().enumerate() {
                let op = if i == 0 { "m" } else { "l" };
                operations.push(Operation::new(
                    op,
                    vec![Object::Real(point.x as f32), Object::Real(point.y as f32)],
                ));
            }
            operations.push(Operation::new("h", vec![]));
        }
        operations.push(Operation::new("f", vec![]));

        let content = Content { operations }.encode()?;
        let opacity = Object::Real(self.opacity.unwrap_or(1.0));
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => rect_array(&self.rect),
            "Resources" => dictionary! {
                "ExtGState" => dictionary! {
                    "GS0" => dictionary! {
                        "Type" => "ExtGState",
                        "BM" => "Multiply",
                        "CA" => opacity.clone(),
                        "ca" => opacity,
                    },
                },
            },
        };
        Ok(Stream::new(dict, content))
    }
}

fn rect_array(rect: &Rect) -> Vec<Object> {
    [rect.x0, rect.y0, rect.x1, rect.y1]
        .iter()
        .map(|v| Object::Real(*v as f32))
        .collect()
}

/// Current time as a PDF date string
fn pdf_date() -> String {
    Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
}

/// Append `annot_id` to the page's `/Annots`, creating the array if needed
fn add_annotation_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), lopdf::Error> {
    let referenced = match doc.get_object(page_id)?.as_dict()?.get(b"Annots") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };
    if let Some(array_id) = referenced {
        if let Ok(Object::Array(arr)) = doc.get_object_mut(array_id) {
            arr.push(Object::Reference(annot_id));
            return Ok(());
        }
    }

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    if let Ok(Object::Array(arr)) = page_dict.get_mut(b"Annots") {
        arr.push(Object::Reference(annot_id));
    } else {
        page_dict.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
    }
    Ok(())
}
