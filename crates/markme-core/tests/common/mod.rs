//! PDF fixtures for integration tests
//!
//! Every fixture is generated with lopdf so tests never depend on files
//! checked into the repo.

#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};

/// Builds a document page by page; every page gets Helvetica as `/F1`
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        Self {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
        }
    }

    /// Page with one `Tj` per line, 20 units apart, starting at (72, 700)
    pub fn text_page(self, lines: &[&str]) -> Self {
        let mut content = String::new();
        for (i, line) in lines.iter().enumerate() {
            content.push_str(&format!(
                "BT /F1 12 Tf 72 {} Td ({}) Tj ET\n",
                700 - 20 * i as i64,
                escape(line)
            ));
        }
        self.content_page(&content)
    }

    /// Page with a raw content stream
    pub fn content_page(self, content: &str) -> Self {
        self.page_with(content, Dictionary::new(), None)
    }

    /// Page with a raw content stream, extra resources and optional `/Annots`
    pub fn page_with(mut self, content: &str, extra_resources: Dictionary, annots: Option<Object>) -> Self {
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.as_bytes().to_vec()));
        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => self.font_id },
        };
        for (key, value) in extra_resources.iter() {
            resources.set(key.clone(), value.clone());
        }
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        };
        if let Some(annots) = annots {
            page.set("Annots", annots);
        }
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id);
        self
    }

    /// Direct access for fixtures that need extra objects
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn build(mut self) -> Vec<u8> {
        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer).unwrap();
        buffer
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

/// One page whose text is drawn with a Type0 font through a ToUnicode CMap.
///
/// The glyph codes `0001 0002 0003 0003 0004` spell "Hello".
pub fn composite_font_pdf() -> Vec<u8> {
    let mut builder = PdfBuilder::new();
    let doc = builder.doc_mut();
    let cmap = b"/CIDInit /ProcSet findresource begin\n\
        12 dict begin\nbegincmap\n\
        1 begincodespacerange <0000> <FFFF> endcodespacerange\n\
        2 beginbfchar <0001> <0048> <0002> <0065> endbfchar\n\
        1 beginbfrange <0003> <0004> [<006C> <006F>] endbfrange\n\
        endcmap\nend\nend"
        .to_vec();
    let cmap_id = doc.add_object(Stream::new(Dictionary::new(), cmap));
    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "ABCDEF+Custom",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "DW" => 600,
    });
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "ABCDEF+Custom",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
        "ToUnicode" => cmap_id,
    });
    builder
        .page_with(
            "BT /F2 12 Tf 72 700 Td <00010002000300030004> Tj ET",
            dictionary! { "Font" => dictionary! { "F2" => font_id } },
            None,
        )
        .build()
}

/// One page whose text sits inside a Form XObject
pub fn form_xobject_pdf(text: &str) -> Vec<u8> {
    let mut builder = PdfBuilder::new();
    let font_id = builder.doc_mut().add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let form_id = builder.doc_mut().add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 300.into(), 100.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        },
        format!("BT /F1 12 Tf 0 20 Td ({}) Tj ET", escape(text)).into_bytes(),
    ));
    builder
        .page_with(
            "q 1 0 0 1 72 600 cm /Fm1 Do Q",
            dictionary! { "XObject" => dictionary! { "Fm1" => form_id } },
            None,
        )
        .build()
}

/// One page carrying a pre-existing text annotation
pub fn annotated_pdf(lines: &[&str]) -> Vec<u8> {
    let mut builder = PdfBuilder::new();
    let note_id = builder.doc_mut().add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => vec![10.into(), 10.into(), 30.into(), 30.into()],
        "Contents" => Object::string_literal("existing note"),
    });
    let mut content = String::new();
    for (i, line) in lines.iter().enumerate() {
        content.push_str(&format!(
            "BT /F1 12 Tf 72 {} Td ({}) Tj ET\n",
            700 - 20 * i as i64,
            escape(line)
        ));
    }
    builder
        .page_with(&content, Dictionary::new(), Some(vec![Object::Reference(note_id)].into()))
        .build()
}

pub fn write_pdf(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Annotation dictionaries of every page, as `(page number, annotation)`
pub fn annotations(path: &Path) -> Vec<(u32, Dictionary)> {
    let doc = Document::load(path).unwrap();
    let mut found = Vec::new();
    for (number, page_id) in doc.get_pages() {
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let annots = match page.get(b"Annots") {
            Ok(Object::Array(arr)) => arr.clone(),
            Ok(Object::Reference(id)) => doc.get_object(*id).unwrap().as_array().unwrap().clone(),
            _ => continue,
        };
        for annot in annots {
            let dict = match annot {
                Object::Reference(id) => doc.get_object(id).unwrap().as_dict().unwrap().clone(),
                Object::Dictionary(d) => d,
                _ => continue,
            };
            found.push((number, dict));
        }
    }
    found
}

/// Only the highlight annotations
pub fn highlights(path: &Path) -> Vec<(u32, Dictionary)> {
    annotations(path)
        .into_iter()
        .filter(|(_, a)| a.get(b"Subtype").and_then(Object::as_name).ok() == Some(&b"Highlight"[..]))
        .collect()
}

/// `/C` of an annotation as plain floats
pub fn color_of(annot: &Dictionary) -> Vec<f32> {
    annot
        .get(b"C")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| match v {
            Object::Real(r) => *r,
            Object::Integer(i) => *i as f32,
            other => panic!("unexpected color component {:?}", other),
        })
        .collect()
}
