//! Owned handle over a parsed PDF
//!
//! Opening parses the whole file into memory; the input file is never
//! written. Saving always produces a full rewrite at the target path,
//! serialized into a temporary file beside it and renamed into place.

use crate::error::DocumentError;
use crate::layout::page_glyphs;
use crate::objects;
use crate::search::{Region, TextLayer};
use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A page of an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageHandle {
    /// 1-based page number
    pub number: u32,
    #[serde(skip)]
    pub id: ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Prune unreferenced objects, drop empty streams, renumber and deflate
    pub optimize: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { optimize: true }
    }
}

#[derive(Debug)]
pub struct PdfDocument {
    doc: Document,
    path: PathBuf,
}

impl PdfDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let doc = Document::load(path).map_err(|e| DocumentError::open(path, e))?;
        Self::checked(doc, path.to_path_buf())
    }

    /// Parse a document held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let path = PathBuf::from("<memory>");
        let doc = Document::load_mem(bytes).map_err(|e| DocumentError::open(&path, e))?;
        Self::checked(doc, path)
    }

    fn checked(doc: Document, path: PathBuf) -> Result<Self, DocumentError> {
        if doc.is_encrypted() {
            return Err(DocumentError::open(path, "document is encrypted"));
        }
        debug!(path = %path.display(), pages = doc.get_pages().len(), "Opened PDF");
        Ok(Self { doc, path })
    }

    /// Path the document was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// All pages in document order
    pub fn pages(&self) -> Vec<PageHandle> {
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| PageHandle { number, id })
            .collect()
    }

    /// Extract the searchable text of a page
    pub fn text_layer(&self, page: PageHandle) -> Result<TextLayer, DocumentError> {
        page_glyphs(&self.doc, page.id)
            .map(TextLayer::new)
            .map_err(|e| DocumentError::Page {
                page: page.number,
                reason: e.to_string(),
            })
    }

    /// Every occurrence of `term` on `page`
    pub fn search_text(&self, page: PageHandle, term: &str) -> Result<Vec<Region>, DocumentError> {
        Ok(self.text_layer(page)?.search(term))
    }

    /// Number of entries in the page's `/Annots` array
    pub fn annotation_count(&self, page: PageHandle) -> usize {
        self.doc
            .get_object(page.id)
            .and_then(Object::as_dict)
            .ok()
            .and_then(|dict| objects::get_array(&self.doc, dict, b"Annots"))
            .map_or(0, Vec::len)
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Document {
        &self.doc
    }

    pub(crate) fn inner_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Write the whole document to `path`
    ///
    /// `path` is only replaced once the new file is completely written; on
    /// error it keeps its previous content and no temporary file remains.
    /// An optimizing save renumbers objects, so page handles taken before
    /// it no longer apply.
    pub fn save(&mut self, path: impl AsRef<Path>, options: &SaveOptions) -> Result<(), DocumentError> {
        let path = path.as_ref();
        if options.optimize {
            self.optimize();
        }

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| DocumentError::write(path, e))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(".markme-")
            .suffix(".pdf.tmp")
            .tempfile_in(&dir)
            .map_err(|e| DocumentError::write(path, e))?;
        temp.write_all(&buffer)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| DocumentError::write(path, e))?;
        temp.persist(path)
            .map_err(|e| DocumentError::write(path, e.error))?;

        debug!(path = %path.display(), bytes = buffer.len(), "Saved PDF");
        Ok(())
    }

    fn optimize(&mut self) {
        let pruned = self.doc.prune_objects();
        let emptied = self.doc.delete_zero_length_streams();
        self.doc.renumber_objects();
        self.doc.compress();
        debug!(pruned = pruned.len(), emptied = emptied.len(), "Optimized PDF structure");
    }

    /// Release the document
    pub fn close(self) {}
}

impl Drop for PdfDocument {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "Closed PDF");
    }
}
