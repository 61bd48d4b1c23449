// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF codec. Decode, inspect, select pages from, and re-encode existing PDF
// documents using the `lopdf` crate.

use std::collections::HashMap;

use hujjat_core::error::{HujjatError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use tracing::{debug, info, instrument, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// A decoded PDF document.
///
/// Wraps `lopdf::Document` and provides the operations the pipeline needs:
/// page counting, page selection into a new document, and text extraction.
#[derive(Clone)]
pub struct PdfDocument {
    document: Document,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("version", &self.document.version)
            .field("pages", &self.page_count())
            .finish()
    }
}

impl PdfDocument {
    // -- Construction ---------------------------------------------------------

    /// Decode a PDF from raw bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| HujjatError::Pdf(format!("failed to load PDF from memory: {err}")))?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Text lines of every page, in page order. Blank lines are dropped.
    ///
    /// Pages whose text cannot be decoded (unsupported font encodings, image
    /// only scans) contribute nothing rather than failing the whole document.
    #[instrument(skip(self))]
    pub fn extract_text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        for page_number in self.document.get_pages().keys() {
            match self.document.extract_text(&[*page_number]) {
                Ok(text) => lines.extend(
                    text.lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_owned),
                ),
                Err(err) => warn!(page_number, %err, "No extractable text on page"),
            }
        }

        debug!(lines = lines.len(), "Text extracted");
        lines
    }

    // -- Selection ------------------------------------------------------------

    /// Build a new document holding only `pages` (1-indexed), in the given
    /// order. Every page number must exist in this document.
    #[instrument(skip(self), fields(source_pages = self.page_count()))]
    pub fn select_pages(&self, pages: &[u32]) -> Result<PdfDocument> {
        let page_ids = self.document.get_pages();
        let mut target = Document::with_version(self.document.version.clone());
        let pages_id = target.new_object_id();

        // Reserve target ids for every selected page up front so that links
        // between selected pages resolve to the copies.
        let mut copied: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut kids = Vec::with_capacity(pages.len());
        for page_number in pages {
            let source_id = *page_ids.get(page_number).ok_or_else(|| {
                HujjatError::Pdf(format!(
                    "page {page_number} not found (document has {} pages)",
                    page_ids.len()
                ))
            })?;
            let target_id = target.new_object_id();
            copied.insert(source_id, target_id);
            kids.push((source_id, target_id));
        }

        for (source_id, target_id) in &kids {
            let page = flatten_inherited(&self.document, *source_id)?;
            let mut cloner = Cloner {
                source: &self.document,
                target: &mut target,
                copied: &mut copied,
            };
            let Object::Dictionary(mut page) = cloner.deep_clone(&Object::Dictionary(page))? else {
                return Err(HujjatError::Pdf("page object is not a dictionary".into()));
            };
            page.set("Parent", Object::Reference(pages_id));
            target.objects.insert(*target_id, Object::Dictionary(page));
        }

        let kid_refs: Vec<Object> = kids.iter().map(|(_, id)| Object::Reference(*id)).collect();
        let count = kid_refs.len() as i64;
        target.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kid_refs,
                "Count" => count,
            }),
        );
        let catalog_id = target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        target.trailer.set("Root", catalog_id);

        info!(selected = pages.len(), objects = target.objects.len(), "Pages selected");
        Ok(PdfDocument { document: target })
    }

    // -- Encoding -------------------------------------------------------------

    /// Serialise the document to bytes.
    #[instrument(skip(self))]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut document = self.document.clone();
        let mut output = Vec::new();
        document
            .save_to(&mut output)
            .map_err(|err| HujjatError::Pdf(format!("failed to serialise PDF: {err}")))?;

        debug!(output_bytes = output.len(), "PDF encoded");
        Ok(output)
    }
}

/// Copy of a page dictionary with inheritable attributes pulled down from
/// its ancestors, so the page stays intact once detached from its tree.
fn flatten_inherited(source: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = source
        .get_dictionary(page_id)
        .map_err(|err| HujjatError::Pdf(format!("cannot read page object {page_id:?}: {err}")))?
        .clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(parent_id) = parent {
        // Guard against malformed trees with a Parent cycle.
        depth += 1;
        if depth > 64 {
            warn!(?page_id, "Page tree too deep, stopping attribute inheritance");
            break;
        }
        let Ok(node) = source.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_ATTRIBUTES {
            if !page.has(key)
                && let Ok(value) = node.get(key)
            {
                page.set(key.to_vec(), value.clone());
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}

/// Deep-copies objects from one document into another.
///
/// Each source object is copied at most once; repeated and cyclic references
/// map onto the same target id. `/Parent` entries are skipped (the caller
/// patches the page's own) and references to pages that were not selected
/// become `null`.
struct Cloner<'a> {
    source: &'a Document,
    target: &'a mut Document,
    copied: &'a mut HashMap<ObjectId, ObjectId>,
}

impl Cloner<'_> {
    fn deep_clone(&mut self, object: &Object) -> Result<Object> {
        match object {
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.clone_dictionary(dict)?)),
            Object::Array(items) => {
                let mut cloned = Vec::with_capacity(items.len());
                for item in items {
                    cloned.push(self.deep_clone(item)?);
                }
                Ok(Object::Array(cloned))
            }
            Object::Stream(stream) => {
                let mut cloned = stream.clone();
                cloned.dict = self.clone_dictionary(&stream.dict)?;
                Ok(Object::Stream(cloned))
            }
            Object::Reference(id) => self.clone_reference(*id),
            other => Ok(other.clone()),
        }
    }

    fn clone_dictionary(&mut self, dict: &Dictionary) -> Result<Dictionary> {
        let mut cloned = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            cloned.set(key.clone(), self.deep_clone(value)?);
        }
        Ok(cloned)
    }

    fn clone_reference(&mut self, id: ObjectId) -> Result<Object> {
        if let Some(existing) = self.copied.get(&id) {
            return Ok(Object::Reference(*existing));
        }

        let referenced = match self.source.get_object(id) {
            Ok(object) => object,
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using Null");
                return Ok(Object::Null);
            }
        };
        if is_page(referenced) {
            return Ok(Object::Null);
        }

        let new_id = self.target.new_object_id();
        self.copied.insert(id, new_id);
        let cloned = self.deep_clone(referenced)?;
        self.target.objects.insert(new_id, cloned);
        Ok(Object::Reference(new_id))
    }
}

fn is_page(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"Page"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::writer::PdfRenderer;
    use hujjat_core::PaperSize;

    fn sample(pages: usize) -> PdfDocument {
        let paragraphs: Vec<String> = (1..=pages)
            .map(|n| format!("Page marker {n}\u{c}"))
            .collect();
        let bytes = PdfRenderer::new(PaperSize::A4)
            .render_paragraphs(&paragraphs)
            .unwrap();
        PdfDocument::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn garbage_is_rejected() {
        let err = PdfDocument::from_bytes(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, HujjatError::Pdf(_)));
    }

    #[test]
    fn select_keeps_only_requested_pages() {
        let doc = sample(4);
        assert_eq!(doc.page_count(), 4);

        let selected = doc.select_pages(&[2, 4]).unwrap();
        let reloaded = PdfDocument::from_bytes(&selected.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.page_count(), 2);
    }

    #[test]
    fn selected_pages_keep_their_content() {
        let doc = sample(3);
        let selected = doc.select_pages(&[3]).unwrap();
        let reloaded = PdfDocument::from_bytes(&selected.to_bytes().unwrap()).unwrap();
        let text = reloaded.extract_text_lines().join("\n");
        assert!(text.contains("marker 3"), "got: {text}");
        assert!(!text.contains("marker 1"), "got: {text}");
    }

    #[test]
    fn missing_page_is_an_error() {
        let doc = sample(2);
        assert!(doc.select_pages(&[1, 7]).is_err());
    }
}
