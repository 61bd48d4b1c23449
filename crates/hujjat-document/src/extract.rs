// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page extraction.
//
// PDFs are filtered directly. Word text has no addressable pages, so a Word
// source is rendered to a PDF intermediate, filtered, and converted back:
//
//   docx --word_to_pdf--> rendered.pdf --select--> filtered.pdf --pdf_to_word--> docx
//
// Both intermediates live in one scratch directory owned by the call and are
// released on every exit path.

use std::path::PathBuf;

use hujjat_core::error::{HujjatError, Result};
use hujjat_core::{ConversionStage, DocumentKind};
use tracing::{debug, info, instrument};

use crate::convert::ConverterSet;
use crate::page_range::PageSet;
use crate::pdf::PdfDocument;
use crate::scratch::Scratch;
use crate::source::SourceDocument;
use crate::word::WordDocument;

pub struct PageExtractor {
    converters: ConverterSet,
    scratch_root: Option<PathBuf>,
}

impl PageExtractor {
    pub fn new(converters: ConverterSet, scratch_root: Option<PathBuf>) -> Self {
        Self {
            converters,
            scratch_root,
        }
    }

    /// A new document holding only the requested pages that exist in `doc`,
    /// ascending. Fails with `NoValidPages` when none of them exist.
    #[instrument(skip_all, fields(kind = ?doc.kind(), requested = pages.len()))]
    pub async fn extract(&self, doc: &SourceDocument, pages: &PageSet) -> Result<SourceDocument> {
        match doc {
            SourceDocument::Pdf(pdf) => filter_pdf(pdf, pages).map(SourceDocument::Pdf),
            SourceDocument::Word(word) => self.extract_word(word, pages).await,
        }
    }

    async fn extract_word(&self, word: &WordDocument, pages: &PageSet) -> Result<SourceDocument> {
        let scratch = Scratch::new_in(self.scratch_root.as_deref())?;

        let source = word
            .to_bytes()
            .map_err(|e| e.at_stage(ConversionStage::RenderToPdf))?;
        let rendered = self
            .converters
            .word_to_pdf
            .word_to_pdf(&source, DocumentKind::Word)
            .await
            .map_err(|e| e.at_stage(ConversionStage::RenderToPdf))?;
        let rendered = scratch.store("rendered", DocumentKind::Pdf, &rendered)?;
        debug!(path = %rendered.path().display(), "Word rendered to PDF");

        let filtered = {
            let pdf = PdfDocument::from_bytes(&rendered.read()?)
                .map_err(|e| e.at_stage(ConversionStage::Filter))?;
            let bytes = filter_pdf(&pdf, pages)?
                .to_bytes()
                .map_err(|e| e.at_stage(ConversionStage::Filter))?;
            scratch.store("filtered", DocumentKind::Pdf, &bytes)?
        };
        rendered.release()?;

        let converted = self
            .converters
            .pdf_to_word
            .pdf_to_word(&filtered.read()?)
            .await
            .map_err(|e| e.at_stage(ConversionStage::ConvertBack))?;
        let result = WordDocument::from_bytes(&converted)
            .map_err(|e| e.at_stage(ConversionStage::ConvertBack))?;

        info!(paragraphs = result.paragraph_count(), "Word pages extracted");
        Ok(SourceDocument::Word(result))
    }
}

/// Keep the pages of `pages` that exist in `pdf`.
fn filter_pdf(pdf: &PdfDocument, pages: &PageSet) -> Result<PdfDocument> {
    let total_pages = pdf.page_count();
    let wanted = pages.within(total_pages);
    if wanted.is_empty() {
        info!(total_pages, requested = %pages, "No requested page exists");
        return Err(HujjatError::NoValidPages { total_pages });
    }

    debug!(total_pages, kept = wanted.len(), "Filtering PDF pages");
    pdf.select_pages(&wanted)
        .map_err(|e| e.at_stage(ConversionStage::Filter))
}
