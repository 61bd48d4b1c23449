// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process converters. Both are CPU-bound and run on the blocking pool.

use async_trait::async_trait;
use hujjat_core::error::{HujjatError, Result};
use hujjat_core::{DocumentKind, PaperSize};
use tracing::{debug, instrument};

use super::{PdfToWordConverter, WordToPdfConverter};
use crate::pdf::{PdfDocument, PdfRenderer};
use crate::word::WordDocument;

/// PDF → Word by reading the text layer: one paragraph per non-empty line.
///
/// Layout, images, and scanned pages are lost.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayerConverter;

#[async_trait]
impl PdfToWordConverter for TextLayerConverter {
    fn name(&self) -> &'static str {
        "text-layer"
    }

    #[instrument(skip_all, fields(bytes_len = pdf.len()))]
    async fn pdf_to_word(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        let pdf = pdf.to_vec();
        run_blocking(move || {
            let lines = PdfDocument::from_bytes(&pdf)?.extract_text_lines();
            debug!(paragraphs = lines.len(), "Text layer read");
            WordDocument::from_paragraphs(lines).to_bytes()
        })
        .await
    }
}

/// Word → PDF by flowing the document's paragraphs (table cells included)
/// onto pages with the built-in font.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinPdfRenderer {
    paper_size: PaperSize,
}

impl BuiltinPdfRenderer {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }
}

#[async_trait]
impl WordToPdfConverter for BuiltinPdfRenderer {
    fn name(&self) -> &'static str {
        "builtin-renderer"
    }

    #[instrument(skip_all, fields(bytes_len = word.len(), kind = ?kind))]
    async fn word_to_pdf(&self, word: &[u8], kind: DocumentKind) -> Result<Vec<u8>> {
        if kind != DocumentKind::Word {
            return Err(HujjatError::UnsupportedDocument(
                "the built-in renderer only reads .docx files".into(),
            ));
        }
        let word = word.to_vec();
        let paper_size = self.paper_size;
        run_blocking(move || {
            let paragraphs = WordDocument::from_bytes(&word)?.plain_paragraphs();
            PdfRenderer::new(paper_size).render_paragraphs(&paragraphs)
        })
        .await
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| HujjatError::Converter(format!("conversion task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn word_renders_to_pdf_and_back() {
        let docx = WordDocument::from_paragraphs([
            "Hello from page one\u{c}".to_string(),
            "And page two".to_string(),
        ])
        .to_bytes()
        .unwrap();

        let pdf = BuiltinPdfRenderer::new(PaperSize::A4)
            .word_to_pdf(&docx, DocumentKind::Word)
            .await
            .unwrap();
        assert_eq!(PdfDocument::from_bytes(&pdf).unwrap().page_count(), 2);

        let back = TextLayerConverter.pdf_to_word(&pdf).await.unwrap();
        let text = WordDocument::from_bytes(&back).unwrap().plain_paragraphs().join(" ");
        assert!(text.contains("page two"), "got: {text}");
    }

    #[tokio::test]
    async fn renderer_refuses_legacy_doc() {
        let err = BuiltinPdfRenderer::new(PaperSize::A4)
            .word_to_pdf(b"\xD0\xCF\x11\xE0", DocumentKind::LegacyWord)
            .await
            .unwrap_err();
        assert!(matches!(err, HujjatError::UnsupportedDocument(_)));
    }

    #[tokio::test]
    async fn text_layer_rejects_non_pdf() {
        let err = TextLayerConverter.pdf_to_word(b"nope").await.unwrap_err();
        assert!(matches!(err, HujjatError::Pdf(_)));
    }
}
