// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Byte-level entry points for each user-facing operation.
//
// Every run is one span tagged with a fresh `OperationId`. Results are fully
// encoded before they are returned, so a caller never sees partial output.

use std::path::PathBuf;

use hujjat_core::error::{HujjatError, Result};
use hujjat_core::{
    ConversionStage, DocumentKind, Operation, OperationId, TransliterationDirection,
    output_file_name,
};
use tracing::{Instrument, info, info_span};

use crate::convert::ConverterSet;
use crate::extract::PageExtractor;
use crate::page_range::PageSet;
use crate::source::SourceDocument;
use crate::transliterate::DocumentTransliterator;

/// A finished document ready to hand to the transport.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub kind: DocumentKind,
}

pub struct Pipeline {
    converters: ConverterSet,
    extractor: PageExtractor,
    transliterator: DocumentTransliterator,
}

impl Pipeline {
    pub fn new(converters: ConverterSet, scratch_root: Option<PathBuf>) -> Self {
        Self {
            extractor: PageExtractor::new(converters.clone(), scratch_root.clone()),
            transliterator: DocumentTransliterator::new(converters.clone(), scratch_root),
            converters,
        }
    }

    pub async fn pdf_to_word(&self, input: &[u8], file_name: &str) -> Result<PipelineOutput> {
        let span = operation_span(Operation::PdfToWord, file_name);
        async {
            let bytes = self
                .converters
                .pdf_to_word
                .pdf_to_word(input)
                .await
                .and_then(|bytes| validated(bytes, DocumentKind::Word))
                .map_err(|e| e.at_stage(ConversionStage::PdfToWord))?;
            Ok(finish(bytes, file_name, Operation::PdfToWord, DocumentKind::Word))
        }
        .instrument(span)
        .await
    }

    /// Convert `.docx` or legacy `.doc` bytes to PDF.
    pub async fn word_to_pdf(
        &self,
        input: &[u8],
        kind: DocumentKind,
        file_name: &str,
    ) -> Result<PipelineOutput> {
        let span = operation_span(Operation::WordToPdf, file_name);
        async {
            let bytes = self
                .converters
                .word_to_pdf
                .word_to_pdf(input, kind)
                .await
                .and_then(|bytes| validated(bytes, DocumentKind::Pdf))
                .map_err(|e| e.at_stage(ConversionStage::WordToPdf))?;
            Ok(finish(bytes, file_name, Operation::WordToPdf, DocumentKind::Pdf))
        }
        .instrument(span)
        .await
    }

    /// Keep only `pages` of the document; the output has the input's kind.
    pub async fn select_pages(
        &self,
        input: &[u8],
        kind: DocumentKind,
        file_name: &str,
        pages: &PageSet,
    ) -> Result<PipelineOutput> {
        let span = operation_span(Operation::PageSelection, file_name);
        async {
            let doc = decode(input, kind)?;
            let selected = self.extractor.extract(&doc, pages).await?;
            let bytes = encode(&selected)?;
            Ok(finish(bytes, file_name, Operation::PageSelection, selected.kind()))
        }
        .instrument(span)
        .await
    }

    /// Transliterate the document; the output has the input's kind.
    pub async fn transliterate(
        &self,
        input: &[u8],
        kind: DocumentKind,
        file_name: &str,
        direction: TransliterationDirection,
    ) -> Result<PipelineOutput> {
        let operation = Operation::Transliterate(direction);
        let span = operation_span(operation, file_name);
        async {
            let doc = decode(input, kind)?;
            let rewritten = self
                .transliterator
                .transliterate(&doc, direction, doc.kind())
                .await?;
            let bytes = encode(&rewritten)?;
            Ok(finish(bytes, file_name, operation, rewritten.kind()))
        }
        .instrument(span)
        .await
    }
}

fn operation_span(operation: Operation, file_name: &str) -> tracing::Span {
    info_span!("operation", id = %OperationId::new(), %operation, file = file_name)
}

fn decode(input: &[u8], kind: DocumentKind) -> Result<SourceDocument> {
    SourceDocument::decode(input, kind).map_err(|e| e.at_stage(ConversionStage::Decode))
}

fn encode(doc: &SourceDocument) -> Result<Vec<u8>> {
    doc.encode().map_err(|e| e.at_stage(ConversionStage::Encode))
}

/// Reject converter output that does not decode as the expected kind.
fn validated(bytes: Vec<u8>, kind: DocumentKind) -> Result<Vec<u8>> {
    match SourceDocument::decode(&bytes, kind) {
        Ok(_) => Ok(bytes),
        Err(err) => Err(HujjatError::Converter(format!(
            "converter returned an unreadable {} file: {err}",
            kind.extension()
        ))),
    }
}

fn finish(bytes: Vec<u8>, input_name: &str, operation: Operation, kind: DocumentKind) -> PipelineOutput {
    let file_name = output_file_name(input_name, operation, kind);
    info!(output = %file_name, bytes = bytes.len(), "Operation complete");
    PipelineOutput {
        bytes,
        file_name,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{BuiltinPdfRenderer, TextLayerConverter};
    use crate::word::WordDocument;
    use hujjat_core::PaperSize;
    use std::sync::Arc;

    fn pipeline() -> Pipeline {
        let converters = ConverterSet::new(
            Arc::new(TextLayerConverter),
            Arc::new(BuiltinPdfRenderer::new(PaperSize::A4)),
        );
        Pipeline::new(converters, None)
    }

    fn docx(paragraphs: &[&str]) -> Vec<u8> {
        WordDocument::from_paragraphs(paragraphs.iter().map(|p| p.to_string()))
            .to_bytes()
            .unwrap()
    }

    #[tokio::test]
    async fn word_to_pdf_names_output_after_input() {
        let out = pipeline()
            .word_to_pdf(&docx(&["Hello"]), DocumentKind::Word, "xat.docx")
            .await
            .unwrap();
        assert_eq!(out.file_name, "xat.pdf");
        assert_eq!(out.kind, DocumentKind::Pdf);
        assert!(out.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn transliteration_keeps_the_input_format() {
        let out = pipeline()
            .transliterate(
                &docx(&["Салом"]),
                DocumentKind::Word,
                "xat.docx",
                TransliterationDirection::ToLatin,
            )
            .await
            .unwrap();
        assert_eq!(out.file_name, "xat_to_latin.docx");
        let word = WordDocument::from_bytes(&out.bytes).unwrap();
        assert_eq!(word.plain_paragraphs(), vec!["Salom"]);
    }

    #[tokio::test]
    async fn page_selection_reports_missing_pages_unwrapped() {
        let pdf = crate::pdf::PdfRenderer::new(PaperSize::A4)
            .render_paragraphs(&["a\u{c}".to_string(), "b\u{c}".to_string(), "c".to_string()])
            .unwrap();
        let err = pipeline()
            .select_pages(&pdf, DocumentKind::Pdf, "kitob.pdf", &PageSet::parse("5"))
            .await
            .unwrap_err();
        assert!(matches!(err, HujjatError::NoValidPages { total_pages: 3 }));

        let out = pipeline()
            .select_pages(&pdf, DocumentKind::Pdf, "kitob.pdf", &PageSet::parse("2-3"))
            .await
            .unwrap();
        assert_eq!(out.file_name, "kitob_selected_pages.pdf");
    }

    #[tokio::test]
    async fn corrupt_input_fails_at_decode() {
        let err = pipeline()
            .transliterate(
                b"%PDF-garbage",
                DocumentKind::Pdf,
                "x.pdf",
                TransliterationDirection::ToCyrillic,
            )
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(ConversionStage::Decode));
    }
}
