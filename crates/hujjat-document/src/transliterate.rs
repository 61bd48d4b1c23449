// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Whole-document transliteration.
//
// Text is rewritten one paragraph at a time, table cells included, so
// structural boundaries never leak into the rules. PDFs go through a Word
// intermediate and, when PDF output is wanted, back again.

use std::path::PathBuf;

use hujjat_core::error::Result;
use hujjat_core::{ConversionStage, DocumentKind, TransliterationDirection};
use tracing::{debug, info, instrument};

use crate::convert::ConverterSet;
use crate::pdf::PdfDocument;
use crate::scratch::Scratch;
use crate::source::SourceDocument;
use crate::translit::transliterate;
use crate::word::WordDocument;

pub struct DocumentTransliterator {
    converters: ConverterSet,
    scratch_root: Option<PathBuf>,
}

impl DocumentTransliterator {
    pub fn new(converters: ConverterSet, scratch_root: Option<PathBuf>) -> Self {
        Self {
            converters,
            scratch_root,
        }
    }

    /// Transliterate `doc`, producing a document of kind `output`
    /// (`Pdf` or `Word`).
    #[instrument(skip_all, fields(kind = ?doc.kind(), direction = ?direction, output = ?output))]
    pub async fn transliterate(
        &self,
        doc: &SourceDocument,
        direction: TransliterationDirection,
        output: DocumentKind,
    ) -> Result<SourceDocument> {
        let scratch = Scratch::new_in(self.scratch_root.as_deref())?;

        let mut word = match doc {
            SourceDocument::Word(word) => word.clone(),
            SourceDocument::Pdf(pdf) => {
                let bytes = pdf
                    .to_bytes()
                    .map_err(|e| e.at_stage(ConversionStage::PdfToWord))?;
                let converted = self
                    .converters
                    .pdf_to_word
                    .pdf_to_word(&bytes)
                    .await
                    .map_err(|e| e.at_stage(ConversionStage::PdfToWord))?;
                let intermediate = scratch.store("intermediate", DocumentKind::Word, &converted)?;
                WordDocument::from_bytes(&intermediate.read()?)
                    .map_err(|e| e.at_stage(ConversionStage::PdfToWord))?
            }
        };

        let rewritten = rewrite_paragraphs(&mut word, direction);
        info!(paragraphs = rewritten, "Paragraphs transliterated");

        if output != DocumentKind::Pdf {
            return Ok(SourceDocument::Word(word));
        }

        let bytes = word
            .to_bytes()
            .map_err(|e| e.at_stage(ConversionStage::Encode))?;
        let staged = scratch.store("transliterated", DocumentKind::Word, &bytes)?;
        let pdf = self
            .converters
            .word_to_pdf
            .word_to_pdf(&staged.read()?, DocumentKind::Word)
            .await
            .map_err(|e| e.at_stage(ConversionStage::ConvertBack))?;
        let pdf = PdfDocument::from_bytes(&pdf).map_err(|e| e.at_stage(ConversionStage::ConvertBack))?;

        debug!(pages = pdf.page_count(), "Transliterated document rendered to PDF");
        Ok(SourceDocument::Pdf(pdf))
    }
}

/// Rewrite every paragraph in place. Returns how many were visited.
pub fn rewrite_paragraphs(word: &mut WordDocument, direction: TransliterationDirection) -> usize {
    let mut visited = 0;
    word.for_each_paragraph_mut(|paragraph| {
        paragraph.text = transliterate(&paragraph.text, direction);
        visited += 1;
    });
    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{
        BuiltinPdfRenderer, PdfToWordConverter, TextLayerConverter, WordToPdfConverter,
    };
    use crate::word::{Block, Table};
    use async_trait::async_trait;
    use hujjat_core::error::HujjatError;
    use hujjat_core::PaperSize;
    use std::sync::Arc;
    use TransliterationDirection::{ToCyrillic, ToLatin};

    struct Unavailable;

    #[async_trait]
    impl WordToPdfConverter for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        async fn word_to_pdf(&self, _word: &[u8], _kind: DocumentKind) -> Result<Vec<u8>> {
            Err(HujjatError::ServiceUnavailable("job timed out".into()))
        }
    }

    struct BrokenPdfToWord;

    #[async_trait]
    impl PdfToWordConverter for BrokenPdfToWord {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn pdf_to_word(&self, _pdf: &[u8]) -> Result<Vec<u8>> {
            Err(HujjatError::Converter("soffice exited with 1".into()))
        }
    }

    fn local() -> ConverterSet {
        ConverterSet::new(
            Arc::new(TextLayerConverter) as Arc<dyn PdfToWordConverter>,
            Arc::new(BuiltinPdfRenderer::new(PaperSize::A4)),
        )
    }

    fn with_table() -> WordDocument {
        let mut word = WordDocument::from_paragraphs(["Салом дунё".to_string()]);
        let table = Table::from_text_rows([
            vec!["Шаҳар".to_string(), "Тошкент".to_string()],
            vec!["Йил".to_string(), "2024".to_string()],
        ]);
        word.body.insert(1, Block::Table(table));
        word
    }

    #[tokio::test]
    async fn table_structure_is_preserved() {
        let original = with_table();
        let transliterator = DocumentTransliterator::new(local(), None);
        let out = transliterator
            .transliterate(&SourceDocument::Word(original.clone()), ToLatin, DocumentKind::Word)
            .await
            .unwrap();

        let SourceDocument::Word(word) = out else {
            panic!("expected Word output");
        };
        assert_eq!(word.table_count(), original.table_count());
        assert_eq!(word.paragraph_count(), original.paragraph_count());
        let Some(Block::Table(table)) = word.body.get(1) else {
            panic!("table moved");
        };
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|row| row.cells.len() == 2));
        assert_eq!(
            word.plain_paragraphs(),
            vec!["Salom dunyo", "Shahar", "Toshkent", "Yil", "2024"]
        );
    }

    #[test]
    fn rewrite_visits_nested_cells() {
        let mut word = with_table();
        let inner = Table::from_text_rows([vec!["ichki".to_string()]]);
        if let Some(Block::Table(table)) = word.body.get_mut(1) {
            table.rows[0].cells[0].blocks.push(Block::Table(inner));
        }
        assert_eq!(rewrite_paragraphs(&mut word, ToCyrillic), 6);
        assert!(word.plain_paragraphs().contains(&"ички".to_string()));
    }

    #[tokio::test]
    async fn pdf_source_can_come_back_as_pdf() {
        let pdf_bytes = crate::pdf::PdfRenderer::new(PaperSize::A4)
            .render_paragraphs(&["Salom".to_string()])
            .unwrap();
        let pdf = SourceDocument::decode(&pdf_bytes, DocumentKind::Pdf).unwrap();

        let root = tempfile::tempdir().unwrap();
        let transliterator =
            DocumentTransliterator::new(local(), Some(root.path().to_path_buf()));
        let out = transliterator
            .transliterate(&pdf, ToCyrillic, DocumentKind::Pdf)
            .await
            .unwrap();
        assert_eq!(out.kind(), DocumentKind::Pdf);
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn remote_failure_surfaces_with_stage() {
        let converters = ConverterSet::new(Arc::new(TextLayerConverter), Arc::new(Unavailable));
        let transliterator = DocumentTransliterator::new(converters, None);
        let err = transliterator
            .transliterate(&SourceDocument::Word(with_table()), ToLatin, DocumentKind::Pdf)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(ConversionStage::ConvertBack));
        assert!(matches!(err.root_cause(), HujjatError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn pdf_to_word_failure_names_its_stage_and_cleans_up() {
        let pdf_bytes = crate::pdf::PdfRenderer::new(PaperSize::A4)
            .render_paragraphs(&["Salom".to_string()])
            .unwrap();
        let pdf = SourceDocument::decode(&pdf_bytes, DocumentKind::Pdf).unwrap();

        let root = tempfile::tempdir().unwrap();
        let converters = ConverterSet::new(
            Arc::new(BrokenPdfToWord),
            Arc::new(BuiltinPdfRenderer::new(PaperSize::A4)) as Arc<dyn WordToPdfConverter>,
        );
        let transliterator = DocumentTransliterator::new(converters, Some(root.path().to_path_buf()));
        let err = transliterator
            .transliterate(&pdf, ToCyrillic, DocumentKind::Pdf)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(ConversionStage::PdfToWord));
        assert!(matches!(err.root_cause(), HujjatError::Converter(_)));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
