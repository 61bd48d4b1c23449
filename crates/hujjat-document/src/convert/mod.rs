// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format converters between PDF and Word.
//
// Converters are external collaborators: they take raw bytes of one kind and
// return raw bytes of the other. Local, subprocess, and remote backends all
// sit behind the same two traits and share one failure channel.

pub mod local;
pub mod office;

use std::sync::Arc;

use async_trait::async_trait;
use hujjat_core::error::Result;
use hujjat_core::{AppConfig, DocumentKind};
use tracing::info;

pub use local::{BuiltinPdfRenderer, TextLayerConverter};
pub use office::OfficeConverter;

#[async_trait]
pub trait PdfToWordConverter: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    async fn pdf_to_word(&self, pdf: &[u8]) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait WordToPdfConverter: Send + Sync {
    fn name(&self) -> &'static str;

    /// `kind` tells the backend whether `word` is `.docx` or legacy `.doc`.
    async fn word_to_pdf(&self, word: &[u8], kind: DocumentKind) -> Result<Vec<u8>>;
}

/// The pair of converters a pipeline runs with.
#[derive(Clone)]
pub struct ConverterSet {
    pub pdf_to_word: Arc<dyn PdfToWordConverter>,
    pub word_to_pdf: Arc<dyn WordToPdfConverter>,
}

impl ConverterSet {
    pub fn new(
        pdf_to_word: Arc<dyn PdfToWordConverter>,
        word_to_pdf: Arc<dyn WordToPdfConverter>,
    ) -> Self {
        Self {
            pdf_to_word,
            word_to_pdf,
        }
    }

    /// Pick backends from configuration.
    ///
    /// Word → PDF prefers `remote` (the cloud service, when a key is set),
    /// then LibreOffice, then the built-in renderer. PDF → Word prefers
    /// LibreOffice, then the text-layer converter.
    pub fn from_config(config: &AppConfig, remote: Option<Arc<dyn WordToPdfConverter>>) -> Self {
        let office = config
            .office_binary
            .as_ref()
            .map(|binary| Arc::new(OfficeConverter::new(binary.clone(), config.temp_dir.clone())));

        let pdf_to_word: Arc<dyn PdfToWordConverter> = match &office {
            Some(office) => office.clone(),
            None => Arc::new(TextLayerConverter),
        };
        let word_to_pdf: Arc<dyn WordToPdfConverter> = match (remote, office) {
            (Some(remote), _) => remote,
            (None, Some(office)) => office,
            (None, None) => Arc::new(BuiltinPdfRenderer::new(config.paper_size)),
        };

        info!(
            pdf_to_word = pdf_to_word.name(),
            word_to_pdf = word_to_pdf.name(),
            "Converters selected"
        );
        Self::new(pdf_to_word, word_to_pdf)
    }
}

impl std::fmt::Debug for ConverterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterSet")
            .field("pdf_to_word", &self.pdf_to_word.name())
            .field("word_to_pdf", &self.word_to_pdf.name())
            .finish()
    }
}
