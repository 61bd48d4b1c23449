// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A decoded document of either supported kind.

use hujjat_core::DocumentKind;
use hujjat_core::error::{HujjatError, Result};

use crate::pdf::PdfDocument;
use crate::word::WordDocument;

#[derive(Debug, Clone)]
pub enum SourceDocument {
    Pdf(PdfDocument),
    Word(WordDocument),
}

impl SourceDocument {
    /// Decode `bytes` as a document of `kind`.
    ///
    /// Legacy `.doc` files cannot be decoded; they are only ever handed to a
    /// Word → PDF converter as opaque bytes.
    pub fn decode(bytes: &[u8], kind: DocumentKind) -> Result<Self> {
        match kind {
            DocumentKind::Pdf => PdfDocument::from_bytes(bytes).map(Self::Pdf),
            DocumentKind::Word => WordDocument::from_bytes(bytes).map(Self::Word),
            DocumentKind::LegacyWord => Err(HujjatError::UnsupportedDocument(
                "legacy .doc files can only be converted to PDF".into(),
            )),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Self::Pdf(pdf) => pdf.to_bytes(),
            Self::Word(word) => word.to_bytes(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Pdf(_) => DocumentKind::Pdf,
            Self::Word(_) => DocumentKind::Word,
        }
    }

    /// Page count; `None` for flowed Word text, which has no fixed pages.
    pub fn page_count(&self) -> Option<usize> {
        match self {
            Self::Pdf(pdf) => Some(pdf.page_count()),
            Self::Word(_) => None,
        }
    }
}
