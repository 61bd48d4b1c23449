// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Hujjat document pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the end user talking to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one pipeline run (recorded in tracing spans).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of document the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Pdf,
    /// Office Open XML word-processing package (`.docx`).
    Word,
    /// Legacy binary Word file (`.doc`). Only passed through to converters.
    LegacyWord,
}

impl DocumentKind {
    /// MIME type used when uploading to remote converters.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::LegacyWord => "application/msword",
        }
    }

    /// Canonical file extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Word => ".docx",
            Self::LegacyWord => ".doc",
        }
    }

    /// Infer the kind from a file name's extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Word),
            "doc" => Some(Self::LegacyWord),
            _ => None,
        }
    }

    /// Sniff the kind from the leading bytes of a file.
    ///
    /// A ZIP header is reported as `Word`; callers that need certainty must
    /// still open the package and look for `word/document.xml`.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Word);
        }
        if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
            return Some(Self::LegacyWord);
        }
        None
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Self::Word | Self::LegacyWord)
    }
}

/// Which rule table the transliteration engine applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransliterationDirection {
    ToLatin,
    ToCyrillic,
}

impl TransliterationDirection {
    /// Suffix appended to the output file stem.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::ToLatin => "_to_latin",
            Self::ToCyrillic => "_to_cyrillic",
        }
    }
}

/// Single-shot operations a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    PdfToWord,
    WordToPdf,
    PageSelection,
    Transliterate(TransliterationDirection),
}

impl Operation {
    /// Parse the inline-keyboard callback identifier used by the transport.
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "pdf_to_word" => Some(Self::PdfToWord),
            "word_to_pdf" => Some(Self::WordToPdf),
            "page_selection" => Some(Self::PageSelection),
            "cyrillic_to_latin" => Some(Self::Transliterate(TransliterationDirection::ToLatin)),
            "latin_to_cyrillic" => {
                Some(Self::Transliterate(TransliterationDirection::ToCyrillic))
            }
            _ => None,
        }
    }

    /// Inverse of [`Operation::from_callback`].
    pub fn callback_id(&self) -> &'static str {
        match self {
            Self::PdfToWord => "pdf_to_word",
            Self::WordToPdf => "word_to_pdf",
            Self::PageSelection => "page_selection",
            Self::Transliterate(TransliterationDirection::ToLatin) => "cyrillic_to_latin",
            Self::Transliterate(TransliterationDirection::ToCyrillic) => "latin_to_cyrillic",
        }
    }

    /// Whether a file of `kind` is acceptable input for this operation.
    pub fn accepts(&self, kind: DocumentKind) -> bool {
        match self {
            Self::PdfToWord => kind == DocumentKind::Pdf,
            Self::WordToPdf => kind.is_word(),
            Self::PageSelection | Self::Transliterate(_) => {
                matches!(kind, DocumentKind::Pdf | DocumentKind::Word)
            }
        }
    }

    /// Human-readable list of accepted extensions, used in rejection messages.
    pub fn accepted_extensions(&self) -> &'static str {
        match self {
            Self::PdfToWord => "PDF",
            Self::WordToPdf => "DOCX/DOC",
            Self::PageSelection | Self::Transliterate(_) => "PDF/DOCX",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.callback_id())
    }
}

/// Standard paper sizes for the built-in PDF renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A5,
    Letter,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// Build the output file name for an operation's result.
///
/// `report.docx` + page selection -> `report_selected_pages.docx`,
/// `kitob.pdf` + transliteration to Latin -> `kitob_to_latin.pdf`.
pub fn output_file_name(original: &str, operation: Operation, output: DocumentKind) -> String {
    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };
    let suffix = match operation {
        Operation::PdfToWord | Operation::WordToPdf => "",
        Operation::PageSelection => "_selected_pages",
        Operation::Transliterate(direction) => direction.file_suffix(),
    };
    format!("{stem}{suffix}{}", output.extension())
}
