// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Hujjat.

use thiserror::Error;

/// Stage of a (possibly multi-hop) conversion at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    /// Decoding the uploaded bytes into a document.
    Decode,
    /// Rendering a Word document to the paginated PDF intermediate.
    RenderToPdf,
    /// Selecting pages out of the PDF intermediate.
    Filter,
    /// Converting the filtered/rewritten intermediate back to the source format.
    ConvertBack,
    /// Single-hop PDF to Word conversion.
    PdfToWord,
    /// Single-hop Word to PDF conversion.
    WordToPdf,
    /// Serialising the final document.
    Encode,
}

impl std::fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Decode => "decode",
            Self::RenderToPdf => "render-to-pdf",
            Self::Filter => "filter",
            Self::ConvertBack => "convert-back",
            Self::PdfToWord => "pdf-to-word",
            Self::WordToPdf => "word-to-pdf",
            Self::Encode => "encode",
        };
        f.write_str(name)
    }
}

/// Top-level error type for all Hujjat operations.
#[derive(Debug, Error)]
pub enum HujjatError {
    // -- Pipeline errors --
    #[error("none of the requested pages exist (document has {total_pages} pages)")]
    NoValidPages { total_pages: usize },

    #[error("conversion failed at {stage}: {source}")]
    Conversion {
        stage: ConversionStage,
        #[source]
        source: Box<HujjatError>,
    },

    #[error("conversion service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("file '{file_name}' is not accepted here (expected {expected})")]
    InvalidFileType {
        file_name: String,
        expected: &'static str,
    },

    // -- Document errors --
    #[error("unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("Word document operation failed: {0}")]
    Docx(String),

    #[error("external converter failed: {0}")]
    Converter(String),

    // -- Session errors --
    #[error("no pending document for this session")]
    NoPendingArtifact,

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HujjatError {
    /// Attribute a failure to a conversion stage.
    ///
    /// Already-staged errors keep their original stage, and `NoValidPages`
    /// passes through so callers can still report the page count.
    pub fn at_stage(self, stage: ConversionStage) -> Self {
        match self {
            err @ (Self::Conversion { .. } | Self::NoValidPages { .. }) => err,
            other => Self::Conversion {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage a conversion failure was attributed to, if any.
    pub fn stage(&self) -> Option<ConversionStage> {
        match self {
            Self::Conversion { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost cause, skipping `Conversion` wrappers.
    pub fn root_cause(&self) -> &HujjatError {
        match self {
            Self::Conversion { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HujjatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_stage_wraps_once() {
        let err = HujjatError::Pdf("bad xref".into())
            .at_stage(ConversionStage::Filter)
            .at_stage(ConversionStage::ConvertBack);
        assert_eq!(err.stage(), Some(ConversionStage::Filter));
        assert!(matches!(err.root_cause(), HujjatError::Pdf(_)));
    }

    #[test]
    fn no_valid_pages_is_never_wrapped() {
        let err = HujjatError::NoValidPages { total_pages: 3 }.at_stage(ConversionStage::Filter);
        assert!(matches!(err, HujjatError::NoValidPages { total_pages: 3 }));
    }

    #[test]
    fn service_unavailable_keeps_its_identity_under_a_stage() {
        let err = HujjatError::ServiceUnavailable("timed out".into())
            .at_stage(ConversionStage::RenderToPdf);
        let msg = err.to_string();
        assert!(msg.contains("render-to-pdf"), "got: {msg}");
        assert!(matches!(err.root_cause(), HujjatError::ServiceUnavailable(_)));
    }
}
