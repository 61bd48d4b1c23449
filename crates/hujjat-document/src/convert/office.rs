// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LibreOffice converter. Shells out to `soffice --headless --convert-to`.
//
// Each conversion gets its own scratch directory holding the input and the
// produced output; both vanish with the directory when the call returns.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use hujjat_core::DocumentKind;
use hujjat_core::error::{HujjatError, Result};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use super::{PdfToWordConverter, WordToPdfConverter};
use crate::scratch::Scratch;

/// Upper bound on a single soffice run.
const CONVERSION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct OfficeConverter {
    binary: PathBuf,
    scratch_root: Option<PathBuf>,
}

impl OfficeConverter {
    pub fn new(binary: PathBuf, scratch_root: Option<PathBuf>) -> Self {
        Self {
            binary,
            scratch_root,
        }
    }

    /// Convert `input` (of kind `from`) to `to`.
    #[instrument(skip(self, input), fields(binary = %self.binary.display(), bytes_len = input.len()))]
    async fn convert(&self, input: &[u8], from: DocumentKind, to: DocumentKind) -> Result<Vec<u8>> {
        let scratch = Scratch::new_in(self.scratch_root.as_deref())?;
        let source = scratch.store("input", from, input)?;

        let mut command = Command::new(&self.binary);
        command.arg("--headless").arg("--norestore");
        if from == DocumentKind::Pdf {
            // Without the import filter soffice opens PDFs in Draw, which
            // cannot export to Word.
            command.arg("--infilter=writer_pdf_import");
        }
        command
            .arg("--convert-to")
            .arg(target_filter(to))
            .arg("--outdir")
            .arg(scratch.path())
            .arg(source.path())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(CONVERSION_TIMEOUT, command.output())
            .await
            .map_err(|_| {
                HujjatError::Converter(format!(
                    "soffice did not finish within {}s",
                    CONVERSION_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    HujjatError::Converter(format!("{} not found", self.binary.display()))
                } else {
                    HujjatError::Converter(format!("failed to run soffice: {e}"))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(code, %stderr, "soffice failed");
            return Err(HujjatError::Converter(format!(
                "soffice exited with {code}: {}",
                stderr.trim()
            )));
        }

        let produced = source.path().with_extension(to.extension().trim_start_matches('.'));
        let bytes = tokio::fs::read(&produced).await.map_err(|e| {
            HujjatError::Converter(format!(
                "soffice produced no {} output: {e}",
                to.extension()
            ))
        })?;

        debug!(output_bytes = bytes.len(), "soffice conversion done");
        Ok(bytes)
    }
}

/// `--convert-to` argument for the target kind.
fn target_filter(to: DocumentKind) -> &'static str {
    match to {
        DocumentKind::Pdf => "pdf",
        DocumentKind::Word => "docx:MS Word 2007 XML",
        DocumentKind::LegacyWord => "doc:MS Word 97",
    }
}

#[async_trait]
impl PdfToWordConverter for OfficeConverter {
    fn name(&self) -> &'static str {
        "libreoffice"
    }

    async fn pdf_to_word(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        info!("Converting PDF to Word with LibreOffice");
        self.convert(pdf, DocumentKind::Pdf, DocumentKind::Word).await
    }
}

#[async_trait]
impl WordToPdfConverter for OfficeConverter {
    fn name(&self) -> &'static str {
        "libreoffice"
    }

    async fn word_to_pdf(&self, word: &[u8], kind: DocumentKind) -> Result<Vec<u8>> {
        info!(?kind, "Converting Word to PDF with LibreOffice");
        self.convert(word, kind, DocumentKind::Pdf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_match_target_kind() {
        assert_eq!(target_filter(DocumentKind::Pdf), "pdf");
        assert!(target_filter(DocumentKind::Word).starts_with("docx"));
    }

    #[tokio::test]
    async fn missing_binary_is_a_converter_error() {
        let scratch = tempfile::tempdir().unwrap();
        let converter = OfficeConverter::new(
            PathBuf::from("/nonexistent/soffice-for-tests"),
            Some(scratch.path().to_path_buf()),
        );
        let err = converter
            .word_to_pdf(b"PK", DocumentKind::Word)
            .await
            .unwrap_err();
        assert!(matches!(err, HujjatError::Converter(msg) if msg.contains("not found")));
        // The per-call scratch directory is gone again.
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
