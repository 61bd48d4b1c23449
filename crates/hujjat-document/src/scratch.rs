// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Temporary storage for intermediate and pending documents.
//
// Every artifact is a named temporary file removed when its handle drops, so
// release happens on every exit path (success, error, early return) without
// explicit cleanup. A `Scratch` directory groups one operation's artifacts
// and is removed as a whole when the operation ends.

use std::io::Write;
use std::path::{Path, PathBuf};

use hujjat_core::DocumentKind;
use hujjat_core::error::Result;
use tempfile::{Builder, NamedTempFile, TempDir};
use tracing::debug;

/// Per-operation scratch directory.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Create a scratch directory under `root`, or the system temp dir.
    pub fn new_in(root: Option<&Path>) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("hujjat-");
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        debug!(path = %dir.path().display(), "Scratch directory created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Store `bytes` as a new artifact inside this directory.
    pub fn store(&self, label: &str, kind: DocumentKind, bytes: &[u8]) -> Result<TempArtifact> {
        TempArtifact::create_in(self.dir.path(), label, kind, bytes)
    }
}

/// One document on disk, deleted when dropped.
#[derive(Debug)]
pub struct TempArtifact {
    file: NamedTempFile,
    kind: DocumentKind,
}

impl TempArtifact {
    /// Write `bytes` to a fresh file in `dir` named `<label>…<extension>`.
    pub fn create_in(dir: &Path, label: &str, kind: DocumentKind, bytes: &[u8]) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let prefix = format!("{label}-");
        let mut file = Builder::new()
            .prefix(&prefix)
            .suffix(kind.extension())
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        debug!(path = %file.path().display(), bytes = bytes.len(), "Artifact stored");
        Ok(Self { file, kind })
    }

    /// Same as [`TempArtifact::create_in`], under `root` or the system temp dir.
    pub fn create(root: Option<&Path>, label: &str, kind: DocumentKind, bytes: &[u8]) -> Result<Self> {
        let dir = root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        Self::create_in(&dir, label, kind, bytes)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.file.path())?)
    }

    /// Delete the file now rather than at drop, surfacing any I/O error.
    pub fn release(self) -> Result<PathBuf> {
        let path = self.file.path().to_path_buf();
        self.file.close()?;
        debug!(path = %path.display(), "Artifact released");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_is_deleted_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let artifact =
            TempArtifact::create(Some(root.path()), "upload", DocumentKind::Pdf, b"%PDF-1.4").unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        assert_eq!(artifact.read().unwrap(), b"%PDF-1.4");

        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn release_removes_file_immediately() {
        let root = tempfile::tempdir().unwrap();
        let artifact =
            TempArtifact::create(Some(root.path()), "x", DocumentKind::Word, b"PK").unwrap();
        let path = artifact.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn scratch_directory_is_removed_with_its_contents() {
        let root = tempfile::tempdir().unwrap();
        let scratch = Scratch::new_in(Some(root.path())).unwrap();
        let dir = scratch.path().to_path_buf();
        let kept = scratch.store("render", DocumentKind::Pdf, b"data").unwrap();
        assert!(kept.path().starts_with(&dir));

        drop(kept);
        drop(scratch);
        assert!(!dir.exists());
    }
}
