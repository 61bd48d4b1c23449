// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-user session record.
//
// A session holds at most one pending operation and at most one pending
// upload. Every transition that drops an upload releases its file.

use std::path::Path;

use chrono::{DateTime, Utc};
use hujjat_core::error::Result;
use hujjat_core::{DocumentKind, Operation, UserId};
use hujjat_document::TempArtifact;
use tracing::{debug, warn};

/// An upload kept on disk until the user sends the page range.
#[derive(Debug)]
pub struct StoredUpload {
    artifact: TempArtifact,
    file_name: String,
}

impl StoredUpload {
    /// Persist `bytes` under `root` (system temp dir when `None`).
    pub fn store(root: Option<&Path>, file_name: &str, kind: DocumentKind, bytes: &[u8]) -> Result<Self> {
        let artifact = TempArtifact::create(root, "upload", kind, bytes)?;
        Ok(Self {
            artifact,
            file_name: file_name.to_string(),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> DocumentKind {
        self.artifact.kind()
    }

    pub fn path(&self) -> &Path {
        self.artifact.path()
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        self.artifact.read()
    }

    /// Delete the file now. Failures are logged; the file handle is gone
    /// either way.
    pub fn release(self) {
        let file_name = self.file_name;
        if let Err(e) = self.artifact.release() {
            warn!(file = %file_name, error = %e, "Failed to remove pending upload");
        }
    }
}

#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingFile(Operation),
    AwaitingPageRange(StoredUpload),
}

#[derive(Debug)]
pub struct Session {
    user_id: UserId,
    state: SessionState,
    last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            state: SessionState::Idle,
            last_activity: Utc::now(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn touch(&mut self) {
        self.touch_at(Utc::now());
    }

    pub fn touch_at(&mut self, at: DateTime<Utc>) {
        self.last_activity = at;
    }

    /// How long the session has been idle at `now`; zero if `now` is earlier.
    pub fn idle_for(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.last_activity).to_std().unwrap_or_default()
    }

    /// Operation waiting for a file, if any.
    pub fn awaiting_file(&self) -> Option<Operation> {
        match self.state {
            SessionState::AwaitingFile(op) => Some(op),
            _ => None,
        }
    }

    pub fn has_pending_upload(&self) -> bool {
        matches!(self.state, SessionState::AwaitingPageRange(_))
    }

    /// Wait for a file for `operation`, dropping anything pending.
    pub fn begin(&mut self, operation: Operation) {
        self.replace_state(SessionState::AwaitingFile(operation));
    }

    /// Keep `upload` until the page range arrives, replacing any older one.
    pub fn hold(&mut self, upload: StoredUpload) {
        self.replace_state(SessionState::AwaitingPageRange(upload));
    }

    /// Hand the pending upload to the caller and go idle. The caller owns
    /// the release from here on.
    pub fn take_upload(&mut self) -> Option<StoredUpload> {
        match std::mem::take(&mut self.state) {
            SessionState::AwaitingPageRange(upload) => Some(upload),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Back to `Idle`, releasing any pending upload.
    pub fn reset(&mut self) {
        self.replace_state(SessionState::Idle);
    }

    fn replace_state(&mut self, next: SessionState) {
        if let SessionState::AwaitingPageRange(upload) = std::mem::replace(&mut self.state, next) {
            debug!(user = %self.user_id, file = %upload.file_name(), "Releasing pending upload");
            upload.release();
        }
    }
}
