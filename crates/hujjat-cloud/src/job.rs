// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CloudConvert v2 job payloads.
//
// A conversion is one job of three named tasks: an upload slot, the
// conversion itself, and an export that publishes a download URL.

use hujjat_core::DocumentKind;
use hujjat_core::error::{HujjatError, Result};
use serde::Deserialize;
use serde_json::{Map, Value, json};

pub(crate) const UPLOAD_TASK: &str = "upload-my-file";
pub(crate) const CONVERT_TASK: &str = "convert-my-file";
pub(crate) const EXPORT_TASK: &str = "export-my-file";

/// Body of `POST /jobs` for converting an upload of `kind` to PDF.
pub(crate) fn job_request(kind: DocumentKind) -> Value {
    let input_format = kind.extension().trim_start_matches('.');
    let mut tasks = Map::new();
    tasks.insert(UPLOAD_TASK.into(), json!({ "operation": "import/upload" }));
    tasks.insert(
        CONVERT_TASK.into(),
        json!({
            "operation": "convert",
            "input": UPLOAD_TASK,
            "input_format": input_format,
            "output_format": "pdf"
        }),
    );
    tasks.insert(
        EXPORT_TASK.into(),
        json!({
            "operation": "export/url",
            "input": CONVERT_TASK
        }),
    );
    json!({ "tasks": tasks, "tag": "hujjat" })
}

/// Every job endpoint wraps its payload in `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub data: Job,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Job {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Task {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskResult {
    #[serde(default)]
    pub form: Option<UploadForm>,
    #[serde(default)]
    pub files: Vec<ExportedFile>,
}

/// Pre-signed form the file has to be posted to.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadForm {
    pub url: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl UploadForm {
    /// Form parameters as text fields, in the order the service sent them.
    pub fn fields(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.parameters.iter().map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportedFile {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl Job {
    fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.name == name)
    }

    /// The upload slot of a freshly created job.
    ///
    /// Older responses list tasks without names; the upload task is then the
    /// first one.
    pub fn upload_form(&self) -> Result<&UploadForm> {
        self.task(UPLOAD_TASK)
            .or_else(|| self.tasks.first())
            .and_then(|task| task.result.as_ref())
            .and_then(|result| result.form.as_ref())
            .ok_or_else(|| {
                HujjatError::ServiceUnavailable(format!("job {} has no upload form", self.id))
            })
    }

    /// First failed task, rendered as `name: message`.
    pub fn failure(&self) -> Option<String> {
        self.tasks
            .iter()
            .find(|task| task.status == "error")
            .map(|task| {
                let message = task.message.as_deref().unwrap_or("no message");
                format!("{}: {message}", task.name)
            })
    }

    /// Download URL of the finished export.
    pub fn export_url(&self) -> Result<&ExportedFile> {
        if let Some(failure) = self.failure() {
            return Err(HujjatError::ServiceUnavailable(format!(
                "job {} failed ({failure})",
                self.id
            )));
        }
        let export = self
            .task(EXPORT_TASK)
            .filter(|task| task.status == "finished")
            .ok_or_else(|| {
                HujjatError::ServiceUnavailable(format!(
                    "job {} ended without a finished export (status '{}')",
                    self.id, self.status
                ))
            })?;
        export
            .result
            .as_ref()
            .and_then(|result| result.files.first())
            .ok_or_else(|| {
                HujjatError::ServiceUnavailable(format!("job {} exported no files", self.id))
            })
    }
}
