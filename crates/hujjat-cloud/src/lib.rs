// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// hujjat-cloud: remote Word to PDF conversion through CloudConvert.
//
// One conversion is: create job, post the file to the job's upload form,
// block on `/jobs/{id}/wait`, then download the exported PDF. Every failure
// on the way, timeouts included, surfaces as `ServiceUnavailable`.

mod job;

use std::time::Duration;

use async_trait::async_trait;
use hujjat_core::error::{HujjatError, Result};
use hujjat_core::{CloudConvertConfig, DocumentKind};
use hujjat_document::WordToPdfConverter;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

use crate::job::{Envelope, Job, UploadForm, job_request};

pub struct CloudConvertClient {
    http: Client,
    config: CloudConvertConfig,
}

impl CloudConvertClient {
    pub fn new(config: CloudConvertConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("hujjat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HujjatError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| HujjatError::ServiceUnavailable("CloudConvert API key is not set".into()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn create_job(&self, kind: DocumentKind) -> Result<Job> {
        let response = self
            .http
            .post(self.endpoint("jobs"))
            .bearer_auth(self.api_key()?)
            .json(&job_request(kind))
            .send()
            .await
            .map_err(|e| unavailable("create job", e))?;
        let job = read_job(checked("create job", response).await?).await?;
        info!(job_id = %job.id, "CloudConvert job created");
        Ok(job)
    }

    async fn upload(&self, form: &UploadForm, bytes: &[u8], kind: DocumentKind) -> Result<()> {
        let part = upload_part(bytes, kind)?;
        let multipart = form
            .fields()
            .fold(Form::new(), |multipart, (key, value)| multipart.text(key, value))
            .part("file", part);

        let response = self
            .http
            .post(&form.url)
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| unavailable("upload", e))?;
        checked("upload", response).await?;
        debug!(bytes = bytes.len(), "File uploaded");
        Ok(())
    }

    async fn wait(&self, job_id: &str) -> Result<Job> {
        let response = self
            .http
            .get(self.endpoint(&format!("jobs/{job_id}/wait")))
            .bearer_auth(self.api_key()?)
            .send()
            .await
            .map_err(|e| unavailable("wait for job", e))?;
        read_job(checked("wait for job", response).await?).await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable("download", e))?;
        let bytes = checked("download", response)
            .await?
            .bytes()
            .await
            .map_err(|e| unavailable("download", e))?;
        Ok(bytes.to_vec())
    }

    async fn run(&self, word: &[u8], kind: DocumentKind) -> Result<Vec<u8>> {
        let job = self.create_job(kind).await?;
        self.upload(job.upload_form()?, word, kind).await?;

        let finished = self.wait(&job.id).await?;
        let export = finished.export_url()?;
        debug!(file = export.filename.as_deref().unwrap_or("?"), "Export ready");

        let pdf = self.download(&export.url).await?;
        info!(job_id = %job.id, bytes = pdf.len(), "CloudConvert job finished");
        Ok(pdf)
    }
}

#[async_trait]
impl WordToPdfConverter for CloudConvertClient {
    fn name(&self) -> &'static str {
        "cloudconvert"
    }

    #[instrument(skip(self, word), fields(bytes_len = word.len()))]
    async fn word_to_pdf(&self, word: &[u8], kind: DocumentKind) -> Result<Vec<u8>> {
        self.api_key()?;
        let limit = Duration::from_secs(self.config.job_timeout_secs);
        match tokio::time::timeout(limit, self.run(word, kind)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(limit_secs = limit.as_secs(), "CloudConvert job timed out");
                Err(HujjatError::ServiceUnavailable(format!(
                    "job did not finish within {}s",
                    limit.as_secs()
                )))
            }
        }
    }
}

fn unavailable(step: &str, err: reqwest::Error) -> HujjatError {
    if err.is_timeout() {
        HujjatError::ServiceUnavailable(format!("{step}: request timed out"))
    } else {
        HujjatError::ServiceUnavailable(format!("{step}: {err}"))
    }
}

/// Pass through 2xx responses; anything else becomes `ServiceUnavailable`
/// carrying the status and body.
async fn checked(step: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(step, %status, "CloudConvert request rejected");
    Err(HujjatError::ServiceUnavailable(format!(
        "{step}: HTTP {status}: {}",
        body.trim()
    )))
}

/// The multipart file field, typed so the service picks the right importer.
fn upload_part(bytes: &[u8], kind: DocumentKind) -> Result<Part> {
    Part::bytes(bytes.to_vec())
        .file_name(format!("document{}", kind.extension()))
        .mime_str(kind.mime_type())
        .map_err(|e| unavailable("upload", e))
}

async fn read_job(response: Response) -> Result<Job> {
    let envelope: Envelope = response
        .json()
        .await
        .map_err(|e| unavailable("read job response", e))?;
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> CloudConvertConfig {
        CloudConvertConfig {
            api_key: api_key.map(String::from),
            // Nothing listens here; tests must fail before any request.
            base_url: "http://127.0.0.1:9/v2/".into(),
            ..CloudConvertConfig::default()
        }
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let client = CloudConvertClient::new(config(None)).unwrap();
        let err = client
            .word_to_pdf(b"PK", DocumentKind::Word)
            .await
            .unwrap_err();
        assert!(matches!(err, HujjatError::ServiceUnavailable(msg) if msg.contains("API key")));
    }

    #[test]
    fn endpoints_join_without_double_slashes() {
        let client = CloudConvertClient::new(config(Some("k"))).unwrap();
        assert_eq!(client.endpoint("jobs"), "http://127.0.0.1:9/v2/jobs");
        assert_eq!(
            client.endpoint("jobs/abc/wait"),
            "http://127.0.0.1:9/v2/jobs/abc/wait"
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_unavailable() {
        let client = CloudConvertClient::new(CloudConvertConfig {
            request_timeout_secs: 2,
            ..config(Some("k"))
        })
        .unwrap();
        let err = client
            .word_to_pdf(b"PK", DocumentKind::Word)
            .await
            .unwrap_err();
        assert!(matches!(err, HujjatError::ServiceUnavailable(_)), "got: {err}");
    }

    #[test]
    fn upload_part_carries_each_kind_mime_type() {
        for kind in [DocumentKind::Word, DocumentKind::LegacyWord, DocumentKind::Pdf] {
            assert!(upload_part(b"PK", kind).is_ok(), "{kind:?}");
        }
    }
}
