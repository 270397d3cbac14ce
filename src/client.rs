//! HTTP client for the document search and chat service.
//!
//! [`HttpServiceClient`] implements both [`RetrievalService`] and
//! [`GenerationService`] over one shared `reqwest::Client`, plus the
//! document management endpoints used by the CLI.
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | [`search`](RetrievalService::search) | `POST /search` |
//! | [`list_files`](RetrievalService::list_files) | `GET /get_files` |
//! | [`chat`](GenerationService::chat) | `POST /ai-chat` |
//! | [`reload`](HttpServiceClient::reload) | `POST /reload` |
//! | [`upload`](HttpServiceClient::upload) | `POST /upload` (multipart, part `file`) |
//! | [`download`](HttpServiceClient::download) | `GET /download/{filename}` |
//!
//! Requests are never retried. A non-success status is an error whose
//! message is taken from the service's `{"error": "..."}` body when present.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use docchat_core::models::SearchResponse;
use docchat_core::{
    ChatReply, FileDomain, GenerationRequest, GenerationService, RetrievalService, SearchHit,
    SearchRequest,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;

/// `POST /reload` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReloadReport {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub doc_count: usize,
}

/// `POST /upload` response. Also the body of a rejected upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadReport {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub total_documents: Option<usize>,
}

impl UploadReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// reqwest-backed client for the remote service.
#[derive(Debug, Clone)]
pub struct HttpServiceClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpServiceClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.base_url()?,
            Duration::from_secs(config.service.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `base` with `segments` appended, each percent-encoded.
    fn endpoint<'a, I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Service URL cannot have a path: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Ask the service to reindex its document folder.
    pub async fn reload(&self) -> Result<ReloadReport> {
        let url = self.endpoint(["reload"])?;
        debug!(%url, "Reloading documents");
        let response = self.http.post(url).send().await?;
        let response = check_status(response, "reload").await?;
        Ok(response.json().await?)
    }

    /// Upload one file.
    ///
    /// A rejection by the service (non-success status with an `error` body)
    /// is returned as an `Ok` report with `error` set. Local I/O and transport
    /// failures are `Err`.
    pub async fn upload(&self, path: &Path) -> Result<UploadReport> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file path: {}", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let form = Form::new().part("file", Part::bytes(bytes).file_name(name.clone()));
        let url = self.endpoint(["upload"])?;
        debug!(%url, file = %name, "Uploading");
        let response = self.http.post(url).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<UploadReport>(&body) {
            Ok(report) if status.is_success() || report.error.is_some() => Ok(report),
            _ if status.is_success() => Ok(UploadReport {
                filename: Some(name),
                ..Default::default()
            }),
            _ => bail!("upload failed with HTTP {}: {}", status, body.trim()),
        }
    }

    /// Fetch a document's bytes. `filename` may contain `/`-separated folders.
    pub async fn download(&self, filename: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(std::iter::once("download").chain(filename.split('/')))?;
        debug!(%url, "Downloading");
        let response = self.http.get(url).send().await?;
        let response = check_status(response, "download").await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Turn a non-success response into an error carrying the service message.
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => bail!("{} failed with HTTP {}: {}", what, status, err.error),
        Err(_) => bail!("{} failed with HTTP {}", what, status),
    }
}

#[async_trait]
impl RetrievalService for HttpServiceClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let url = self.endpoint(["search"])?;
        let response = self.http.post(url).json(request).send().await?;
        let response = check_status(response, "search").await?;
        let body: SearchResponse = response
            .json()
            .await
            .context("Invalid search response")?;
        Ok(body.results)
    }

    async fn list_files(&self) -> Result<FileDomain> {
        let url = self.endpoint(["get_files"])?;
        let response = self.http.get(url).send().await?;
        let response = check_status(response, "file listing").await?;
        Ok(response
            .json()
            .await
            .context("Invalid file listing response")?)
    }
}

#[async_trait]
impl GenerationService for HttpServiceClient {
    async fn chat(&self, request: &GenerationRequest) -> Result<ChatReply> {
        let url = self.endpoint(["ai-chat"])?;
        let response = self.http.post(url).json(request).send().await?;
        let response = check_status(response, "chat").await?;
        Ok(response.json().await.context("Invalid chat response")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpServiceClient {
        HttpServiceClient::new(Url::parse(base).unwrap(), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(
            c.endpoint(["search"]).unwrap().as_str(),
            "http://localhost:5000/api/search"
        );
        let c = client("http://localhost:5000");
        assert_eq!(
            c.endpoint(["get_files"]).unwrap().as_str(),
            "http://localhost:5000/get_files"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let c = client("http://localhost:5000");
        let url = c
            .endpoint(std::iter::once("download").chain("My Docs/a#1?.pdf".split('/')))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/download/My%20Docs/a%231%3F.pdf"
        );
    }

    #[test]
    fn test_upload_report_success() {
        let ok: UploadReport =
            serde_json::from_str(r#"{"message":"ok","filename":"a.pdf","total_documents":3}"#)
                .unwrap();
        assert!(ok.is_success());
        let bad: UploadReport = serde_json::from_str(r#"{"error":"File type not allowed"}"#).unwrap();
        assert!(!bad.is_success());
    }
}
