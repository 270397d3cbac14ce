//! Remote service abstraction.
//!
//! The ranking mathematics and the language generation both run in external
//! services. These traits are the seam between the orchestration logic in
//! this crate and whatever transport the application uses to reach them
//! (HTTP in the `docchat` binary, hand-written fakes in tests).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//! Calls are fallible and are never retried by the core.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChatReply, FileDomain, GenerationRequest, SearchHit, SearchRequest};

/// The document ranking service.
#[async_trait]
pub trait RetrievalService: Send + Sync {
    /// Rank documents for `request`, most relevant first.
    ///
    /// Implementations return hits in the service's order; callers must not
    /// re-sort them.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;

    /// List the folders and files the service can scope a search to.
    async fn list_files(&self) -> Result<FileDomain>;
}

/// The answer synthesis service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Produce an answer for `request.query` from the supplied hits and history.
    async fn chat(&self, request: &GenerationRequest) -> Result<ChatReply>;
}
