//! Search scope: the known folder/file domain and the active filter set.
//!
//! The domain is fetched from the retrieval service once per session. The
//! active set is a toggle-based multi-select over scope tokens. Tokens that
//! are not (or no longer) in the domain are tolerated, but nothing here ever
//! adds a token the user did not toggle.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::FileDomain;
use crate::service::RetrievalService;

/// A set of scope tokens (folder names or file names).
///
/// An empty set means "no restriction". Serializes as a sorted JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeSet<String>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `token`. Returns `true` if it is now a member.
    pub fn toggle(&mut self, token: &str) -> bool {
        if self.0.remove(token) {
            false
        } else {
            self.0.insert(token.to_string());
            true
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Known scope domain plus the user's active filter selection.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    domain: FileDomain,
    loaded: bool,
    active: FilterSet,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the domain if it has not been fetched yet this session.
    ///
    /// Fails open: on a transport error the domain stays empty and the
    /// registry remains usable.
    pub async fn load(&mut self, service: &dyn RetrievalService) -> &FileDomain {
        if !self.loaded {
            self.fetch(service).await;
        }
        &self.domain
    }

    /// Re-fetch the domain unconditionally (e.g. after the service reindexed).
    ///
    /// On failure the previously loaded domain is kept.
    pub async fn refresh(&mut self, service: &dyn RetrievalService) -> &FileDomain {
        self.fetch(service).await;
        &self.domain
    }

    async fn fetch(&mut self, service: &dyn RetrievalService) {
        match service.list_files().await {
            Ok(domain) => {
                debug!(
                    folders = domain.folders.len(),
                    files = domain.files.len(),
                    "Loaded filter domain"
                );
                self.domain = domain;
                self.loaded = true;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load filter domain; continuing without it");
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn domain(&self) -> &FileDomain {
        &self.domain
    }

    pub fn active(&self) -> &FilterSet {
        &self.active
    }

    /// Flip membership of `token` in the active set.
    ///
    /// Returns `true` if the token is now active.
    pub fn toggle(&mut self, token: &str) -> bool {
        if self.loaded && !self.domain.contains(token) {
            debug!(token, "Toggling a token outside the known domain");
        }
        self.active.toggle(token)
    }

    /// Empty the active set.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Active tokens not present in the loaded domain.
    pub fn stale_tokens(&self) -> Vec<&str> {
        if !self.loaded {
            return Vec::new();
        }
        self.active
            .iter()
            .filter(|t| !self.domain.contains(t))
            .collect()
    }
}
