//! One user's session state, wired to the HTTP client.
//!
//! A [`Session`] owns the algorithm selector, the filter registry, the
//! query dispatcher for plain searches, and the answer composer with its
//! conversation. Search and chat requests read the current algorithm and
//! filter set at call time, so a change takes effect on the next request.

use anyhow::Result;
use docchat_core::{
    AlgorithmId, AlgorithmSelector, AnswerComposer, ExchangeOutcome, FileDomain, FilterRegistry,
    QueryDispatcher, QueryError, SearchHit, Turn,
};
use std::sync::Arc;
use tracing::info;

use crate::client::HttpServiceClient;
use crate::config::Config;

pub struct Session {
    client: Arc<HttpServiceClient>,
    selector: AlgorithmSelector,
    filters: FilterRegistry,
    dispatcher: QueryDispatcher,
    composer: AnswerComposer,
}

impl Session {
    pub fn new(client: HttpServiceClient, algorithm: AlgorithmId, context_turns: usize) -> Self {
        let client = Arc::new(client);
        Self {
            selector: AlgorithmSelector::new(algorithm),
            filters: FilterRegistry::new(),
            dispatcher: QueryDispatcher::new(client.clone()),
            composer: AnswerComposer::new(client.clone(), client.clone())
                .with_context_turns(context_turns),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = HttpServiceClient::from_config(config)?;
        Ok(Self::new(
            client,
            config.default_algorithm()?,
            config.chat.context_turns,
        ))
    }

    pub fn client(&self) -> &HttpServiceClient {
        &self.client
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.selector.active()
    }

    /// Switch algorithm for subsequent requests; returns the previous one.
    pub fn set_algorithm(&mut self, algorithm: AlgorithmId) -> AlgorithmId {
        let previous = self.selector.select(algorithm);
        if previous != algorithm {
            info!(from = %previous, to = %algorithm, "Algorithm changed");
        }
        previous
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Fetch the folder/file domain once per session.
    pub async fn load_filters(&mut self) -> &FileDomain {
        self.filters.load(self.client.as_ref()).await
    }

    /// Re-fetch the domain, e.g. after a reload or upload.
    pub async fn refresh_filters(&mut self) -> &FileDomain {
        self.filters.refresh(self.client.as_ref()).await
    }

    pub fn toggle_filter(&mut self, token: &str) -> bool {
        self.filters.toggle(token)
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// One retrieval round-trip with the current scope.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, QueryError> {
        self.dispatcher
            .dispatch_query(query, self.algorithm(), self.filters.active())
            .await
    }

    /// One chat exchange with the current scope.
    pub async fn ask(&self, text: &str) -> Result<ExchangeOutcome, QueryError> {
        self.composer
            .submit(text, self.algorithm(), self.filters.active())
            .await
    }

    pub fn conversation(&self) -> Vec<Turn> {
        self.composer.turns()
    }

    pub fn clear_conversation(&self) {
        self.composer.clear();
    }
}
