//! Query dispatcher: one retrieval round-trip with local validation.

use std::sync::Arc;

use tracing::debug;

use crate::algorithm::AlgorithmId;
use crate::errors::QueryError;
use crate::filters::FilterSet;
use crate::models::{SearchHit, SearchRequest};
use crate::service::RetrievalService;

/// Issues retrieval requests and normalizes failures into [`QueryError`].
///
/// Hits are passed through in the order the service returned them. The
/// service owns ranking and tie-breaking.
#[derive(Clone)]
pub struct QueryDispatcher {
    service: Arc<dyn RetrievalService>,
}

impl QueryDispatcher {
    pub fn new(service: Arc<dyn RetrievalService>) -> Self {
        Self { service }
    }

    /// Send `request` to the retrieval service.
    pub async fn dispatch(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, QueryError> {
        debug!(
            algorithm = %request.algorithm(),
            filters = request.filters().len(),
            "Dispatching search"
        );
        let hits = self
            .service
            .search(request)
            .await
            .map_err(|e| QueryError::RetrievalUnavailable {
                reason: format!("{:#}", e),
            })?;
        debug!(hits = hits.len(), "Search returned");
        Ok(hits)
    }

    /// Validate `query` and dispatch it.
    ///
    /// A blank query fails with [`QueryError::EmptyQuery`] without touching
    /// the network.
    pub async fn dispatch_query(
        &self,
        query: &str,
        algorithm: AlgorithmId,
        filters: &FilterSet,
    ) -> Result<Vec<SearchHit>, QueryError> {
        let request = SearchRequest::new(query, algorithm, filters.clone())?;
        self.dispatch(&request).await
    }
}
