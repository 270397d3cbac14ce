//! Error kinds for a query exchange.

use thiserror::Error;

/// Failures that can occur while dispatching a search or composing an answer.
///
/// The `*Unavailable` kinds never escape [`AnswerComposer::submit`](crate::AnswerComposer::submit):
/// the composer recovers from them by appending a fallback assistant turn.
/// They do escape [`QueryDispatcher::dispatch`](crate::QueryDispatcher::dispatch),
/// which has no conversation to recover into.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The query text was empty or whitespace. Raised before any network call.
    #[error("Please enter a search query.")]
    EmptyQuery,

    /// The retrieval service could not be reached or answered with a failure status.
    #[error("Retrieval service unavailable: {reason}")]
    RetrievalUnavailable {
        /// Transport or status detail.
        reason: String,
    },

    /// The generation service could not be reached or answered with a failure status.
    #[error("Generation service unavailable: {reason}")]
    GenerationUnavailable {
        /// Transport or status detail.
        reason: String,
    },

    /// A response arrived after the conversation was cleared and was dropped.
    #[error("Response discarded: the conversation was cleared while it was in flight.")]
    StaleResponseDiscarded,

    /// A chat exchange is already dispatching or composing.
    #[error("An exchange is already in progress.")]
    ExchangeInFlight,
}

impl QueryError {
    /// True for the transport failures that the composer recovers from locally.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            QueryError::RetrievalUnavailable { .. } | QueryError::GenerationUnavailable { .. }
        )
    }
}
