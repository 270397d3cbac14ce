//! Augmented answer composer: retrieve, then synthesize.
//!
//! One exchange moves through these phases:
//!
//! ```text
//! Idle ──submit──▶ Dispatching ──hits──▶ Composing ──reply──▶ Completed ─┐
//!                       │                    │                          │
//!                       └──error──▶ Failed ◀─┘                          │
//!                                     │                                 │
//!                                     └────────────▶ Idle ◀─────────────┘
//! ```
//!
//! Only one exchange runs at a time. A submission while dispatching or
//! composing is rejected with [`QueryError::ExchangeInFlight`] and leaves the
//! conversation untouched, so the hits used for generation are always the
//! ones retrieved by the same exchange.
//!
//! Transport failures are never returned to the caller. They are recorded as
//! a fallback assistant turn and reported through [`ExchangeOutcome::Failed`].
//! If the conversation is cleared while an exchange is in flight, its
//! response is dropped ([`ExchangeOutcome::Discarded`]).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::algorithm::AlgorithmId;
use crate::conversation::{ConversationStore, DEFAULT_CONTEXT_TURNS};
use crate::dispatch::QueryDispatcher;
use crate::errors::QueryError;
use crate::filters::FilterSet;
use crate::models::{GenerationRequest, SearchRequest, Turn};
use crate::render::GeneratedText;
use crate::service::{GenerationService, RetrievalService};

/// Assistant text recorded when retrieval or generation is unavailable.
pub const UNAVAILABLE_FALLBACK: &str =
    "Sorry, I encountered an error. Please make sure the backend server is running and try again.";

/// Where the composer is within an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    Idle,
    Dispatching,
    Composing,
}

/// How a submitted exchange ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    /// The answer turn that was appended.
    Completed(Turn),
    /// Retrieval or generation failed; `turn` is the fallback that was appended.
    Failed { error: QueryError, turn: Turn },
    /// The conversation was cleared mid-flight; nothing was appended.
    Discarded,
}

impl ExchangeOutcome {
    /// The appended assistant turn, if any.
    pub fn turn(&self) -> Option<&Turn> {
        match self {
            ExchangeOutcome::Completed(turn) | ExchangeOutcome::Failed { turn, .. } => Some(turn),
            ExchangeOutcome::Discarded => None,
        }
    }
}

/// Orchestrates retrieval and generation for a single conversation.
pub struct AnswerComposer {
    dispatcher: QueryDispatcher,
    generator: Arc<dyn GenerationService>,
    context_turns: usize,
    phase: Mutex<ExchangePhase>,
    conversation: Mutex<ConversationStore>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the re-entrancy guard for one exchange; resets to `Idle` on drop,
/// including when the exchange future is dropped mid-flight.
struct ExchangeGuard<'a> {
    phase: &'a Mutex<ExchangePhase>,
}

impl<'a> ExchangeGuard<'a> {
    fn acquire(phase: &'a Mutex<ExchangePhase>) -> Result<Self, QueryError> {
        let mut current = lock(phase);
        if *current != ExchangePhase::Idle {
            return Err(QueryError::ExchangeInFlight);
        }
        *current = ExchangePhase::Dispatching;
        Ok(Self { phase })
    }

    fn advance(&self, next: ExchangePhase) {
        *lock(self.phase) = next;
    }
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        *lock(self.phase) = ExchangePhase::Idle;
    }
}

impl AnswerComposer {
    pub fn new(
        retrieval: Arc<dyn RetrievalService>,
        generator: Arc<dyn GenerationService>,
    ) -> Self {
        Self {
            dispatcher: QueryDispatcher::new(retrieval),
            generator,
            context_turns: DEFAULT_CONTEXT_TURNS,
            phase: Mutex::new(ExchangePhase::Idle),
            conversation: Mutex::new(ConversationStore::new()),
        }
    }

    /// Number of prior turns sent as generation context.
    pub fn with_context_turns(mut self, k: usize) -> Self {
        self.context_turns = k;
        self
    }

    pub fn context_turns(&self) -> usize {
        self.context_turns
    }

    pub fn phase(&self) -> ExchangePhase {
        *lock(&self.phase)
    }

    /// Snapshot of the conversation, oldest first.
    pub fn turns(&self) -> Vec<Turn> {
        lock(&self.conversation).all().to_vec()
    }

    pub fn len(&self) -> usize {
        lock(&self.conversation).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.conversation).is_empty()
    }

    /// Empty the conversation. Responses to exchanges already in flight
    /// will be discarded.
    pub fn clear(&self) {
        lock(&self.conversation).clear();
    }

    /// Run one exchange for `text` using the given scope.
    ///
    /// Returns `Err` only when the submission is rejected up front: blank
    /// text ([`QueryError::EmptyQuery`]) or another exchange in progress
    /// ([`QueryError::ExchangeInFlight`]). In both cases nothing is appended.
    pub async fn submit(
        &self,
        text: &str,
        algorithm: AlgorithmId,
        filters: &FilterSet,
    ) -> Result<ExchangeOutcome, QueryError> {
        let request = SearchRequest::new(text, algorithm, filters.clone())?;
        let guard = ExchangeGuard::acquire(&self.phase)?;

        // History is captured before the user's own turn joins the log.
        let (history, epoch) = {
            let mut conversation = lock(&self.conversation);
            let history = conversation.window(self.context_turns).to_vec();
            conversation.append(Turn::user(request.query()));
            (history, conversation.epoch())
        };
        info!(
            algorithm = %algorithm,
            filters = filters.len(),
            history = history.len(),
            epoch,
            "Exchange started"
        );

        let hits = match self.dispatcher.dispatch(&request).await {
            Ok(hits) => hits,
            Err(error) => return Ok(self.fail(epoch, error)),
        };

        guard.advance(ExchangePhase::Composing);
        let generation = GenerationRequest {
            query: request.query().to_string(),
            search_results: hits,
            conversation_history: history,
        };
        let reply = match self.generator.chat(&generation).await {
            Ok(reply) => reply,
            Err(e) => {
                let error = QueryError::GenerationUnavailable {
                    reason: format!("{:#}", e),
                };
                return Ok(self.fail(epoch, error));
            }
        };

        let turn = reply.into_turn();
        if !self.append_if_current(epoch, &turn) {
            return Ok(ExchangeOutcome::Discarded);
        }
        info!(sources = turn.sources().len(), "Exchange completed");
        Ok(ExchangeOutcome::Completed(turn))
    }

    fn fail(&self, epoch: u64, error: QueryError) -> ExchangeOutcome {
        warn!(error = %error, "Exchange failed; recording fallback answer");
        let turn = Turn::assistant(
            GeneratedText::new(UNAVAILABLE_FALLBACK.to_string()),
            Vec::new(),
        );
        if !self.append_if_current(epoch, &turn) {
            return ExchangeOutcome::Discarded;
        }
        ExchangeOutcome::Failed { error, turn }
    }

    /// Append `turn` unless the conversation was reset since `epoch`.
    fn append_if_current(&self, epoch: u64, turn: &Turn) -> bool {
        let mut conversation = lock(&self.conversation);
        if conversation.epoch() != epoch {
            debug!(
                error = %QueryError::StaleResponseDiscarded,
                started = epoch,
                current = conversation.epoch(),
                "Dropping response"
            );
            return false;
        }
        conversation.append(turn.clone());
        true
    }
}
