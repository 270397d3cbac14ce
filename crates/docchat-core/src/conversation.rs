//! Conversation log and the bounded context window over it.

use tracing::debug;

use crate::models::Turn;

/// Number of prior turns sent to the generation service by default.
pub const DEFAULT_CONTEXT_TURNS: usize = 5;

/// The most recent `k` turns of `turns`, oldest first.
///
/// Returns every turn when there are fewer than `k`; never pads.
pub fn window(turns: &[Turn], k: usize) -> &[Turn] {
    &turns[turns.len().saturating_sub(k)..]
}

/// Append-only ordered log of turns with an atomic full reset.
///
/// Every [`clear`](Self::clear) bumps the epoch, so an exchange that started
/// before the reset can tell that its response is stale.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: Vec<Turn>,
    epoch: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Read-only view of all turns, oldest first.
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    /// See [`window`].
    pub fn window(&self, k: usize) -> &[Turn] {
        window(&self.turns, k)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn and start a new epoch.
    pub fn clear(&mut self) {
        debug!(dropped = self.turns.len(), epoch = self.epoch, "Clearing conversation");
        self.turns.clear();
        self.epoch += 1;
    }

    /// Counter incremented by every reset.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
