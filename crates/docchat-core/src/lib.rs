//! # docchat core
//!
//! Runtime-agnostic logic for docchat: data models, the search scope
//! (algorithm + filter set), the query dispatcher, conversation state with
//! its bounded context window, the augmented answer composer, and the two
//! render trust paths.
//!
//! This crate contains no tokio, reqwest, or filesystem I/O. Remote
//! retrieval and generation are reached through the
//! [`service::RetrievalService`] and [`service::GenerationService`] traits,
//! which the calling application implements.

pub mod algorithm;
pub mod composer;
pub mod conversation;
pub mod dispatch;
pub mod errors;
pub mod filters;
pub mod models;
pub mod render;
pub mod service;

pub use algorithm::{AlgorithmId, AlgorithmSelector};
pub use composer::{AnswerComposer, ExchangeOutcome, ExchangePhase};
pub use conversation::{window, ConversationStore, DEFAULT_CONTEXT_TURNS};
pub use dispatch::QueryDispatcher;
pub use errors::QueryError;
pub use filters::{FilterRegistry, FilterSet};
pub use models::{ChatReply, FileDomain, GenerationRequest, Role, SearchHit, SearchRequest, Turn};
pub use render::{DisplayTree, GeneratedText, TrustedMarkup};
pub use service::{GenerationService, RetrievalService};
