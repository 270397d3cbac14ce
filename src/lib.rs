//! # docchat
//!
//! Command-line client for a document search and chat service.
//!
//! The service ranks documents with one of four algorithms (semantic,
//! BM25, TF-IDF, hybrid) and answers questions from the top hits. docchat
//! manages the search scope, sequences the retrieve-then-synthesize
//! exchange, keeps the conversation, and renders service markup and
//! generated answers on separate trust paths. The runtime-agnostic parts
//! live in the `docchat-core` crate.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │   CLI / REPL │──▶│     Session      │──▶│ HttpServiceClient│──▶ /search
//! │  (docchat)   │   │ selector+filters │   │     (reqwest)    │──▶ /ai-chat
//! └──────────────┘   │ dispatcher       │   └──────────────────┘──▶ /get_files
//!        ▲           │ composer         │
//!        │           └──────────────────┘
//!        └──── display (trusted / generated / plain)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docchat files
//! docchat search "vector space model" --algorithm bm25
//! docchat ask "What is information retrieval?" --filter ProjectA
//! docchat chat
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`client`] | reqwest client for the remote service |
//! | [`session`] | Per-user scope, dispatcher, and composer |
//! | [`display`] | Terminal rendering of display trees |
//! | [`search`] | `search` command |
//! | [`chat`] | `ask` and `chat` commands |
//! | [`files`] | `files`, `reload`, `upload`, `download` commands |

pub mod chat;
pub mod client;
pub mod config;
pub mod display;
pub mod files;
pub mod search;
pub mod session;
