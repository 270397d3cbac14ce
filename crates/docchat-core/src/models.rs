//! Core data models exchanged with the retrieval and generation services.
//!
//! Every type here serializes to the JSON shape the remote services speak,
//! so the HTTP client can send and receive them without intermediate
//! wire structs.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::AlgorithmId;
use crate::errors::QueryError;
use crate::filters::FilterSet;
use crate::render::{GeneratedText, TrustedMarkup};

/// Shown as the assistant turn when the generation service returns no text.
pub const EMPTY_ANSWER_FALLBACK: &str = "I couldn't generate a response. Please try again.";

/// A validated retrieval request.
///
/// Serializes to the `POST /search` body:
/// `{"query": ..., "search_type": ..., "filter_files": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    query: String,
    #[serde(rename = "search_type")]
    algorithm: AlgorithmId,
    #[serde(rename = "filter_files")]
    filters: FilterSet,
}

impl SearchRequest {
    /// Build a request, trimming the query.
    ///
    /// Returns [`QueryError::EmptyQuery`] if nothing is left after trimming.
    pub fn new(
        query: &str,
        algorithm: AlgorithmId,
        filters: FilterSet,
    ) -> Result<Self, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        Ok(Self {
            query: query.to_string(),
            algorithm,
            filters,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }
}

/// `POST /search` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One ranked document returned by the retrieval service.
///
/// `summary`, `snippet`, and `key_points` are service-sanitized markup and
/// must only be displayed through [`render_trusted`](crate::render::render_trusted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Path of the document relative to the collection root.
    pub filename: String,
    /// Relevance in `[0, 1]`, as ranked by the service.
    pub score: f64,
    #[serde(default)]
    pub summary: TrustedMarkup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<TrustedMarkup>,
    #[serde(default)]
    pub key_points: Vec<TrustedMarkup>,
    #[serde(default)]
    pub images: Vec<HitImage>,
    #[serde(flatten)]
    pub metadata: FileMetadata,
    /// Which algorithm produced this hit.
    #[serde(default)]
    pub method: String,
    #[serde(flatten)]
    pub sub_scores: SubScores,
}

impl SearchHit {
    /// Final path component of [`filename`](Self::filename).
    pub fn display_name(&self) -> &str {
        self.filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.filename)
    }

    /// Folder components joined with ` › `, or `None` for top-level files.
    pub fn folder_path(&self) -> Option<String> {
        let parts: Vec<&str> = self.filename.split(['/', '\\']).collect();
        if parts.len() < 2 {
            return None;
        }
        Some(parts[..parts.len() - 1].join(" › "))
    }
}

/// File metadata attached to a hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Type label, e.g. `PDF` or `TXT`.
    #[serde(default)]
    pub file_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
}

/// Per-algorithm scores, present on hybrid hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tfidf_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bm25_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f64>,
}

impl SubScores {
    pub fn is_empty(&self) -> bool {
        self.tfidf_score.is_none() && self.bm25_score.is_none() && self.semantic_score.is_none()
    }
}

/// An image extracted from a document.
///
/// The service sends either a bare base64 string (PNG) or an object with a
/// `data` field, which may be a `data:` URI, and an optional page number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HitImage {
    Bare(String),
    Paged {
        data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page: Option<u32>,
    },
}

impl HitImage {
    fn raw(&self) -> &str {
        match self {
            HitImage::Bare(data) => data,
            HitImage::Paged { data, .. } => data,
        }
    }

    pub fn page(&self) -> Option<u32> {
        match self {
            HitImage::Bare(_) => None,
            HitImage::Paged { page, .. } => *page,
        }
    }

    /// MIME type from the `data:` URI header, defaulting to `image/png`.
    pub fn mime_type(&self) -> &str {
        self.raw()
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .filter(|mime| !mime.is_empty())
            .unwrap_or("image/png")
    }

    /// File extension matching [`mime_type`](Self::mime_type).
    pub fn extension(&self) -> &str {
        match self.mime_type() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            _ => "png",
        }
    }

    /// Decode the image bytes, stripping any `data:` URI header.
    pub fn decode(&self) -> anyhow::Result<Vec<u8>> {
        let raw = self.raw();
        let payload = match raw.strip_prefix("data:") {
            Some(rest) => rest
                .split_once(',')
                .map(|(_, body)| body)
                .ok_or_else(|| anyhow::anyhow!("Malformed data URI: missing ','"))?,
            None => raw,
        };
        let bytes = STANDARD.decode(payload.trim())?;
        Ok(bytes)
    }
}

/// The enumerable search scope: known folders and files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDomain {
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

impl FileDomain {
    /// True if `token` names a known folder or file.
    pub fn contains(&self, token: &str) -> bool {
        self.folders.iter().any(|f| f == token) || self.files.iter().any(|f| f == token)
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One immutable message in a conversation.
///
/// User content is plain text. Assistant content is generated markdown and
/// is only reachable as [`GeneratedText`], so it cannot be handed to the
/// trusted render path by accident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sources: Vec<String>,
    #[serde(rename = "timestamp")]
    created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Build an assistant turn. `sources` is deduplicated, keeping first occurrences.
    pub fn assistant(text: GeneratedText, sources: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into_inner(),
            sources: dedup_sources(sources),
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Raw content, as sent back to the generation service for context.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Assistant content as generated text; `None` for user turns.
    pub fn generated(&self) -> Option<GeneratedText> {
        match self.role {
            Role::Assistant => Some(GeneratedText::new(self.content.clone())),
            Role::User => None,
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// `POST /ai-chat` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub query: String,
    pub search_results: Vec<SearchHit>,
    pub conversation_history: Vec<Turn>,
}

/// `POST /ai-chat` response body. Both fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

impl ChatReply {
    /// Convert into an assistant turn.
    ///
    /// A missing or blank `response` becomes [`EMPTY_ANSWER_FALLBACK`]; missing
    /// `sources` become an empty list. Sources outside the dispatched hits are
    /// kept as given.
    pub fn into_turn(self) -> Turn {
        let text = self
            .response
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| EMPTY_ANSWER_FALLBACK.to_string());
        Turn::assistant(GeneratedText::new(text), self.sources.unwrap_or_default())
    }
}

/// Remove duplicate names, keeping the first occurrence of each.
pub fn dedup_sources<I>(sources: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
