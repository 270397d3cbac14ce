//! Render pipeline: two disjoint trust paths.
//!
//! | Content | Wrapper | Path |
//! |---------|---------|------|
//! | Hit summaries, snippets, key points | [`TrustedMarkup`] | [`render_trusted`] |
//! | Assistant answers | [`GeneratedText`] | [`render_generated`] |
//! | User input | `&str` | [`render_plain`] |
//!
//! The wrappers make the paths impossible to mix up at compile time:
//! `render_trusted` only accepts markup that came from the retrieval
//! service, and `render_generated` only accepts text produced by the
//! generation service. No function renders an arbitrary string as markup.
//!
//! Generated text is parsed into a fixed block tree ([`Block`] / [`Inline`])
//! covering headings, paragraphs, emphasis, lists, code spans, block quotes
//! and horizontal rules. Anything else, raw HTML included, stays literal
//! text. [`DisplayTree::to_html`] emits markup from that tree with every
//! text node escaped.

mod html;
mod markdown;

use serde::{Deserialize, Serialize};

use crate::models::{Role, Turn};

/// Markup sanitized upstream by the retrieval service.
///
/// Deserialized directly from service responses; there is no way to build
/// one from generated or user text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustedMarkup(String);

impl TrustedMarkup {
    /// Wrap markup received from the retrieval service.
    pub fn from_service(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Untrusted markdown produced by the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText(String);

impl GeneratedText {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Block-level node of a rendered answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    List { ordered: bool, items: Vec<Vec<Inline>> },
    BlockQuote(Vec<Block>),
    Rule,
}

/// Inline node of a rendered answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Code(String),
}

/// Output of the render pipeline, tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayTree {
    /// Escaped on output.
    Plain(String),
    /// Service markup, emitted as-is.
    Trusted(TrustedMarkup),
    /// Restricted markdown document.
    Document(Vec<Block>),
}

impl DisplayTree {
    /// Serialize to HTML.
    pub fn to_html(&self) -> String {
        match self {
            DisplayTree::Plain(text) => html::escape(text),
            DisplayTree::Trusted(markup) => markup.as_str().to_string(),
            DisplayTree::Document(blocks) => html::blocks(blocks),
        }
    }
}

/// Render service-sanitized markup. May contain embedded tags.
pub fn render_trusted(markup: &TrustedMarkup) -> DisplayTree {
    DisplayTree::Trusted(markup.clone())
}

/// Render generated text through the restricted markdown transformer.
pub fn render_generated(text: &GeneratedText) -> DisplayTree {
    DisplayTree::Document(markdown::parse(text.as_str()))
}

/// Render text with no markup interpretation at all.
pub fn render_plain(text: &str) -> DisplayTree {
    DisplayTree::Plain(text.to_string())
}

/// Render a conversation turn on the path matching its role.
pub fn render_turn(turn: &Turn) -> DisplayTree {
    match (turn.role(), turn.generated()) {
        (Role::Assistant, Some(text)) => render_generated(&text),
        _ => render_plain(turn.content()),
    }
}

/// Flatten inline nodes to their text, dropping emphasis.
pub fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Strong(inner) | Inline::Emphasis(inner) => out.push_str(&inline_text(inner)),
        }
    }
    out
}
