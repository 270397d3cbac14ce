//! HTML emitter for the restricted block tree.
//!
//! Only these tags are ever produced: `h1`-`h6`, `p`, `strong`, `em`,
//! `code`, `ul`, `ol`, `li`, `blockquote`, `hr`. Text is always escaped.

use super::{Block, Inline};

/// Escape the five HTML-significant characters.
pub(super) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(super) fn blocks(blocks: &[Block]) -> String {
    blocks.iter().map(block).collect::<Vec<_>>().join("\n")
}

fn block(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            format!("<h{level}>{}</h{level}>", inlines(content))
        }
        Block::Paragraph(content) => format!("<p>{}</p>", inlines(content)),
        Block::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let items: String = items
                .iter()
                .map(|item| format!("<li>{}</li>", inlines(item)))
                .collect();
            format!("<{tag}>{items}</{tag}>")
        }
        Block::BlockQuote(inner) => format!("<blockquote>{}</blockquote>", blocks(inner)),
        Block::Rule => "<hr>".to_string(),
    }
}

fn inlines(nodes: &[Inline]) -> String {
    nodes
        .iter()
        .map(|node| match node {
            Inline::Text(text) => escape(text),
            Inline::Strong(inner) => format!("<strong>{}</strong>", inlines(inner)),
            Inline::Emphasis(inner) => format!("<em>{}</em>", inlines(inner)),
            Inline::Code(code) => format!("<code>{}</code>", escape(code)),
        })
        .collect()
}
