//! Terminal rendering of display trees.
//!
//! Trusted service markup goes through `html2text`. Generated answers are
//! drawn from their typed block tree, so only the restricted node kinds can
//! reach the terminal. Plain text is printed as-is.

use docchat_core::render::{inline_text, render_trusted, render_turn, Block, Inline};
use docchat_core::{DisplayTree, TrustedMarkup, Turn};

/// Column width used for trusted markup.
pub const TEXT_WIDTH: usize = 100;

pub fn render_text(tree: &DisplayTree, width: usize) -> String {
    match tree {
        DisplayTree::Plain(text) => text.clone(),
        DisplayTree::Trusted(markup) => html_to_text(markup, width),
        DisplayTree::Document(blocks) => blocks_text(blocks),
    }
}

/// Shorthand for trusted markup fields of a search hit.
pub fn trusted_text(markup: &TrustedMarkup) -> String {
    render_text(&render_trusted(markup), TEXT_WIDTH)
}

pub fn turn_text(turn: &Turn) -> String {
    render_text(&render_turn(turn), TEXT_WIDTH)
}

fn html_to_text(markup: &TrustedMarkup, width: usize) -> String {
    html2text::from_read(markup.as_str().as_bytes(), width)
        .map(|text| text.trim_end().to_string())
        .unwrap_or_else(|_| markup.as_str().to_string())
}

fn blocks_text(blocks: &[Block]) -> String {
    blocks.iter().map(block_text).collect::<Vec<_>>().join("\n\n")
}

fn block_text(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => {
            let title = inlines_text(content);
            match *level {
                1 => format!("{}\n{}", title, "=".repeat(title.chars().count())),
                2 => format!("{}\n{}", title, "-".repeat(title.chars().count())),
                _ => title,
            }
        }
        Block::Paragraph(content) => match content.as_slice() {
            [Inline::Code(code)] if code.contains('\n') => indent(code, "    "),
            _ => inlines_text(content),
        },
        Block::List { ordered, items } => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let marker = if *ordered {
                    format!("{}.", i + 1)
                } else {
                    "•".to_string()
                };
                format!("  {} {}", marker, inlines_text(item))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::BlockQuote(inner) => indent(&blocks_text(inner), "│ "),
        Block::Rule => "─".repeat(40),
    }
}

fn inlines_text(inlines: &[Inline]) -> String {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Code(code) => format!("`{}`", code),
            Inline::Strong(inner) => inline_text(inner).to_uppercase(),
            other => inline_text(std::slice::from_ref(other)),
        })
        .collect()
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}
