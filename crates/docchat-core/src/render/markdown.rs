//! Restricted markdown parser for generated answers.
//!
//! Line-based block pass followed by an inline scanner. Only the node kinds
//! in [`Block`] and [`Inline`] can come out; links, images, tables and raw
//! HTML are kept as literal text.

use std::sync::OnceLock;

use regex::Regex;

use super::{Block, Inline};

/// Quote levels past this are kept as paragraph text.
const MAX_QUOTE_DEPTH: usize = 16;
/// Emphasis nesting past this leaves delimiters literal.
const MAX_INLINE_DEPTH: usize = 16;

struct Patterns {
    heading: Regex,
    rule: Regex,
    quote: Regex,
    bullet: Regex,
    ordered: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        heading: Regex::new(r"^\s{0,3}(#{1,6})\s+(.+)$").expect("Invalid regex"),
        rule: Regex::new(r"^\s{0,3}(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$")
            .expect("Invalid regex"),
        quote: Regex::new(r"^\s*>\s?(.*)$").expect("Invalid regex"),
        bullet: Regex::new(r"^\s*[-*+•]\s+(.*)$").expect("Invalid regex"),
        ordered: Regex::new(r"^\s*\d+[.)]\s+(.*)$").expect("Invalid regex"),
    })
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Which list a line opens, with the item text.
fn list_item<'a>(line: &'a str) -> Option<(bool, &'a str)> {
    let p = patterns();
    if let Some(cap) = p.ordered.captures(line) {
        return cap.get(1).map(|m| (true, m.as_str()));
    }
    if let Some(cap) = p.bullet.captures(line) {
        return cap.get(1).map(|m| (false, m.as_str()));
    }
    None
}

/// Parse `text` into blocks.
pub(super) fn parse(text: &str) -> Vec<Block> {
    parse_blocks(text, 0)
}

fn parse_blocks(text: &str, depth: usize) -> Vec<Block> {
    let p = patterns();
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            i += 1;
            continue;
        }

        if is_fence(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut code = Vec::new();
            i += 1;
            while i < lines.len() && !is_fence(lines[i]) {
                code.push(lines[i]);
                i += 1;
            }
            // Skip the closing fence; an unclosed fence runs to the end.
            i += 1;
            blocks.push(Block::Paragraph(vec![Inline::Code(code.join("\n"))]));
            continue;
        }

        if let Some(cap) = p.heading.captures(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let level = cap[1].len() as u8;
            let title = cap[2].trim().trim_end_matches('#').trim_end();
            blocks.push(Block::Heading {
                level,
                content: parse_inlines(title),
            });
            i += 1;
            continue;
        }

        if p.rule.is_match(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Rule);
            i += 1;
            continue;
        }

        if depth < MAX_QUOTE_DEPTH && p.quote.is_match(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut quoted = Vec::new();
            while i < lines.len() {
                match p.quote.captures(lines[i]) {
                    Some(cap) => quoted.push(cap.get(1).map_or("", |m| m.as_str())),
                    None => break,
                }
                i += 1;
            }
            blocks.push(Block::BlockQuote(parse_blocks(&quoted.join("\n"), depth + 1)));
            continue;
        }

        if let Some((ordered, first)) = list_item(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut items = vec![first.trim().to_string()];
            i += 1;
            while i < lines.len() {
                let next = lines[i];
                if let Some((kind, text)) = list_item(next) {
                    if kind != ordered || p.rule.is_match(next) {
                        break;
                    }
                    items.push(text.trim().to_string());
                    i += 1;
                } else if next.trim().is_empty() {
                    // A blank line only continues the list if another item follows.
                    let resumes = lines[i + 1..]
                        .iter()
                        .find(|l| !l.trim().is_empty())
                        .and_then(|l| list_item(l))
                        .is_some_and(|(kind, _)| kind == ordered);
                    if !resumes {
                        break;
                    }
                    i += 1;
                } else if next.starts_with(char::is_whitespace) {
                    if let Some(last) = items.last_mut() {
                        last.push(' ');
                        last.push_str(next.trim());
                    }
                    i += 1;
                } else {
                    break;
                }
            }
            blocks.push(Block::List {
                ordered,
                items: items.iter().map(|item| parse_inlines(item)).collect(),
            });
            continue;
        }

        paragraph.push(line.trim());
        i += 1;
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    blocks.push(Block::Paragraph(parse_inlines(&lines.join(" "))));
    lines.clear();
}

/// Scan inline markup: code spans, strong, emphasis, backslash escapes.
pub(super) fn parse_inlines(text: &str) -> Vec<Inline> {
    inlines(text, 0)
}

fn inlines(text: &str, depth: usize) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if chars.get(i + 1).is_some_and(|n| n.is_ascii_punctuation()) => {
                buf.push(chars[i + 1]);
                i += 2;
                continue;
            }
            '`' => {
                if let Some(end) = find_from(&chars, i + 1, |ch| ch == '`') {
                    flush_text(&mut buf, &mut out);
                    out.push(Inline::Code(chars[i + 1..end].iter().collect()));
                    i = end + 1;
                    continue;
                }
            }
            '*' | '_' => {
                let intraword = c == '_' && i > 0 && chars[i - 1].is_alphanumeric();
                if !intraword && depth < MAX_INLINE_DEPTH {
                    let run = chars[i..].iter().take_while(|&&ch| ch == c).count();
                    let width = match run {
                        1 => 1,
                        3 => 3,
                        _ => 2,
                    };
                    let start = i + width;
                    if let Some(end) = closing_delimiter(&chars, start, c, width) {
                        flush_text(&mut buf, &mut out);
                        let inner: String = chars[start..end].iter().collect();
                        let inner = inlines(&inner, depth + 1);
                        out.push(match width {
                            1 => Inline::Emphasis(inner),
                            2 => Inline::Strong(inner),
                            _ => Inline::Strong(vec![Inline::Emphasis(inner)]),
                        });
                        i = end + width;
                        continue;
                    }
                }
            }
            _ => {}
        }
        buf.push(c);
        i += 1;
    }

    flush_text(&mut buf, &mut out);
    out
}

fn flush_text(buf: &mut String, out: &mut Vec<Inline>) {
    if !buf.is_empty() {
        out.push(Inline::Text(std::mem::take(buf)));
    }
}

fn find_from(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> Option<usize> {
    chars
        .get(start..)?
        .iter()
        .position(|&ch| pred(ch))
        .map(|offset| start + offset)
}

/// Index of the delimiter run closing an emphasis opened just before `start`.
fn closing_delimiter(chars: &[char], start: usize, delim: char, width: usize) -> Option<usize> {
    let first = *chars.get(start)?;
    if first.is_whitespace() || first == delim {
        return None;
    }
    let mut j = start + 1;
    while j + width <= chars.len() {
        if chars[j] == '`' {
            // Delimiters inside a code span do not close anything.
            j = find_from(chars, j + 1, |ch| ch == '`')? + 1;
            continue;
        }
        let run = chars[j..].iter().take_while(|&&ch| ch == delim).count();
        if run == 0 {
            j += 1;
            continue;
        }
        let after = chars.get(j + run).copied();
        let closes = !chars[j - 1].is_whitespace()
            && !(delim == '_' && after.is_some_and(char::is_alphanumeric));
        if closes && (run == width || (width == 2 && run == 3)) {
            return Some(if run == 3 && width == 2 { j + 1 } else { j });
        }
        j += run;
    }
    None
}
