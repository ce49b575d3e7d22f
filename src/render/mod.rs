//! Result formatting.
//!
//! The model answers in a small Markdown subset. [`render`] turns that text into a
//! sequence of [`DisplayBlock`]s, one per input line and in the same order:
//!
//! | Line                       | Block                          |
//! |----------------------------|--------------------------------|
//! | `### text`                 | `Heading { level: 3 }`         |
//! | `## text`                  | `Heading { level: 2 }`         |
//! | `# text`                   | `Heading { level: 1 }`         |
//! | `- text` (after indent)    | `ListItem`                     |
//! | `12. text` (after indent)  | `NumberedItem`, prefix kept    |
//! | blank                      | `Spacer`                       |
//! | anything else              | `Paragraph`                    |
//!
//! Inside list items, numbered items and paragraphs, `**bold**` spans are recognised.
//! Tables, links and code blocks are not.

pub mod terminal;

use regex::Regex;
use std::sync::LazyLock;

static BOLD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*.*?\*\*").expect("bold pattern is a valid regex"));

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSpan {
    Plain(String),
    Bold(String),
}

impl InlineSpan {
    pub fn text(&self) -> &str {
        match self {
            InlineSpan::Plain(t) | InlineSpan::Bold(t) => t,
        }
    }
}

/// One structural unit of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayBlock {
    Heading { level: u8, spans: Vec<InlineSpan> },
    ListItem(Vec<InlineSpan>),
    NumberedItem(Vec<InlineSpan>),
    Spacer,
    Paragraph(Vec<InlineSpan>),
}

impl DisplayBlock {
    pub fn spans(&self) -> &[InlineSpan] {
        match self {
            DisplayBlock::Heading { spans, .. }
            | DisplayBlock::ListItem(spans)
            | DisplayBlock::NumberedItem(spans)
            | DisplayBlock::Paragraph(spans) => spans.as_slice(),
            DisplayBlock::Spacer => &[],
        }
    }

    /// Visible text of the block, without markup.
    pub fn plain_text(&self) -> String {
        self.spans().iter().map(InlineSpan::text).collect()
    }
}

/// Split model output into display blocks.
pub fn render(text: &str) -> Vec<DisplayBlock> {
    text.split('\n')
        .map(|line| render_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

fn render_line(line: &str) -> DisplayBlock {
    if let Some(rest) = line.strip_prefix("### ") {
        return heading(3, rest);
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return heading(2, rest);
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return heading(1, rest);
    }

    let trimmed = line.trim_start();
    if line.trim().starts_with("- ") {
        return DisplayBlock::ListItem(parse_inline(&trimmed[2..]));
    }
    if starts_with_number(trimmed) {
        return DisplayBlock::NumberedItem(parse_inline(trimmed));
    }
    if trimmed.is_empty() {
        return DisplayBlock::Spacer;
    }

    DisplayBlock::Paragraph(parse_inline(line))
}

fn heading(level: u8, text: &str) -> DisplayBlock {
    DisplayBlock::Heading {
        level,
        spans: vec![InlineSpan::Plain(text.to_string())],
    }
}

// `<digits>.` at the start of the line
fn starts_with_number(line: &str) -> bool {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && line.as_bytes().get(digits) == Some(&b'.')
}

/// Split text on paired `**...**` delimiters.
///
/// Unpaired asterisks stay in the plain text as they are.
pub fn parse_inline(text: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut last = 0;

    for found in BOLD_PATTERN.find_iter(text) {
        if found.start() > last {
            spans.push(InlineSpan::Plain(text[last..found.start()].to_string()));
        }
        let inner = &found.as_str()[2..found.as_str().len() - 2];
        spans.push(InlineSpan::Bold(inner.to_string()));
        last = found.end();
    }

    if last < text.len() {
        spans.push(InlineSpan::Plain(text[last..].to_string()));
    }

    spans
}
