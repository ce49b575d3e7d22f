//! Terminal display of rendered blocks.

use super::{DisplayBlock, InlineSpan};
use crossterm::style::Stylize;

const BULLET: &str = "  • ";
const INDENT: &str = "  ";

/// Blocks styled with ANSI escapes for an interactive terminal.
pub fn to_terminal_string(blocks: &[DisplayBlock]) -> String {
    write_blocks(blocks, true)
}

/// Blocks as uncoloured text, for pipes and `NO_COLOR`.
pub fn to_plain_string(blocks: &[DisplayBlock]) -> String {
    write_blocks(blocks, false)
}

fn write_blocks(blocks: &[DisplayBlock], styled: bool) -> String {
    let mut out = String::new();
    for block in blocks {
        write_block(&mut out, block, styled);
        out.push('\n');
    }
    out
}

fn write_block(out: &mut String, block: &DisplayBlock, styled: bool) {
    match block {
        DisplayBlock::Heading { level, .. } => {
            let text = block.plain_text();
            if styled {
                let heading = match level {
                    1 => text.clone().bold().underlined().to_string(),
                    2 => text.clone().bold().cyan().to_string(),
                    _ => text.clone().bold().blue().to_string(),
                };
                out.push_str(&heading);
            } else {
                out.push_str(&text);
                let rule = match level {
                    1 => Some('='),
                    2 => Some('-'),
                    _ => None,
                };
                if let Some(rule) = rule {
                    out.push('\n');
                    out.extend(std::iter::repeat(rule).take(text.chars().count()));
                }
            }
        }
        DisplayBlock::ListItem(spans) => {
            out.push_str(BULLET);
            write_spans(out, spans, styled);
        }
        DisplayBlock::NumberedItem(spans) => {
            out.push_str(INDENT);
            write_spans(out, spans, styled);
        }
        DisplayBlock::Spacer => {}
        DisplayBlock::Paragraph(spans) => write_spans(out, spans, styled),
    }
}

fn write_spans(out: &mut String, spans: &[InlineSpan], styled: bool) {
    for span in spans {
        match span {
            InlineSpan::Bold(text) if styled => out.push_str(&text.clone().bold().to_string()),
            _ => out.push_str(span.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;

    #[test]
    fn test_plain_output() {
        let blocks = render("## Result\n- **R1** = 10Ω\n\n1. Compute I\nDone");
        let text = to_plain_string(&blocks);

        assert_eq!(
            text,
            "Result\n------\n  • R1 = 10Ω\n\n  1. Compute I\nDone\n"
        );
    }

    #[test]
    fn test_plain_h1_and_h3() {
        let text = to_plain_string(&render("# Ohm\n### Step"));
        assert_eq!(text, "Ohm\n===\nStep\n");
    }

    #[test]
    fn test_plain_keeps_unmatched_asterisks() {
        let text = to_plain_string(&render("a * b"));
        assert_eq!(text, "a * b\n");
    }

    #[test]
    fn test_styled_output_contains_text() {
        let blocks = render("### Step 1\n**I = 2 A**");
        let text = to_terminal_string(&blocks);

        assert!(text.contains("Step 1"));
        assert!(text.contains("I = 2 A"));
        assert!(!text.contains("**"));
    }

    #[test]
    fn test_empty_blocks() {
        assert_eq!(to_plain_string(&[]), "");
    }
}
