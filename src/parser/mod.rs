//! Line-oriented block parsing.
//!
//! The input is trimmed and split into lines, then scanned with a cursor.
//! Each position is classified by the first matching construct in a fixed
//! priority order: heading, rule, table, blockquote, fenced code, `$` shell
//! line, list, blank, paragraph. Lists, tables and blockquotes have their
//! own builders that report the next unconsumed line.

mod blockquote;
mod list;
mod table;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::block::Block;
use crate::inline::parse_inline;

/// Language given to fences without a tag and to `$` command lines.
pub const DEFAULT_LANGUAGE: &str = "bash";

/// Deepest heading level the tree carries; longer marker runs are clamped.
pub const MAX_HEADING_LEVEL: usize = 6;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#+)\s+(.*)$").unwrap());

/// Parse guide text into a list of blocks
pub fn parse(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.trim().lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();

        if let Some(heading) = parse_heading(trimmed) {
            trace!(line = i, "heading");
            blocks.push(heading);
            i += 1;
        } else if is_rule(trimmed) {
            trace!(line = i, "rule");
            blocks.push(Block::Rule);
            i += 1;
        } else if table::starts_table(&lines, i) {
            trace!(line = i, "table");
            let (table, next) = table::parse_table(&lines, i);
            blocks.push(table);
            i = next;
        } else if trimmed.starts_with('>') {
            trace!(line = i, "blockquote");
            let (quote, next) = blockquote::parse_blockquote(&lines, i);
            blocks.push(quote);
            i = next;
        } else if let Some((fence, info)) = Fence::open(trimmed) {
            trace!(line = i, "fenced code");
            let (code, next) = parse_fenced_code(&lines, i, fence, info);
            blocks.push(code);
            i = next;
        } else if let Some(command) = trimmed.strip_prefix('$') {
            trace!(line = i, "shell command");
            blocks.push(Block::CodeBlock {
                language: DEFAULT_LANGUAGE.to_string(),
                lines: code_lines([command.trim_start()]),
            });
            i += 1;
        } else if list::is_list_item(trimmed) {
            trace!(line = i, "list");
            let (list, next) = list::parse_list(&lines, i);
            blocks.push(Block::List(list));
            i = next;
        } else if trimmed.is_empty() {
            i += 1;
        } else {
            let (paragraph, next) = parse_paragraph(&lines, i);
            blocks.push(paragraph);
            i = next;
        }
    }

    debug!(lines = lines.len(), blocks = blocks.len(), "parsed guide");
    blocks
}

fn parse_heading(trimmed: &str) -> Option<Block> {
    let caps = HEADING_RE.captures(trimmed)?;
    let level = caps[1].len().min(MAX_HEADING_LEVEL) as u8;
    Some(Block::Heading {
        level,
        content: parse_inline(caps[2].trim()),
    })
}

fn is_rule(trimmed: &str) -> bool {
    matches!(trimmed, "---" | "***" | "* * *")
}

/// Lines that end a paragraph because they open some other block.
fn is_special(trimmed: &str) -> bool {
    HEADING_RE.is_match(trimmed)
        || is_rule(trimmed)
        || table::is_table_row(trimmed)
        || trimmed.starts_with('>')
        || Fence::open(trimmed).is_some()
        || trimmed.starts_with('$')
        || list::is_list_item(trimmed)
}

/// Joins the run of ordinary lines starting at `start`. The first line is
/// always taken, so the cursor advances even when it looked special.
fn parse_paragraph(lines: &[&str], start: usize) -> (Block, usize) {
    let mut parts = vec![lines[start].trim()];
    let mut i = start + 1;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed.is_empty() || is_special(trimmed) {
            break;
        }
        parts.push(trimmed);
        i += 1;
    }
    let content = parse_inline(&parts.join(" "));
    (Block::Paragraph { content }, i)
}

/// Opening fence: three or more backticks or tildes.
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// Recognise an opening fence, returning it with its info string.
    fn open(trimmed: &str) -> Option<(Self, &str)> {
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        (len >= 3).then(|| (Self { marker, len }, &trimmed[len..]))
    }

    fn closes(&self, trimmed: &str) -> bool {
        trimmed.chars().take_while(|c| *c == self.marker).count() >= self.len
    }
}

/// Collects verbatim lines up to the closing fence. An unterminated fence
/// runs to the end of the input.
fn parse_fenced_code(lines: &[&str], start: usize, fence: Fence, info: &str) -> (Block, usize) {
    let language = info
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let mut i = start + 1;
    let mut body = Vec::new();
    let mut closed = false;
    while i < lines.len() {
        if fence.closes(lines[i].trim()) {
            closed = true;
            break;
        }
        body.push(lines[i]);
        i += 1;
    }
    if closed {
        i += 1;
    } else {
        debug!(line = start, "unterminated code fence runs to end of input");
    }

    let block = Block::CodeBlock {
        language,
        lines: code_lines(body),
    };
    (block, i)
}

/// Owned code lines with trailing blank lines dropped.
fn code_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut lines: Vec<String> = lines.into_iter().map(str::to_string).collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Callout, List, ListItem, Span};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn text(s: &str) -> Vec<Span> {
        vec![Span::Text(s.to_string())]
    }

    fn code(language: &str, lines: &[&str]) -> Block {
        Block::CodeBlock {
            language: language.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse(""), vec![]);
        assert_eq!(parse("  \n\n \n"), vec![]);
    }

    #[test]
    fn heading() {
        assert_eq!(
            parse("# Title"),
            vec![Block::Heading {
                level: 1,
                content: text("Title"),
            }]
        );
    }

    #[rstest]
    #[case("## Two", 2)]
    #[case("###### Six", 6)]
    #[case("######### Nine", 6)]
    fn heading_level_is_clamped(#[case] input: &str, #[case] level: u8) {
        match &parse(input)[..] {
            [Block::Heading { level: got, .. }] => assert_eq!(*got, level),
            other => panic!("expected one heading, got {other:?}"),
        }
    }

    #[test]
    fn hash_without_space_is_paragraph() {
        assert_eq!(
            parse("#hashtag"),
            vec![Block::Paragraph {
                content: text("#hashtag"),
            }]
        );
    }

    #[rstest]
    #[case("---")]
    #[case("***")]
    #[case("* * *")]
    #[case("  ---  ")]
    fn horizontal_rules(#[case] input: &str) {
        assert_eq!(parse(input), vec![Block::Rule]);
    }

    #[test]
    fn paragraph_lines_are_joined() {
        assert_eq!(
            parse("first line\nsecond *line*\n\nnext"),
            vec![
                Block::Paragraph {
                    content: vec![
                        Span::Text("first line second ".to_string()),
                        Span::Italic(text("line")),
                    ],
                },
                Block::Paragraph {
                    content: text("next"),
                },
            ]
        );
    }

    #[test]
    fn paragraph_stops_at_special_line() {
        assert_eq!(
            parse("intro\n- item"),
            vec![
                Block::Paragraph {
                    content: text("intro"),
                },
                Block::List(List {
                    ordered: false,
                    items: vec![ListItem {
                        content: text("item"),
                        nested: None,
                        checked: None,
                    }],
                }),
            ]
        );
    }

    #[test]
    fn fence_default_language() {
        assert_eq!(parse("```\ncode\n```"), vec![code("bash", &["code"])]);
    }

    #[test]
    fn fence_language_is_lowercased() {
        assert_eq!(
            parse("```Python\nprint('hi')\n\n\n```\nafter"),
            vec![
                code("python", &["print('hi')"]),
                Block::Paragraph {
                    content: text("after"),
                },
            ]
        );
    }

    #[test]
    fn fence_keeps_indentation_verbatim() {
        assert_eq!(
            parse("~~~json\n{\n  \"a\": 1\n}\n~~~"),
            vec![code("json", &["{", "  \"a\": 1", "}"])]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        assert_eq!(
            parse("```sh\nls -la\n# heading?\n- not a list"),
            vec![code("sh", &["ls -la", "# heading?", "- not a list"])]
        );
    }

    #[test]
    fn shell_shorthand() {
        assert_eq!(
            parse("$ nmap -sV 10.0.0.1\n$whoami"),
            vec![
                code("bash", &["nmap -sV 10.0.0.1"]),
                code("bash", &["whoami"]),
            ]
        );
    }

    #[test]
    fn priority_rule_beats_list() {
        assert_eq!(parse("* * *\n* item")[0], Block::Rule);
    }

    #[test]
    fn rule_after_list_items_is_a_rule() {
        assert_eq!(
            parse("- a\n* * *"),
            vec![
                Block::List(List {
                    ordered: false,
                    items: vec![ListItem {
                        content: text("a"),
                        nested: None,
                        checked: None,
                    }],
                }),
                Block::Rule,
            ]
        );
    }

    #[test]
    fn blockquote_after_paragraph() {
        assert_eq!(
            parse("text\n> [!tip] Use it"),
            vec![
                Block::Paragraph {
                    content: text("text"),
                },
                Block::Blockquote {
                    callout: Some(Callout::Tip),
                    paragraphs: vec![text("Use it")],
                },
            ]
        );
    }

    #[test]
    fn pipe_line_without_separator_is_paragraph() {
        assert_eq!(
            parse("| not | a table |"),
            vec![Block::Paragraph {
                content: text("| not | a table |"),
            }]
        );
    }

    #[test]
    fn crlf_input() {
        assert_eq!(
            parse("# T\r\n\r\nbody\r\n"),
            vec![
                Block::Heading {
                    level: 1,
                    content: text("T"),
                },
                Block::Paragraph {
                    content: text("body"),
                },
            ]
        );
    }
}
