//! Blockquotes and `[!KIND]` callouts.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::block::{Block, Callout, Span};
use crate::inline::parse_inline;

static CALLOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[!([A-Za-z]+)\]\s*").unwrap());

/// Consume the contiguous `>` lines starting at `start`.
pub(crate) fn parse_blockquote(lines: &[&str], start: usize) -> (Block, usize) {
    let mut stripped = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let Some(rest) = lines[i].trim().strip_prefix('>') else {
            break;
        };
        stripped.push(rest.strip_prefix(' ').unwrap_or(rest));
        i += 1;
    }

    let raw = stripped.join("\n");
    let (callout, body) = split_callout(&raw);
    let quote = Block::Blockquote {
        callout,
        paragraphs: split_paragraphs(body),
    };
    (quote, i)
}

/// Strip a leading callout marker. Unknown kinds leave the quote plain with
/// the marker still in its text.
fn split_callout(raw: &str) -> (Option<Callout>, &str) {
    let Some(caps) = CALLOUT_RE.captures(raw) else {
        return (None, raw);
    };
    let (Some(marker), Some(kind)) = (caps.get(0), caps.get(1)) else {
        return (None, raw);
    };
    match Callout::from_marker(kind.as_str()) {
        Some(callout) => (Some(callout), &raw[marker.end()..]),
        None => {
            debug!(kind = kind.as_str(), "unknown callout kind, rendering as plain quote");
            (None, raw)
        }
    }
}

/// Blank lines separate paragraphs; lines within one are joined by a space.
fn split_paragraphs(body: &str) -> Vec<Vec<Span>> {
    let lines: Vec<&str> = body.lines().map(str::trim).collect();
    lines
        .split(|line| line.is_empty())
        .filter(|group| !group.is_empty())
        .map(|group| parse_inline(&group.join(" ")))
        .collect()
}
