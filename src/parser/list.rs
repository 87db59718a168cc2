//! Indentation-keyed list building.

use std::sync::LazyLock;

use regex::Regex;

use crate::block::{List, ListItem};
use crate::inline::parse_inline;
use crate::limits::MAX_LIST_NESTING;

static ORDERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s").unwrap());

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\*|-|\d+\.)\s+").unwrap());

static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\*|-|\d+\.)\s+\[(x| )\]\s+(.*)$").unwrap());

pub(crate) fn is_list_item(trimmed: &str) -> bool {
    trimmed.starts_with("* ") || trimmed.starts_with("- ") || ORDERED_RE.is_match(trimmed)
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Build the list starting at `start`, returning it with the next
/// unconsumed line index.
pub(crate) fn parse_list(lines: &[&str], start: usize) -> (List, usize) {
    parse_level(lines, start, indent_of(lines[start]), 0)
}

fn parse_level(lines: &[&str], start: usize, indent: usize, depth: usize) -> (List, usize) {
    // Ordering is fixed by the first marker for the whole level.
    let ordered = ORDERED_RE.is_match(lines[start].trim());
    let mut items = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();
        if trimmed.is_empty() {
            i += 1;
            continue;
        }
        if super::is_rule(trimmed) || !is_list_item(trimmed) {
            break;
        }

        let current = indent_of(line);
        if current < indent {
            break;
        }
        if current > indent && depth + 1 < MAX_LIST_NESTING {
            let (nested, next) = parse_level(lines, i, current, depth + 1);
            attach(&mut items, nested);
            i = next;
            continue;
        }

        items.push(parse_item(trimmed));
        i += 1;
    }

    (List { ordered, items }, i)
}

/// Hang a finished nested list under the most recent sibling. A second
/// nested run under the same sibling extends the list already there and
/// keeps that list's ordering, as within a single level.
fn attach(items: &mut Vec<ListItem>, nested: List) {
    match items.last_mut() {
        Some(parent) => match &mut parent.nested {
            Some(existing) => existing.items.extend(nested.items),
            None => parent.nested = Some(Box::new(nested)),
        },
        None => items.extend(nested.items),
    }
}

fn parse_item(trimmed: &str) -> ListItem {
    if let Some(caps) = TASK_RE.captures(trimmed) {
        return ListItem {
            content: parse_inline(&caps[2]),
            nested: None,
            checked: Some(caps[1].eq_ignore_ascii_case("x")),
        };
    }

    let text = MARKER_RE
        .find(trimmed)
        .map_or(trimmed, |marker| &trimmed[marker.end()..]);
    ListItem {
        content: parse_inline(text),
        nested: None,
        checked: None,
    }
}
