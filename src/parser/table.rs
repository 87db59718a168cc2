//! Pipe tables: a header row, an alignment separator, then body rows.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::block::{Alignment, Block, Span};
use crate::inline::parse_inline;

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|(?:\s*:?-+:?\s*\|)+$").unwrap());

pub(crate) fn is_table_row(trimmed: &str) -> bool {
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

fn is_separator_row(trimmed: &str) -> bool {
    SEPARATOR_RE.is_match(trimmed)
}

/// A table needs a pipe row immediately followed by a separator row.
pub(crate) fn starts_table(lines: &[&str], i: usize) -> bool {
    is_table_row(lines[i].trim())
        && lines
            .get(i + 1)
            .is_some_and(|next| is_separator_row(next.trim()))
}

pub(crate) fn parse_table(lines: &[&str], start: usize) -> (Block, usize) {
    let headers = parse_row(lines[start].trim());
    let alignments = split_cells(lines[start + 1].trim())
        .iter()
        .map(|cell| parse_alignment(cell))
        .collect();

    let mut rows = Vec::new();
    let mut i = start + 2;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if !is_table_row(trimmed) {
            break;
        }
        let row = parse_row(trimmed);
        if row.len() != headers.len() {
            debug!(
                line = i,
                expected = headers.len(),
                found = row.len(),
                "ragged table row"
            );
        }
        rows.push(row);
        i += 1;
    }

    let table = Block::Table {
        alignments,
        headers,
        rows,
    };
    (table, i)
}

fn parse_row(trimmed: &str) -> Vec<Vec<Span>> {
    split_cells(trimmed)
        .iter()
        .map(|cell| parse_inline(cell))
        .collect()
}

/// Split a row on unescaped pipes. `\|` is a literal pipe inside a cell.
fn split_cells(trimmed: &str) -> Vec<String> {
    let inner = &trimmed[1..trimmed.len() - 1];
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                chars.next();
                cell.push('|');
            }
            '|' => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    cells.push(cell);

    cells
        .into_iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn parse_alignment(cell: &str) -> Alignment {
    match (cell.starts_with(':'), cell.ends_with(':')) {
        (true, true) if cell.len() > 1 => Alignment::Center,
        (_, true) => Alignment::Right,
        (true, _) => Alignment::Left,
        _ => Alignment::None,
    }
}
