//! Inline span parsing.
//!
//! A single left-to-right pass per nesting level. At each position the
//! openers are tried most specific first: image, link, code, bold,
//! strikethrough, italic. Captured text is parsed again one level deeper,
//! except code and image alt text which stay literal.

use crate::block::Span;
use crate::limits::MAX_INLINE_NESTING;

/// Parse a run of text into inline spans.
pub fn parse_inline(text: &str) -> Vec<Span> {
    parse_at_depth(text, 0)
}

fn parse_at_depth(text: &str, depth: usize) -> Vec<Span> {
    if text.is_empty() {
        return Vec::new();
    }
    if depth >= MAX_INLINE_NESTING {
        return vec![Span::Text(text.to_string())];
    }
    InlineScanner::new(text, depth).run()
}

/// Delimiter kinds with no closer left past the current position.
///
/// Closer searches only ever move forward, so once one fails every later
/// opener of the same kind would fail too.
#[derive(Default)]
struct Exhausted {
    target: bool,
    code: bool,
    bold: bool,
    strike: bool,
    italic: bool,
}

/// End offset of a matched span and the node it produced (none when empty).
type Matched = (usize, Option<Span>);

struct InlineScanner<'a> {
    text: &'a str,
    depth: usize,
    spans: Vec<Span>,
    text_start: usize,
    exhausted: Exhausted,
}

impl<'a> InlineScanner<'a> {
    fn new(text: &'a str, depth: usize) -> Self {
        Self {
            text,
            depth,
            spans: Vec::new(),
            text_start: 0,
            exhausted: Exhausted::default(),
        }
    }

    fn run(mut self) -> Vec<Span> {
        let len = self.text.len();
        let mut pos = 0;
        while pos < len {
            match self.match_at(pos) {
                Some((end, span)) => {
                    self.flush_text(pos);
                    if let Some(span) = span {
                        self.spans.push(span);
                    }
                    self.text_start = end;
                    pos = end;
                }
                // Delimiters are ASCII, so stepping through the middle of a
                // multi-byte character never produces a false match.
                None => pos += 1,
            }
        }
        self.flush_text(len);
        self.spans
    }

    fn flush_text(&mut self, upto: usize) {
        if self.text_start >= upto {
            return;
        }
        let text = &self.text[self.text_start..upto];
        match self.spans.last_mut() {
            Some(Span::Text(prev)) => prev.push_str(text),
            _ => self.spans.push(Span::Text(text.to_string())),
        }
        self.text_start = upto;
    }

    fn match_at(&mut self, pos: usize) -> Option<Matched> {
        let bytes = self.text.as_bytes();
        match bytes[pos] {
            b'!' if bytes.get(pos + 1) == Some(&b'[') => self.image(pos),
            b'[' => self.link(pos),
            b'`' => self.code(pos),
            b'*' => {
                let opener = star_run(bytes, pos);
                if opener >= 2 {
                    // A `**` that cannot open leaves its first star as text.
                    return self.bold(pos, opener);
                }
                self.italic(pos)
            }
            b'~' if bytes.get(pos + 1) == Some(&b'~') => self.strikethrough(pos),
            _ => None,
        }
    }

    fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        self.text.get(from..)?.find(needle).map(|i| from + i)
    }

    /// Parse captured text one level down; empty captures give no node.
    fn nested(&self, inner: &str) -> Option<Vec<Span>> {
        let spans = parse_at_depth(inner, self.depth + 1);
        (!spans.is_empty()).then_some(spans)
    }

    /// Locate `](url)` after a bracket label: (label end, url start, url end).
    fn link_target(&mut self, label_start: usize) -> Option<(usize, usize, usize)> {
        if self.exhausted.target {
            return None;
        }
        let found = self.find_from(label_start, "](").and_then(|label_end| {
            let url_start = label_end + 2;
            self.find_from(url_start, ")")
                .map(|url_end| (label_end, url_start, url_end))
        });
        if found.is_none() {
            self.exhausted.target = true;
        }
        found
    }

    fn image(&mut self, pos: usize) -> Option<Matched> {
        let label_start = pos + 2;
        let (label_end, url_start, url_end) = self.link_target(label_start)?;
        let span = Span::Image {
            alt: self.text[label_start..label_end].to_string(),
            url: self.text[url_start..url_end].to_string(),
        };
        Some((url_end + 1, Some(span)))
    }

    fn link(&mut self, pos: usize) -> Option<Matched> {
        let label_start = pos + 1;
        let (label_end, url_start, url_end) = self.link_target(label_start)?;
        let span = Span::Link {
            url: self.text[url_start..url_end].to_string(),
            content: parse_at_depth(&self.text[label_start..label_end], self.depth + 1),
        };
        Some((url_end + 1, Some(span)))
    }

    fn code(&mut self, pos: usize) -> Option<Matched> {
        if self.exhausted.code {
            return None;
        }
        let Some(close) = self.find_from(pos + 1, "`") else {
            self.exhausted.code = true;
            return None;
        };
        let content = &self.text[pos + 1..close];
        let span = (!content.is_empty()).then(|| Span::Code(content.to_string()));
        Some((close + 1, span))
    }

    fn strikethrough(&mut self, pos: usize) -> Option<Matched> {
        if self.exhausted.strike {
            return None;
        }
        let inner_start = pos + 2;
        let Some(close) = self.find_from(inner_start, "~~") else {
            self.exhausted.strike = true;
            return None;
        };
        let span = self
            .nested(&self.text[inner_start..close])
            .map(Span::Strikethrough);
        Some((close + 2, span))
    }

    /// `**` closes on the next run of two or more stars. A longer run gives
    /// its leading stars to the inner text, so `**a *b***` nests the italic.
    /// A `***` opener meeting a plain `**` closer declines, so the scanner
    /// retries one star later and the extra star stays text.
    fn bold(&mut self, pos: usize, opener: usize) -> Option<Matched> {
        if self.exhausted.bold {
            return None;
        }
        let bytes = self.text.as_bytes();
        let inner_start = pos + 2;
        let mut j = inner_start;
        while j < bytes.len() {
            if bytes[j] != b'*' {
                j += 1;
                continue;
            }
            let run = star_run(bytes, j);
            if run >= 2 {
                if opener >= 3 && run == 2 && j > pos + opener {
                    return None;
                }
                let close = j + run - 2;
                let span = self.nested(&self.text[inner_start..close]).map(Span::Bold);
                return Some((j + run, span));
            }
            j += run;
        }
        self.exhausted.bold = true;
        None
    }

    /// `*` closes on a lone star, or on the first star of a longer run.
    /// Runs of exactly two open and close a nested bold; while one is still
    /// open, a run of three or more closes it and the italic together, and
    /// a dangling `**` is the closer of last resort.
    fn italic(&mut self, pos: usize) -> Option<Matched> {
        if self.exhausted.italic {
            return None;
        }
        let bytes = self.text.as_bytes();
        let inner_start = pos + 1;
        let mut open_bold = None;
        let mut j = inner_start + 1;
        while j < bytes.len() {
            if bytes[j] != b'*' {
                j += 1;
                continue;
            }
            let run = star_run(bytes, j);
            match run {
                1 => return Some(self.close_italic(inner_start, j)),
                2 => {
                    open_bold = match open_bold {
                        Some(_) => None,
                        None => Some(j),
                    };
                }
                _ if open_bold.is_some() => {
                    return Some(self.close_italic(inner_start, j + run - 1));
                }
                _ => return Some(self.close_italic(inner_start, j)),
            }
            j += run;
        }
        if let Some(close) = open_bold {
            return Some(self.close_italic(inner_start, close));
        }
        self.exhausted.italic = true;
        None
    }

    fn close_italic(&self, inner_start: usize, close: usize) -> Matched {
        let span = self.nested(&self.text[inner_start..close]).map(Span::Italic);
        (close + 1, span)
    }
}

fn star_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|&&b| b == b'*').count()
}
