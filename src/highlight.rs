//! Rule-driven syntax highlighting for code blocks.
//!
//! Each language has an ordered list of classification rules. Rules run in
//! order over every line; a byte claimed by an earlier rule is frozen, so a
//! later rule only ever sees the runs that are still plain. That ordering is
//! what keeps `"if"` inside a string literal from becoming a keyword.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Category assigned to a classified fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Comment,
    String,
    Keyword,
    Function,
    Decorator,
    Number,
    Key,
    Boolean,
    Null,
    Placeholder,
    Variable,
    Flag,
    Operator,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Comment => "comment",
            TokenKind::String => "string",
            TokenKind::Keyword => "keyword",
            TokenKind::Function => "function",
            TokenKind::Decorator => "decorator",
            TokenKind::Number => "number",
            TokenKind::Key => "key",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::Placeholder => "placeholder",
            TokenKind::Variable => "variable",
            TokenKind::Flag => "flag",
            TokenKind::Operator => "operator",
        }
    }
}

/// A piece of one source line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fragment {
    Plain(String),
    Classified { text: String, kind: TokenKind },
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Fragment::Plain(text) | Fragment::Classified { text, .. } => text,
        }
    }

    pub fn kind(&self) -> Option<TokenKind> {
        match self {
            Fragment::Plain(_) => None,
            Fragment::Classified { kind, .. } => Some(*kind),
        }
    }
}

/// Languages with their own rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Bash,
    Python,
    Json,
    /// No rules at all; every line is a single plain fragment.
    Plain,
}

impl Language {
    /// Map a fence tag to a rule set. Unknown tags get the shell rules.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Language::Python,
            "json" => Language::Json,
            "text" | "txt" | "plain" | "plaintext" => Language::Plain,
            _ => Language::Bash,
        }
    }

    fn rules(self) -> &'static [Rule] {
        match self {
            Language::Bash => BASH_RULES.as_slice(),
            Language::Python => PYTHON_RULES.as_slice(),
            Language::Json => JSON_RULES.as_slice(),
            Language::Plain => PLAIN_RULES.as_slice(),
        }
    }
}

/// A pattern and the category it assigns. When the pattern has a capture
/// group only that group is claimed; the rest of the match stays plain.
struct Rule {
    kind: TokenKind,
    pattern: Regex,
}

fn rule(kind: TokenKind, pattern: &str) -> Rule {
    Rule {
        kind,
        pattern: Regex::new(pattern).unwrap(),
    }
}

const COMMENT: &str = r"#.*";
const STRING: &str = r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#;

static BASH_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(TokenKind::Comment, COMMENT),
        rule(TokenKind::Placeholder, r"<[^>]+>"),
        rule(TokenKind::String, STRING),
        rule(TokenKind::Variable, r"\$\w+|\$\{\w+\}"),
        rule(TokenKind::Flag, r" (--?[a-zA-Z0-9_-]+)"),
        rule(
            TokenKind::Keyword,
            r"\b(?:nmap|sudo|locate|grep|ftp|ssh|telnet|smb|cat|ls|cd|echo|for|if|then|else|fi|do|done|while)\b",
        ),
        rule(
            TokenKind::Number,
            r"\b(?:\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}|\d+)\b",
        ),
        rule(TokenKind::Operator, r"[|&>]+"),
    ]
});

static PYTHON_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(TokenKind::Comment, COMMENT),
        rule(TokenKind::String, STRING),
        rule(
            TokenKind::Keyword,
            r"\b(?:import|from|def|class|if|else|elif|for|while|return|True|False|None|and|or|not|in|is|try|except|finally|with|as|assert|async|await)\b",
        ),
        rule(TokenKind::Function, r"(\w+)\s*\("),
        rule(TokenKind::Decorator, r"@\w+"),
        rule(TokenKind::Number, r"\b\d+\b"),
    ]
});

static PLAIN_RULES: LazyLock<Vec<Rule>> = LazyLock::new(Vec::new);

static JSON_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(TokenKind::Key, r#"("(?:[^"\\]|\\.)*")\s*:"#),
        rule(TokenKind::String, STRING),
        rule(
            TokenKind::Number,
            r"-?\b(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?\b",
        ),
        rule(TokenKind::Boolean, r"\b(?:true|false)\b"),
        rule(TokenKind::Null, r"\bnull\b"),
    ]
});

/// Highlight a whole code block, one fragment list per line.
pub fn highlight(code: &str, tag: &str) -> Vec<Vec<Fragment>> {
    let language = Language::from_tag(tag);
    let lines: Vec<Vec<Fragment>> = code
        .lines()
        .map(|line| highlight_line(line, language))
        .collect();
    debug!(tag, ?language, lines = lines.len(), "highlighted code");
    lines
}

/// Highlight one line. Concatenating the fragment texts gives back `line`.
pub fn highlight_line(line: &str, language: Language) -> Vec<Fragment> {
    // Which classified span owns each byte; `None` while still plain.
    let mut owner: Vec<Option<usize>> = vec![None; line.len()];
    // Arena of classified spans, indexed in the order rules claimed them.
    let mut spans: Vec<TokenKind> = Vec::new();

    for rule in language.rules() {
        let mut start = 0;
        while start < line.len() {
            if owner[start].is_some() {
                start += 1;
                continue;
            }
            let end = next_change(&owner, start);
            claim(rule, line, start, end, &mut owner, &mut spans);
            start = end;
        }
    }

    let mut fragments = Vec::new();
    let mut start = 0;
    while start < line.len() {
        let end = next_change(&owner, start);
        let text = line[start..end].to_string();
        fragments.push(match owner[start] {
            Some(span) => Fragment::Classified {
                text,
                kind: spans[span],
            },
            None => Fragment::Plain(text),
        });
        start = end;
    }
    fragments
}

/// End of the run of bytes sharing the owner at `start`.
fn next_change(owner: &[Option<usize>], start: usize) -> usize {
    let current = owner[start];
    owner[start..]
        .iter()
        .position(|o| *o != current)
        .map_or(owner.len(), |offset| start + offset)
}

/// Run one rule over the plain run `line[start..end]` and claim its matches.
fn claim(
    rule: &Rule,
    line: &str,
    start: usize,
    end: usize,
    owner: &mut [Option<usize>],
    spans: &mut Vec<TokenKind>,
) {
    for caps in rule.pattern.captures_iter(&line[start..end]) {
        let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
            continue;
        };
        if m.is_empty() {
            continue;
        }
        let id = spans.len();
        spans.push(rule.kind);
        owner[start + m.start()..start + m.end()].fill(Some(id));
    }
}
