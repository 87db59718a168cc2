use serde::Serialize;

/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    Text(String),
    Bold(Vec<Span>),
    Italic(Vec<Span>),
    Strikethrough(Vec<Span>),
    /// Literal code, never re-parsed
    Code(String),
    Link { url: String, content: Vec<Span> },
    Image { alt: String, url: String },
}

/// A single list item, which can contain nested content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub content: Vec<Span>,
    pub nested: Option<Box<List>>,
    /// For task lists: None = not a task, Some(false) = unchecked, Some(true) = checked
    pub checked: Option<bool>,
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

/// Admonition kind carried by a `> [!KIND]` blockquote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Callout {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl Callout {
    pub const ALL: [Callout; 5] = [
        Callout::Note,
        Callout::Tip,
        Callout::Important,
        Callout::Warning,
        Callout::Caution,
    ];

    /// Look up the kind named inside `[!...]`, ignoring case.
    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.title().eq_ignore_ascii_case(marker))
    }

    pub fn title(self) -> &'static str {
        match self {
            Callout::Note => "Note",
            Callout::Tip => "Tip",
            Callout::Important => "Important",
            Callout::Warning => "Warning",
            Callout::Caution => "Caution",
        }
    }
}

/// Column alignment taken from a table's separator row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Block-level elements parsed from a guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Span>,
    },
    Paragraph {
        content: Vec<Span>,
    },
    CodeBlock {
        language: String,
        lines: Vec<String>,
    },
    List(List),
    Table {
        alignments: Vec<Alignment>,
        headers: Vec<Vec<Span>>,
        rows: Vec<Vec<Vec<Span>>>,
    },
    Blockquote {
        callout: Option<Callout>,
        paragraphs: Vec<Vec<Span>>,
    },
    Rule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callout_marker_ignores_case() {
        assert_eq!(Callout::from_marker("WARNING"), Some(Callout::Warning));
        assert_eq!(Callout::from_marker("tip"), Some(Callout::Tip));
        assert_eq!(Callout::from_marker("Important"), Some(Callout::Important));
        assert_eq!(Callout::from_marker("DANGER"), None);
    }
}
