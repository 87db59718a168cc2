use cheatsheet::{
    Alignment, Block, Callout, DEFAULT_LANGUAGE, Language, List, ListItem, Span, TokenKind,
    highlight, highlight_line, markdown_to_typst, parse, parse_inline,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn text(s: &str) -> Span {
    Span::Text(s.to_string())
}

fn item(s: &str) -> ListItem {
    ListItem {
        content: vec![text(s)],
        nested: None,
        checked: None,
    }
}

const GUIDE: &str = r#"# Recon

Start with a **full port scan** against the target.

$ nmap -sV -p- <target>

## Checklist

- [x] Enumerate services
- [ ] Check `smb` shares
  - anonymous login
  - null session

| Port | Service | Notes |
|-----:|:-------:|-------|
| 22 | ssh | *key only* |
| 445 | smb |

> [!TIP] Save output with `-oA` for later.

```python
def scan(host):
    return True  # stub
```

---

See [the docs](https://nmap.org/book/) for more.
"#;

#[test]
fn parse_is_idempotent() {
    assert_eq!(parse(GUIDE), parse(GUIDE));
}

#[test]
fn full_guide_structure() {
    let blocks = parse(GUIDE);
    let kinds: Vec<&str> = blocks
        .iter()
        .map(|block| match block {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::CodeBlock { .. } => "code",
            Block::List(_) => "list",
            Block::Table { .. } => "table",
            Block::Blockquote { .. } => "blockquote",
            Block::Rule => "rule",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "heading",
            "paragraph",
            "code",
            "heading",
            "list",
            "table",
            "blockquote",
            "code",
            "rule",
            "paragraph",
        ]
    );

    assert_eq!(
        blocks[2],
        Block::CodeBlock {
            language: DEFAULT_LANGUAGE.to_string(),
            lines: vec!["nmap -sV -p- <target>".to_string()],
        }
    );

    let Block::List(list) = &blocks[4] else {
        panic!("expected list, got {:?}", blocks[4]);
    };
    assert_eq!(list.items.len(), 2);
    assert_eq!(list.items[0].checked, Some(true));
    assert_eq!(list.items[1].checked, Some(false));
    let nested = list.items[1].nested.as_ref().expect("nested list");
    assert_eq!(nested.items, vec![item("anonymous login"), item("null session")]);

    let Block::Table {
        alignments,
        headers,
        rows,
    } = &blocks[5]
    else {
        panic!("expected table, got {:?}", blocks[5]);
    };
    assert_eq!(
        alignments,
        &vec![Alignment::Right, Alignment::Center, Alignment::None]
    );
    assert_eq!(headers.len(), 3);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].len(), 2);

    let Block::Blockquote { callout, .. } = &blocks[6] else {
        panic!("expected blockquote, got {:?}", blocks[6]);
    };
    assert_eq!(*callout, Some(Callout::Tip));

    let Block::CodeBlock { language, lines } = &blocks[7] else {
        panic!("expected code block, got {:?}", blocks[7]);
    };
    assert_eq!(language, "python");
    assert_eq!(lines.len(), 2);
}

#[test]
fn heading() {
    assert_eq!(
        parse("# Title"),
        vec![Block::Heading {
            level: 1,
            content: vec![text("Title")],
        }]
    );
}

#[test]
fn nested_list() {
    assert_eq!(
        parse("- a\n  - b"),
        vec![Block::List(List {
            ordered: false,
            items: vec![ListItem {
                content: vec![text("a")],
                nested: Some(Box::new(List {
                    ordered: false,
                    items: vec![item("b")],
                })),
                checked: None,
            }],
        })]
    );
}

#[test]
fn table_shape() {
    assert_eq!(
        parse("| A | B |\n|---|---|\n| 1 | 2 |"),
        vec![Block::Table {
            alignments: vec![Alignment::None, Alignment::None],
            headers: vec![vec![text("A")], vec![text("B")]],
            rows: vec![vec![vec![text("1")], vec![text("2")]]],
        }]
    );
}

#[rstest]
#[case("| A | B |\n|---|---|\n| 1 |")]
#[case("| A | B |\n|---|---|\n| 1 | 2 | 3 | 4 |")]
#[case("| A |\n|---|\n||")]
fn ragged_table_rows_do_not_break_parsing(#[case] input: &str) {
    let blocks = parse(input);
    assert!(matches!(blocks.as_slice(), [Block::Table { .. }]));
    // Rendering fits every row to the header width.
    markdown_to_typst(input);
}

#[test]
fn callout() {
    assert_eq!(
        parse("> [!WARNING] Be careful"),
        vec![Block::Blockquote {
            callout: Some(Callout::Warning),
            paragraphs: vec![vec![text("Be careful")]],
        }]
    );
}

#[test]
fn unknown_callout_is_plain_quote() {
    assert_eq!(
        parse("> [!DANGER] Hot"),
        vec![Block::Blockquote {
            callout: None,
            paragraphs: vec![vec![text("[!DANGER] Hot")]],
        }]
    );
}

#[test]
fn inline_nesting() {
    let spans = parse_inline("**bold *and italic***");
    let [Span::Bold(content)] = spans.as_slice() else {
        panic!("expected a single bold span, got {spans:?}");
    };
    assert!(content.iter().any(|span| matches!(span, Span::Italic(_))));
}

#[test]
fn fence_default_language() {
    assert_eq!(
        parse("```\ncode\n```"),
        vec![Block::CodeBlock {
            language: DEFAULT_LANGUAGE.to_string(),
            lines: vec!["code".to_string()],
        }]
    );
}

#[rstest]
#[case("bash", "sudo nmap -sC 10.0.0.1 | grep open > out.txt # scan")]
#[case("bash", "echo \"$HOME\" ${USER} <ip> && ls --all")]
#[case("python", "@cache\ndef f(x='é', y=\"if\"):  # ünïcode\n    return None")]
#[case("json", "{\"a\": [1, -2.5e3, true, null], \"b\": \"x\\\"y\"}")]
#[case("text", "plain # not a comment")]
#[case("rust", "fn main() { println!(\"日本語\"); }")]
#[case("bash", "")]
fn highlight_concatenation_reproduces_each_line(#[case] tag: &str, #[case] code: &str) {
    let lines = highlight(code, tag);
    let originals: Vec<&str> = code.lines().collect();
    assert_eq!(lines.len(), originals.len());
    for (fragments, original) in lines.iter().zip(originals) {
        let joined: String = fragments.iter().map(|f| f.text()).collect();
        assert_eq!(joined, original);
    }
}

#[test]
fn highlight_earlier_rule_wins() {
    let fragments = highlight_line("echo \"if\" # if", Language::Bash);
    let kinds: Vec<(&str, Option<TokenKind>)> =
        fragments.iter().map(|f| (f.text(), f.kind())).collect();
    assert_eq!(
        kinds,
        vec![
            ("echo", Some(TokenKind::Keyword)),
            (" ", None),
            ("\"if\"", Some(TokenKind::String)),
            (" ", None),
            ("# if", Some(TokenKind::Comment)),
        ]
    );
}

#[rstest]
#[case::deep_emphasis("*".repeat(2000))]
#[case::deep_brackets("[".repeat(2000) + &"]".repeat(2000))]
#[case::alternating("*_~`[".repeat(400))]
#[case::deep_list(
    (0..200)
        .map(|i| format!("{}- x", " ".repeat(i * 2)))
        .collect::<Vec<_>>()
        .join("\n")
)]
#[case::quote_storm("> ".repeat(500))]
#[case::pipes("|".repeat(1000))]
#[case::unterminated_fence("```bash\n".repeat(50))]
#[case::multibyte("# é\n- ü *ß* `日本`\n| ☐ | ☑ |\n|---|---|\n| 😀 |".to_string())]
#[case::control_chars("\u{0}\u{1b}[31m\r\n\t\u{7f}".to_string())]
fn parsing_and_rendering_are_total(#[case] input: String) {
    let blocks = parse(&input);
    assert_eq!(blocks, parse(&input));
    markdown_to_typst(&input);
}
