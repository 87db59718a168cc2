use tracing::debug;

use crate::block::{Alignment, Block, Callout, List, Span};
use crate::config::{CodeConfig, Config};
use crate::highlight::{Fragment, highlight};

/// Deepest heading Typst output uses, after the configured offset.
const MAX_TYPST_HEADING: u8 = 6;

/// Convert blocks to Typst markup
pub fn blocks_to_typst(blocks: &[Block], config: &Config) -> String {
    let mut out = String::new();

    emit_preamble(config, &mut out);

    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];

        match block {
            Block::Heading { .. } => {
                // Keep heading with following content using a block that prevents breaks
                out.push_str("#block(breakable: false)[\n");
                emit_heading(block, config, &mut out);

                // Include the next block if it exists (to keep heading with first content)
                if i + 1 < blocks.len() {
                    i += 1;
                    emit_block(&blocks[i], config, &mut out);
                }
                out.push_str("]\n\n");
            }
            _ => {
                emit_block(block, config, &mut out);
            }
        }

        i += 1;
    }

    debug!(blocks = blocks.len(), bytes = out.len(), "rendered typst");
    out
}

fn emit_preamble(config: &Config, out: &mut String) {
    // Set up paragraph settings to prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    if config.page.numbers {
        out.push_str("#set page(numbering: \"1\")\n");
    }
    out.push_str(&format!(
        "#show link: set text(fill: {})\n",
        rgb(&config.links.color)
    ));
    if config.links.underline {
        out.push_str("#show link: underline\n");
    }
    out.push('\n');
}

fn emit_heading(block: &Block, config: &Config, out: &mut String) {
    if let Block::Heading { level, content } = block {
        let depth = level
            .saturating_add(config.headings.offset)
            .clamp(1, MAX_TYPST_HEADING);
        for _ in 0..depth {
            out.push('=');
        }
        out.push(' ');
        spans_to_typst(content, out);
        out.push('\n');
        out.push('\n');
    }
}

fn emit_block(block: &Block, config: &Config, out: &mut String) {
    match block {
        Block::Heading { .. } => {
            emit_heading(block, config, out);
        }
        Block::Paragraph { content } => {
            spans_to_typst(content, out);
            out.push('\n');
            out.push('\n');
        }
        Block::CodeBlock { language, lines } => {
            // Keep code blocks together when possible
            code_to_typst(language, lines, &config.code, out);
        }
        Block::List(list) => {
            // Wrap list to keep together when small, allow breaks when large
            let item_count = count_list_items(list);
            if item_count <= 5 {
                out.push_str("#block(breakable: false)[\n");
                list_to_typst(list, 0, out);
                out.push_str("]\n\n");
            } else {
                list_to_typst(list, 0, out);
                out.push('\n');
            }
        }
        Block::Table {
            alignments,
            headers,
            rows,
        } => {
            // Keep tables together when possible
            out.push_str("#block(breakable: false)[\n");
            table_to_typst(alignments, headers, rows, out);
            out.push_str("]\n\n");
        }
        Block::Blockquote {
            callout: Some(callout),
            paragraphs,
        } => {
            callout_to_typst(*callout, paragraphs, config, out);
        }
        Block::Blockquote {
            callout: None,
            paragraphs,
        } => {
            out.push_str("#quote(block: true)[\n");
            paragraphs_to_typst(paragraphs, out);
            out.push_str("]\n\n");
        }
        Block::Rule => {
            out.push_str("#line(length: 100%)\n\n");
        }
    }
}

fn count_list_items(list: &List) -> usize {
    let mut count = list.items.len();
    for item in &list.items {
        if let Some(ref nested) = item.nested {
            count += count_list_items(nested);
        }
    }
    count
}

fn paragraphs_to_typst(paragraphs: &[Vec<Span>], out: &mut String) {
    for paragraph in paragraphs {
        spans_to_typst(paragraph, out);
        out.push_str("\n\n");
    }
}

fn spans_to_typst(spans: &[Span], out: &mut String) {
    for span in spans {
        span_to_typst(span, out);
    }
}

// Function calls end with `;` so text that follows them (`(`, `[`, `.`)
// cannot be read as part of the call.
fn span_to_typst(span: &Span, out: &mut String) {
    match span {
        Span::Text(text) => escape_markup(text, out),
        Span::Bold(inner) => {
            out.push_str("#strong[");
            spans_to_typst(inner, out);
            out.push_str("];");
        }
        Span::Italic(inner) => {
            out.push_str("#emph[");
            spans_to_typst(inner, out);
            out.push_str("];");
        }
        Span::Strikethrough(inner) => {
            out.push_str("#strike[");
            spans_to_typst(inner, out);
            out.push_str("];");
        }
        Span::Code(text) => {
            out.push_str(&format!("#raw({});", string_literal(text)));
        }
        Span::Link { url, content } => {
            out.push_str(&format!("#link({})", string_literal(url)));
            if !content.is_empty() {
                out.push('[');
                spans_to_typst(content, out);
                out.push(']');
            }
            out.push(';');
        }
        Span::Image { alt, url } => {
            // No asset resolver behind the engine, so images become links.
            let label = if alt.is_empty() { url } else { alt };
            out.push_str(&format!("#link({})[", string_literal(url)));
            escape_markup(label, out);
            out.push_str("];");
        }
    }
}

/// Escape special Typst markup characters
fn escape_markup(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '~' | '='
            | '+' | '-' | '/' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

/// Quote text as a Typst string literal
fn string_literal(text: &str) -> String {
    let mut lit = String::with_capacity(text.len() + 2);
    lit.push('"');
    for ch in text.chars() {
        match ch {
            '"' => lit.push_str("\\\""),
            '\\' => lit.push_str("\\\\"),
            '\t' => lit.push_str("\\t"),
            _ => lit.push(ch),
        }
    }
    lit.push('"');
    lit
}

fn rgb(color: &str) -> String {
    format!("rgb({})", string_literal(color))
}

fn list_to_typst(list: &List, indent: usize, out: &mut String) {
    let prefix = if list.ordered { "+" } else { "-" };
    let indent_str: String = "  ".repeat(indent);

    for item in &list.items {
        out.push_str(&indent_str);
        out.push_str(prefix);
        out.push(' ');
        match item.checked {
            Some(true) => out.push_str("☑ "),
            Some(false) => out.push_str("☐ "),
            None => {}
        }
        spans_to_typst(&item.content, out);
        out.push('\n');

        if let Some(ref nested) = item.nested {
            list_to_typst(nested, indent + 1, out);
        }
    }
}

fn table_to_typst(
    alignments: &[Alignment],
    headers: &[Vec<Span>],
    rows: &[Vec<Vec<Span>>],
    out: &mut String,
) {
    let col_count = headers.len();
    if col_count == 0 {
        return;
    }

    out.push_str("#table(\n");
    out.push_str(&format!("  columns: {},\n", col_count));
    if alignments.iter().any(|a| *a != Alignment::None) {
        let aligns: Vec<&str> = (0..col_count)
            .map(|col| match alignments.get(col).copied().unwrap_or_default() {
                Alignment::None => "auto",
                Alignment::Left => "left",
                Alignment::Center => "center",
                Alignment::Right => "right",
            })
            .collect();
        // Trailing comma keeps a single column a valid array.
        out.push_str(&format!("  align: ({},),\n", aligns.join(", ")));
    }

    // Header cells (bold)
    for cell in headers {
        out.push_str("  [#strong[");
        spans_to_typst(cell, out);
        out.push_str("]],\n");
    }

    // Data rows, padded or cut to the header width
    for row in rows {
        if row.len() != col_count {
            debug!(expected = col_count, found = row.len(), "fitting ragged table row");
        }
        for col in 0..col_count {
            out.push_str("  [");
            if let Some(cell) = row.get(col) {
                spans_to_typst(cell, out);
            }
            out.push_str("],\n");
        }
    }

    out.push_str(")\n");
}

fn callout_to_typst(callout: Callout, paragraphs: &[Vec<Span>], config: &Config, out: &mut String) {
    let color = rgb(config.callouts.color_for(callout));
    out.push_str(&format!(
        "#block(breakable: false, width: 100%, inset: 8pt, fill: {color}.lighten(85%), stroke: (left: 3pt + {color}))[\n"
    ));
    out.push_str(&format!(
        "#text(fill: {color}, weight: \"bold\")[{}]\n\n",
        callout.title()
    ));
    paragraphs_to_typst(paragraphs, out);
    out.push_str("]\n\n");
}

fn code_to_typst(language: &str, lines: &[String], code: &CodeConfig, out: &mut String) {
    let highlighted = highlight(&lines.join("\n"), language);

    out.push_str(&format!(
        "#block(breakable: false, width: 100%, inset: 8pt, radius: 4pt, fill: {})[\n",
        rgb(&code.background)
    ));
    out.push_str(&format!(
        "#set text(size: 8pt, fill: {})\n",
        rgb(&code.foreground)
    ));
    out.push_str(&format!(
        "#text(fill: {})[#raw({});]\n\n",
        rgb(&code.label),
        string_literal(&language.to_uppercase())
    ));

    let columns = if code.line_numbers { "(auto, 1fr)" } else { "(1fr,)" };
    out.push_str(&format!(
        "#grid(\n  columns: {columns},\n  column-gutter: 8pt,\n  row-gutter: 4pt,\n"
    ));
    for (number, fragments) in highlighted.iter().enumerate() {
        if code.line_numbers {
            out.push_str(&format!(
                "  [#text(fill: {})[{}]],\n",
                rgb(&code.gutter),
                number + 1
            ));
        }
        out.push_str("  [");
        for fragment in fragments {
            fragment_to_typst(fragment, code, out);
        }
        out.push_str("],\n");
    }
    out.push_str(")\n]\n\n");
}

fn fragment_to_typst(fragment: &Fragment, code: &CodeConfig, out: &mut String) {
    let raw = format!("#raw({});", string_literal(fragment.text()));
    match fragment.kind() {
        Some(kind) => out.push_str(&format!(
            "#text(fill: {})[{raw}];",
            rgb(code.color_for(kind))
        )),
        None => out.push_str(&raw),
    }
}
