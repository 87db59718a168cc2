mod block;
mod config;
mod error;
mod highlight;
mod inline;
mod limits;
mod parser;
mod typst;

pub use block::{Alignment, Block, Callout, List, ListItem, Span};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use highlight::{Fragment, Language, TokenKind, highlight, highlight_line};
pub use inline::parse_inline;
pub use limits::{MAX_INLINE_NESTING, MAX_LIST_NESTING};
pub use parser::{DEFAULT_LANGUAGE, MAX_HEADING_LEVEL};

use tracing::debug;
use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_pdf::PdfOptions;

/// Parse guide text into a vector of blocks. Never fails.
pub fn parse(text: &str) -> Vec<Block> {
    parser::parse(text)
}

/// Convert guide text to Typst markup using the compiled default config.
pub fn markdown_to_typst(text: &str) -> String {
    markdown_to_typst_with_config(text, &Config::compiled_default())
}

/// Convert guide text to Typst markup.
pub fn markdown_to_typst_with_config(text: &str, config: &Config) -> String {
    let blocks = parse(text);
    typst::blocks_to_typst(&blocks, config)
}

/// Convert guide text to PDF bytes using the compiled default config.
pub fn markdown_to_pdf(text: &str) -> Result<Vec<u8>, Error> {
    markdown_to_pdf_with_config(text, &Config::compiled_default())
}

/// Convert guide text to PDF bytes.
pub fn markdown_to_pdf_with_config(text: &str, config: &Config) -> Result<Vec<u8>, Error> {
    use typst_library::layout::PagedDocument;

    let typst_content = markdown_to_typst_with_config(text, config);

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| Error::Compile(format!("{:?}", e)))?;

    let bytes = typst_pdf::pdf(&doc, &PdfOptions::default())
        .map_err(|e| Error::Pdf(format!("{:?}", e)))?;

    debug!(bytes = bytes.len(), "generated pdf");
    Ok(bytes)
}
