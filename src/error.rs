use thiserror::Error;

/// Failures from the rendering side. Parsing and highlighting cannot fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}
