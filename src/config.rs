use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::block::Callout;
use crate::highlight::TokenKind;

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub links: LinksConfig,
    pub page: PageConfig,
    pub headings: HeadingsConfig,
    pub code: CodeConfig,
    pub callouts: CalloutsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub color: String,
    pub underline: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            color: "#1a4f8b".to_string(),
            underline: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct PageConfig {
    pub numbers: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeadingsConfig {
    pub offset: u8,
}

impl Default for HeadingsConfig {
    fn default() -> Self {
        Self { offset: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub line_numbers: bool,
    pub background: String,
    pub foreground: String,
    pub gutter: String,
    pub label: String,
    /// Colour per token category, keyed by `TokenKind::as_str`
    pub colors: HashMap<String, String>,
}

impl Default for CodeConfig {
    fn default() -> Self {
        let colors = [
            (TokenKind::Comment, "#64748b"),
            (TokenKind::String, "#34d399"),
            (TokenKind::Keyword, "#f87171"),
            (TokenKind::Function, "#60a5fa"),
            (TokenKind::Decorator, "#facc15"),
            (TokenKind::Number, "#c084fc"),
            (TokenKind::Key, "#22d3ee"),
            (TokenKind::Boolean, "#f87171"),
            (TokenKind::Null, "#64748b"),
            (TokenKind::Placeholder, "#facc15"),
            (TokenKind::Variable, "#facc15"),
            (TokenKind::Flag, "#22d3ee"),
            (TokenKind::Operator, "#f87171"),
        ]
        .into_iter()
        .map(|(kind, color)| (kind.as_str().to_string(), color.to_string()))
        .collect();

        Self {
            line_numbers: true,
            background: "#0f172a".to_string(),
            foreground: "#cbd5e1".to_string(),
            gutter: "#475569".to_string(),
            label: "#94a3b8".to_string(),
            colors,
        }
    }
}

impl CodeConfig {
    /// Colour for a token category, falling back to the foreground colour.
    pub fn color_for(&self, kind: TokenKind) -> &str {
        self.colors
            .get(kind.as_str())
            .map_or(self.foreground.as_str(), String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalloutsConfig {
    pub note: String,
    pub tip: String,
    pub important: String,
    pub warning: String,
    pub caution: String,
}

impl Default for CalloutsConfig {
    fn default() -> Self {
        Self {
            note: "#3b82f6".to_string(),
            tip: "#22c55e".to_string(),
            important: "#a855f7".to_string(),
            warning: "#eab308".to_string(),
            caution: "#ef4444".to_string(),
        }
    }
}

impl CalloutsConfig {
    pub fn color_for(&self, callout: Callout) -> &str {
        match callout {
            Callout::Note => &self.note,
            Callout::Tip => &self.tip,
            Callout::Important => &self.important,
            Callout::Warning => &self.warning,
            Callout::Caution => &self.caution,
        }
    }
}

impl Config {
    /// The defaults shipped in `default_config.toml`.
    pub fn compiled_default() -> Self {
        // build.rs has already checked the embedded file parses.
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file. The file must exist; keys missing from
    /// it keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
