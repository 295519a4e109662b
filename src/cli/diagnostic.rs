//! Miette-based error diagnostics for CLI errors.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// TOML syntax or schema error pointing into the config file.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(smilearb::config))]
pub struct ConfigDiagnostic {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub help: Option<String>,
}

impl ConfigDiagnostic {
    /// Diagnostic for a TOML error in `src`, labelled at the offending span.
    pub fn from_toml(name: &str, src: &str, err: &toml::de::Error) -> Self {
        Self {
            message: err.message().to_string(),
            src: NamedSource::new(name, src.to_string()),
            span: err.span().map(|r| (r.start, r.end - r.start).into()),
            help: Some("see demos/config.example.toml for every section and its defaults".into()),
        }
    }
}

/// Semantic configuration error without a source location.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(smilearb::config::invalid))]
pub struct InvalidConfig {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

impl InvalidConfig {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}
