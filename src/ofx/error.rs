use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A single problem reported by the markup parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("cannot read OFX document {}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed markup: {}", join_diagnostics(.diagnostics))]
    MalformedMarkup { diagnostics: Vec<Diagnostic> },

    #[error("unrecognized OFX header: {0}")]
    HeaderFormatUnrecognized(String),
}

impl ParseError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ParseError::MalformedMarkup {
            diagnostics: vec![Diagnostic::new(0, 0, message)],
        }
    }

    /// Parser diagnostics, empty for every variant but `MalformedMarkup`.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ParseError::MalformedMarkup { diagnostics } => diagnostics,
            _ => &[],
        }
    }
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ParseError>;
