use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Malformed input the tokenizer could not read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{reason} at line {line}, column {column}")]
pub struct LexicalError {
    pub line: u32,
    pub column: u32,
    pub reason: String,
}

impl LexicalError {
    pub fn new(line: u32, column: u32, reason: impl Into<String>) -> Self {
        Self {
            line,
            column,
            reason: reason.into(),
        }
    }
}

/// A block that could not be closed normally. Never aborts a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{reason} (block starting at line {line})")]
pub struct StructuralError {
    pub line: u32,
    pub reason: String,
}

impl StructuralError {
    pub fn new(line: u32, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// A problem tolerated while producing a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    Lexical(LexicalError),
    Structural(StructuralError),
}

impl Diagnostic {
    pub fn line(&self) -> u32 {
        match self {
            Diagnostic::Lexical(error) => error.line,
            Diagnostic::Structural(error) => error.line,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Lexical(error) => write!(f, "lexical error: {error}"),
            Diagnostic::Structural(error) => write!(f, "structural warning: {error}"),
        }
    }
}

/// Errors that can occur during introspection
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Lexical error: {0}")]
    Lexical(#[from] LexicalError),

    #[error("Line {line} is outside the file (1-{line_count})")]
    OutOfRange { line: u32, line_count: u32 },

    #[error("Nothing to parse in {}", .path.display())]
    EmptySource { path: PathBuf },

    #[error("No parsed snapshot for {}", .0.display())]
    UnknownFile(PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for introspection operations
pub type Result<T> = std::result::Result<T, Error>;
