use serde::Serialize;
use std::path::PathBuf;

use crate::{
    error::Diagnostic,
    types::{Block, BlockTree, DocEntry, Token},
};

/// Immutable result of parsing one version of a file.
///
/// A snapshot is never updated in place; a re-parse produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSnapshot {
    pub file_path: PathBuf,
    /// Owns every block of the file
    pub tree: BlockTree,
    pub doc_entries: Vec<DocEntry>,
    pub source_hash: String,
    pub line_count: u32,
    /// Problems tolerated while parsing, ordered by line
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub(crate) tokens: Vec<Token>,
}

impl ParsedSnapshot {
    pub fn root_block(&self) -> &Block {
        self.tree.root()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
