use serde::{Deserialize, Serialize};

use super::block::BlockKind;
use super::doc_entry::SymbolKind;

/// A foldable line interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestableRange {
    pub start_line: u32,
    pub end_line: u32,
    pub kind: BlockKind,
}

/// Entry of a file outline, one per function or class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    pub title: String,
    pub start_line: u32,
    pub line_count: u32,
    pub kind: SymbolKind,
}

/// One spelling of a name in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Occurrence {
    pub line: u32,
    pub column: u32,
    pub length: u32,
}
