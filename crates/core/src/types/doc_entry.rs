use serde::{Deserialize, Serialize};

/// What a documented symbol is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
        }
    }
}

/// Signature and documentation of one function or class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    pub symbol_name: String,
    /// Enclosing block names, outermost first, ending with the symbol itself
    pub qualified_path: Vec<String>,
    pub signature: String,
    pub doc_text: Option<String>,
    pub defined_at_line: u32,
    pub kind: SymbolKind,
}

impl DocEntry {
    pub fn qualified_name(&self) -> String {
        self.qualified_path.join(".")
    }
}
