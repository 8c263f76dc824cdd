use serde::{Deserialize, Serialize};

use super::block::BlockId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Variable,
    Parameter,
    Function,
    Class,
    Import,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Variable => "variable",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::Function => "function",
            DeclarationKind::Class => "class",
            DeclarationKind::Import => "import",
        }
    }
}

/// A name bound within a specific block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub defined_at_line: u32,
    pub column: u32,
    /// Default value text, for parameters that have one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Block whose namespace receives the binding (lookup only)
    pub owning_block: BlockId,
}

impl Declaration {
    /// Whether the binding has happened by the time execution reaches `line`
    pub fn is_visible_at(&self, line: u32) -> bool {
        self.defined_at_line < line
    }

    /// `def` and `class` bindings
    pub fn is_definition(&self) -> bool {
        matches!(self.kind, DeclarationKind::Function | DeclarationKind::Class)
    }
}
