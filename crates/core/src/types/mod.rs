pub mod block;
pub mod declaration;
pub mod doc_entry;
pub mod outline;
pub mod token;

// Re-export commonly used types
pub use block::{Block, BlockId, BlockKind, BlockTree};
pub use declaration::{Declaration, DeclarationKind};
pub use doc_entry::{DocEntry, SymbolKind};
pub use outline::{NavigationItem, NestableRange, Occurrence};
pub use token::{Token, TokenKind};
