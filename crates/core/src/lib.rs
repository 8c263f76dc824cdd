//! introspector - source introspection for Python files
//!
//! This crate provides functionality to:
//! - Tokenize Python source and group it into nested blocks
//! - Collect the names each block binds and the documentation of every symbol
//! - Answer editor queries (variables in scope, documentation, folding ranges)
//! - Cache one immutable snapshot per open file
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod parser;
mod query;
pub mod snapshot;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Diagnostic, Error, LexicalError, Result, StructuralError};
pub use types::*;

// Re-export main API components
pub use cache::{ParseSessionCache, SessionState};
pub use config::EngineConfig;
pub use engine::Introspector;
pub use interfaces::{IntrospectionProvider, SnapshotHandle};
pub use parser::SourceParser;
pub use snapshot::ParsedSnapshot;
