//! Workspace-level package used to host the cross-crate scenario tests
pub use introspector_core::*;
