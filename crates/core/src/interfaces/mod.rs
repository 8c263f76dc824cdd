//! Interfaces between the engine and its host

pub mod provider;

pub use provider::{IntrospectionProvider, SnapshotHandle};
