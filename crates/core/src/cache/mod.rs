//! Snapshot cache keyed by file path

pub mod session_cache;

// Re-export the main cache type
pub use session_cache::{ParseSessionCache, SessionState};
