//! Engine configuration

mod settings;

pub use settings::EngineConfig;
