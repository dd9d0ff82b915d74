//! Application-level configuration.
//!
//! - [`EngineConfig`] - tenant knobs and payload defaults applied to every
//!   proposal the engine evaluates

pub mod engine_config;

pub use engine_config::EngineConfig;
