//! Configuration Module
//!
//! Layered configuration: defaults → global → project → environment.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{BackendConfig, BreakerSettings, Config, PollSettings};
