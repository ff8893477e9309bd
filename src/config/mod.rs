//! Configuration module.
//!
//! Handles transport settings, registered services and environment
//! variable expansion.

mod settings;

pub use settings::{expand_env_vars, ServiceSettings, Settings, SettingsError, TransportSettings};
