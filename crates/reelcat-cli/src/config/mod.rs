//! Application configuration module.
//!
//! Reads the TOML config file holding catalog connection settings
//! and the search debounce period.

#[allow(clippy::module_inception)]
mod config;

#[allow(clippy::module_name_repetitions)]
pub use config::{API_KEY_ENV, AppConfig, CatalogConfig, resolve_config_path};
