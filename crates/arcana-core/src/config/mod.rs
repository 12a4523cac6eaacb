//! Crate configuration
//!
//! A single YAML file (`<config dir>/arcana/config.yaml`, or the path in
//! `ARCANA_CONFIG`) tunes credential freshness, fallback variables, models and
//! template text. A missing file means defaults.

mod error;
mod file;

pub use error::{ConfigError, ConfigResult};
pub use file::{ArcanaConfig, GenerationSettings, TemplateOverrides, CONFIG_PATH_ENV};
