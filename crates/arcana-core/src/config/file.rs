//! YAML-backed configuration

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::credentials::DEFAULT_CREDENTIAL_TTL;
use crate::types::Provider;

/// Environment variable that overrides the configuration file location
pub const CONFIG_PATH_ENV: &str = "ARCANA_CONFIG";

const DEFAULT_CREDENTIAL_TTL_SECS: u64 = DEFAULT_CREDENTIAL_TTL.as_secs();

/// Top-level configuration
///
/// ```yaml
/// credential_ttl_secs: 300
/// models:
///   gemini: gemini-2.0-flash
/// env_vars:
///   openai: [MY_OPENAI_KEY]
/// templates:
///   styles:
///     spiritual-growth: "..."
/// generation:
///   temperature: 0.8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcanaConfig {
    /// How long a resolved credential set is served before re-resolving
    pub credential_ttl_secs: u64,
    /// Generation model per provider
    pub models: BTreeMap<Provider, String>,
    /// Replacement fallback variable names per provider
    pub env_vars: BTreeMap<Provider, Vec<String>>,
    pub templates: TemplateOverrides,
    pub generation: GenerationSettings,
}

impl Default for ArcanaConfig {
    fn default() -> Self {
        Self {
            credential_ttl_secs: DEFAULT_CREDENTIAL_TTL_SECS,
            models: BTreeMap::new(),
            env_vars: BTreeMap::new(),
            templates: TemplateOverrides::default(),
            generation: GenerationSettings::default(),
        }
    }
}

/// Base template text replacements keyed by canonical id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOverrides {
    pub styles: BTreeMap<String, String>,
    pub spreads: BTreeMap<String, String>,
}

/// Sampling options passed to every registered integration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ArcanaConfig {
    /// Default config file location
    ///
    /// `ARCANA_CONFIG` wins; otherwise `<config dir>/arcana/config.yaml`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("arcana").join("config.yaml")
    }

    /// Load from the default location
    pub fn load_default() -> ConfigResult<Self> {
        Self::load(Self::default_path())
    }

    /// Load and validate a config file; a missing file yields defaults
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ArcanaConfig = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the rest of the crate cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.credential_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "credential_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(temperature) = self.generation.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::Invalid(format!(
                    "generation.temperature must be within 0.0..=2.0, got {}",
                    temperature
                )));
            }
        }
        for (provider, model) in &self.models {
            if model.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("empty model name for {}", provider)));
            }
        }
        Ok(())
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl_secs)
    }

    /// Generation model for a provider, falling back to the built-in default
    pub fn model_for(&self, provider: Provider) -> &str {
        self.models
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_model())
    }
}
