//! Backend configuration.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use filedesk_core::{DispatchConfig, ItemId};

/// Errors that can occur while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    Parse { message: String },

    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<ServiceConfigBuilderError> for ConfigError {
    fn from(err: ServiceConfigBuilderError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Where the file service lives and how to talk to it.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ServiceConfig {
    /// Absolute base URL; action URLs are built below it.
    pub base_url: String,

    /// Session id appended to download URLs.
    #[builder(default)]
    #[serde(default)]
    pub session_id: Option<String>,

    /// Roots the in-memory backend treats as read-only.
    #[builder(default)]
    #[serde(default)]
    pub read_only_roots: Vec<ItemId>,
}

impl ServiceConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(base_url) = &self.base_url {
            parse_base_url(base_url).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl ServiceConfig {
    /// Create a new service config builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        parse_base_url(&config.base_url)?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            base_url = %config.base_url,
            "loaded service config"
        );
        Ok(config)
    }

    /// The validated base URL.
    pub fn url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.base_url)
    }

    /// Dispatch settings derived from this config.
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            session_id: self.session_id.clone(),
            ..DispatchConfig::default()
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        message,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let err = ServiceConfig::builder().build().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_builder_rejects_relative_url() {
        assert!(ServiceConfig::builder().base_url("files/api").build().is_err());
        assert!(ServiceConfig::builder().base_url("mailto:x@y.z").build().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = ServiceConfig::from_toml_str(
            r#"
            base_url = "https://files.example.com/api"
            session_id = "s1"
            read_only_roots = ["shared"]
            "#,
        )
        .unwrap();
        assert_eq!(config.session_id.as_deref(), Some("s1"));
        assert_eq!(config.read_only_roots, vec![ItemId::new("shared")]);
        assert_eq!(config.dispatch_config().session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_from_toml_errors() {
        assert!(matches!(
            ServiceConfig::from_toml_str("session_id = \"s\""),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            ServiceConfig::from_toml_str("base_url = \"not a url\""),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
