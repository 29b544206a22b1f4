//! Binding configuration
//!
//! Everything a binding run needs from its host is passed in through these
//! structs; nothing is read from process-wide state.

use crate::binding::cesr::ParsedKeriAid;
use crate::error::{BindingError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_KERI_VERSION: &str = "1.0";
pub const DEFAULT_BINDING_TYPE: &str = "cardano-keri-binding";
const DEFAULT_KERIA_TIMEOUT_SECS: u64 = 10;

/// KERIA agent connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeriaConfig {
    /// KERIA admin interface URL
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Binding metadata and policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// KERI protocol version recorded in every redeemer
    #[serde(default = "default_keri_version")]
    pub keri_version: String,
    /// Binding type recorded in every redeemer
    #[serde(default = "default_binding_type")]
    pub binding_type: String,
    /// AID of the issuer attesting the binding
    pub issuer_aid: String,
    /// Key state lookup service, needed only when resolving holder keys
    #[serde(default)]
    pub keria: Option<KeriaConfig>,
    /// Reject bindings whose Cardano key did not sign the spending transaction
    #[serde(default = "default_true")]
    pub require_signer_binding: bool,
}

fn default_keri_version() -> String {
    DEFAULT_KERI_VERSION.to_string()
}

fn default_binding_type() -> String {
    DEFAULT_BINDING_TYPE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_KERIA_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

impl KeriaConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_KERIA_TIMEOUT_SECS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(BindingError::Config(format!(
                "KERIA url must be http(s): {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(BindingError::Config(
                "KERIA timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl BindingConfig {
    /// Config with default metadata for the given issuer
    pub fn new(issuer_aid: impl Into<String>) -> Self {
        Self {
            keri_version: default_keri_version(),
            binding_type: default_binding_type(),
            issuer_aid: issuer_aid.into(),
            keria: None,
            require_signer_binding: true,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BindingError::Config(format!("Invalid binding config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            BindingError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.keri_version.is_empty() {
            return Err(BindingError::Config("keri_version is empty".to_string()));
        }
        if self.binding_type.is_empty() {
            return Err(BindingError::Config("binding_type is empty".to_string()));
        }
        ParsedKeriAid::parse(&self.issuer_aid)
            .map_err(|e| BindingError::Config(format!("Invalid issuer_aid: {}", e)))?;
        if let Some(keria) = &self.keria {
            keria.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "EDr7pprL3UJ_aoi3wz8wX4I75BUgpanhQdcBbTNb7UCV";

    #[test]
    fn test_config_defaults() {
        let json = format!(r#"{{"issuer_aid": "{}"}}"#, ISSUER);
        let config = BindingConfig::from_json_str(&json).unwrap();

        assert_eq!(config.keri_version, DEFAULT_KERI_VERSION);
        assert_eq!(config.binding_type, DEFAULT_BINDING_TYPE);
        assert!(config.require_signer_binding);
        assert!(config.keria.is_none());
        assert_eq!(config, BindingConfig::new(ISSUER));
    }

    #[test]
    fn test_config_with_keria() {
        let json = format!(
            r#"{{"issuer_aid": "{}", "keria": {{"url": "http://localhost:3901"}}, "require_signer_binding": false}}"#,
            ISSUER
        );
        let config = BindingConfig::from_json_str(&json).unwrap();

        let keria = config.keria.unwrap();
        assert_eq!(keria.url, "http://localhost:3901");
        assert_eq!(keria.timeout_secs, 10);
        assert!(!config.require_signer_binding);
    }

    #[test]
    fn test_config_rejects_bad_issuer() {
        let result = BindingConfig::from_json_str(r#"{"issuer_aid": "not-an-aid"}"#);
        assert!(matches!(result, Err(BindingError::Config(_))));
    }

    #[test]
    fn test_config_rejects_bad_keria_url() {
        let json = format!(
            r#"{{"issuer_aid": "{}", "keria": {{"url": "localhost:3901"}}}}"#,
            ISSUER
        );
        assert!(BindingConfig::from_json_str(&json).is_err());
    }

    #[test]
    fn test_config_missing_issuer() {
        assert!(BindingConfig::from_json_str("{}").is_err());
    }

    #[test]
    fn test_config_from_missing_file() {
        let result = BindingConfig::from_file("/nonexistent/binding.json");
        assert!(matches!(result, Err(BindingError::Config(_))));
    }
}
