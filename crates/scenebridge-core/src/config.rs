//! Bridge configuration
//!
//! Loaded once at startup from a JSON document and never written back.
//!
//! ```json
//! {
//!   "sAcnUniverse": 1,
//!   "channel": 1,
//!   "scenes": ["baseocean", "orangehigh"],
//!   "ledfx_host": "127.0.0.1",
//!   "ledfx_port": 8888
//! }
//! ```

use crate::error::{CoreError, Result};
use crate::logging::LogConfig;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Highest universe number allowed by E1.31
pub const MAX_UNIVERSE: u16 = 63999;
/// Number of DMX slots in a universe
pub const DMX_SLOTS: u16 = 512;

/// What to do when the channel value has no scene assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRangePolicy {
    /// Leave the active scene untouched
    #[default]
    Ignore,
    /// Deactivate the active scene as if the value were zero
    Deactivate,
}

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// sACN universe to listen on (1-63999)
    #[serde(rename = "sAcnUniverse", default = "default_universe")]
    pub universe: u16,
    /// 1-based DMX channel carrying the scene value
    #[serde(default = "default_channel")]
    pub channel: u16,
    /// Scene ids; index 0 is selected by channel value 1
    #[serde(default)]
    pub scenes: Vec<String>,
    /// LedFx host name, IP or full base URL
    #[serde(rename = "ledfx_host", default = "default_host")]
    pub controller_host: String,
    /// LedFx API port
    #[serde(
        rename = "ledfx_port",
        default = "default_port",
        deserialize_with = "deserialize_port"
    )]
    pub controller_port: u16,
    /// Handling of values above the number of scenes
    #[serde(rename = "outOfRange", default)]
    pub out_of_range: OutOfRangePolicy,
    /// Skip deactivate calls when no scene is active
    #[serde(rename = "suppressRedundantDeactivate", default = "default_true")]
    pub suppress_redundant_deactivate: bool,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

fn default_universe() -> u16 {
    1
}

fn default_channel() -> u16 {
    1
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_true() -> bool {
    true
}

/// Accepts the port either as a number or as a numeric string.
fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    match PortValue::deserialize(deserializer)? {
        PortValue::Number(port) => Ok(port),
        PortValue::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {:?}", text))),
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            universe: default_universe(),
            channel: default_channel(),
            scenes: Vec::new(),
            controller_host: default_host(),
            controller_port: default_port(),
            out_of_range: OutOfRangePolicy::default(),
            suppress_redundant_deactivate: true,
            log: LogConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse and validate a configuration document
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Load configuration from disk, falling back to defaults if the file does not exist.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(CoreError::ConfigRead { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::info!("No config file at {:?}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.universe == 0 || self.universe > MAX_UNIVERSE {
            return Err(CoreError::InvalidConfig(format!(
                "sAcnUniverse {} out of range (must be 1-{})",
                self.universe, MAX_UNIVERSE
            )));
        }

        if self.channel == 0 || self.channel > DMX_SLOTS {
            return Err(CoreError::InvalidConfig(format!(
                "channel {} out of range (must be 1-{})",
                self.channel, DMX_SLOTS
            )));
        }

        if let Some(pos) = self.scenes.iter().position(|s| s.trim().is_empty()) {
            return Err(CoreError::InvalidConfig(format!(
                "scene #{} has an empty name",
                pos + 1
            )));
        }

        if self.controller_host.trim().is_empty() {
            return Err(CoreError::InvalidConfig("ledfx_host is empty".to_string()));
        }

        if self.scenes.len() > u8::MAX as usize {
            tracing::warn!(
                "{} scenes configured, only the first {} are reachable",
                self.scenes.len(),
                u8::MAX
            );
        }

        Ok(())
    }

    /// 0-based index of the configured channel within the slot data
    pub fn channel_index(&self) -> usize {
        usize::from(self.channel.saturating_sub(1))
    }

    /// Base URL of the LedFx API, without trailing slash
    pub fn controller_base_url(&self) -> String {
        let host = self.controller_host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}:{}", host, self.controller_port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.universe, 1);
        assert_eq!(config.channel, 1);
        assert!(config.scenes.is_empty());
        assert_eq!(config.controller_base_url(), "http://127.0.0.1:8888");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_document() {
        let json = r#"{
            "sAcnUniverse": 3,
            "channel": 12,
            "scenes": ["baseocean", "orangehigh"],
            "ledfx_host": "10.0.0.5",
            "ledfx_port": "9000"
        }"#;

        let config = BridgeConfig::from_json(json).unwrap();
        assert_eq!(config.universe, 3);
        assert_eq!(config.channel, 12);
        assert_eq!(config.channel_index(), 11);
        assert_eq!(config.scenes, vec!["baseocean", "orangehigh"]);
        assert_eq!(config.controller_port, 9000);
        assert_eq!(config.controller_base_url(), "http://10.0.0.5:9000");
        assert_eq!(config.out_of_range, OutOfRangePolicy::Ignore);
        assert!(config.suppress_redundant_deactivate);
    }

    #[test]
    fn test_numeric_port() {
        let config = BridgeConfig::from_json(r#"{"ledfx_port": 8080}"#).unwrap();
        assert_eq!(config.controller_port, 8080);
    }

    #[test]
    fn test_invalid_port_string() {
        assert!(BridgeConfig::from_json(r#"{"ledfx_port": "eighty"}"#).is_err());
    }

    #[test]
    fn test_url_host_used_verbatim() {
        let config =
            BridgeConfig::from_json(r#"{"ledfx_host": "http://ledfx.local:8888/"}"#).unwrap();
        assert_eq!(config.controller_base_url(), "http://ledfx.local:8888");
    }

    #[test]
    fn test_invalid_universe() {
        let err = BridgeConfig::from_json(r#"{"sAcnUniverse": 0}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));

        let err = BridgeConfig::from_json(r#"{"sAcnUniverse": 64000}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_channel() {
        assert!(BridgeConfig::from_json(r#"{"channel": 0}"#).is_err());
        assert!(BridgeConfig::from_json(r#"{"channel": 513}"#).is_err());
        assert!(BridgeConfig::from_json(r#"{"channel": 512}"#).is_ok());
    }

    #[test]
    fn test_empty_scene_name_rejected() {
        assert!(BridgeConfig::from_json(r#"{"scenes": ["a", " "]}"#).is_err());
    }

    #[test]
    fn test_policy_fields() {
        let config = BridgeConfig::from_json(
            r#"{"outOfRange": "deactivate", "suppressRedundantDeactivate": false}"#,
        )
        .unwrap();
        assert_eq!(config.out_of_range, OutOfRangePolicy::Deactivate);
        assert!(!config.suppress_redundant_deactivate);
    }
}
