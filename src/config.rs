//! Connector configuration
//!
//! Most machines need no config file at all: the internal panel is found by
//! its well-known name prefixes and anything else counts as an external
//! candidate. The TOML file exists for the machines where that guess is
//! wrong.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::constants::{connectors, files};
use crate::error::SetupError;

/// Connector candidate lists, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub internal_candidates: Vec<String>,
    /// `None` leaves the choice to classification (every connector except
    /// the internal one).
    pub external_candidates: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    internal_connectors: Option<Vec<String>>,
    external_connectors: Option<Vec<String>>,
}

impl ConnectorConfig {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(files::APP_DIR);
        path.push(files::CONFIG_FILENAME);
        path
    }

    /// Loads the config file, or the defaults when the file does not exist.
    /// An explicitly given path must exist.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, SetupError> {
        let path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path(),
        };
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit_path.is_none() => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(SetupError::Configuration(format!(
                    "cannot read config file {}: {e}",
                    path.display()
                )));
            }
        };
        info!(path = %path.display(), "loaded config file");
        Self::from_toml(&contents)
            .map_err(|e| SetupError::Configuration(format!("in {}: {e}", path.display())))
    }

    fn from_toml(contents: &str) -> Result<Self, String> {
        let raw: RawConfig = toml::from_str(contents).map_err(|e| e.to_string())?;
        let internal_candidates = match raw.internal_connectors {
            None => default_internal_candidates(),
            Some(names) if names.is_empty() => {
                return Err("internal_connectors must list at least one connector".into());
            }
            Some(names) => names,
        };
        let external_candidates = match raw.external_connectors {
            Some(names) if names.is_empty() => {
                return Err("external_connectors must list at least one connector".into());
            }
            other => other,
        };
        Ok(Self {
            internal_candidates,
            external_candidates,
        })
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            internal_candidates: default_internal_candidates(),
            external_candidates: None,
        }
    }
}

/// Well-known internal panel names: each prefix crossed with each suffix
/// variant, so "eDP", "eDP1" and "eDP-1" are all covered.
pub fn default_internal_candidates() -> Vec<String> {
    let mut names = Vec::new();
    for prefix in connectors::INTERNAL_PREFIXES {
        for suffix in connectors::INTERNAL_SUFFIXES {
            names.push(format!("{prefix}{suffix}"));
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_candidates_cover_suffix_variants() {
        let names = default_internal_candidates();
        assert!(names.contains(&"LVDS".to_string()));
        assert!(names.contains(&"LVDS1".to_string()));
        assert!(names.contains(&"eDP-1".to_string()));
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ConnectorConfig::from_toml("").unwrap();
        assert_eq!(config, ConnectorConfig::default());
    }

    #[test]
    fn test_explicit_lists_override_defaults() {
        let config = ConnectorConfig::from_toml(
            r#"
internal_connectors = ["eDP-1"]
external_connectors = ["HDMI-1", "DP-1"]
"#,
        )
        .unwrap();
        assert_eq!(config.internal_candidates, ["eDP-1"]);
        assert_eq!(
            config.external_candidates.as_deref(),
            Some(["HDMI-1".to_string(), "DP-1".to_string()].as_slice())
        );
    }

    #[test]
    fn test_empty_internal_list_is_rejected() {
        assert!(ConnectorConfig::from_toml("internal_connectors = []").is_err());
    }

    #[test]
    fn test_empty_external_list_is_rejected() {
        assert!(ConnectorConfig::from_toml("external_connectors = []").is_err());
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        assert!(ConnectorConfig::from_toml("internal_connectors = ").is_err());
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ConnectorConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, SetupError::Configuration(_)));
    }
}
