//! Exporter YAML configuration parser.
//!
//! Parsing is strict: unknown keys at any level are rejected, and missing
//! required keys (`targets`, `aws_creds`, `region`) fail the load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Label names every snapshot sample carries before any exported tag.
///
/// `target` is attached as a constant label by the collector.
pub const FIXED_LABELS: [&str; 6] = ["target", "snapshot", "volume", "region", "progress", "state"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Metric label name → snapshot tag key. An empty value means the tag
    /// key is the label name itself.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exported_tags: BTreeMap<String, Option<String>>,
    pub targets: BTreeMap<String, Target>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    pub aws_creds: AwsCredentials,
}

/// One `DescribeSnapshots` filter. All filters of a target are ANDed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Filter {
    pub name: String,
    pub value: String,
}

/// Credentials for one target. Absent keys fall back to the SDK default
/// provider chain; `role_arn` is assumed on top of whichever base applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsCredentials {
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
}

/// A resolved exported tag: the label it is published under and the
/// snapshot tag key it is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTag {
    pub label: String,
    pub tag_key: String,
}

impl AwsCredentials {
    /// The static key pair, if both halves are configured and non-empty.
    pub fn static_keys(&self) -> Option<(&str, &str)> {
        match (self.access_key.as_deref(), self.secret_key.as_deref()) {
            (Some(ak), Some(sk)) if !ak.is_empty() && !sk.is_empty() => Some((ak, sk)),
            _ => None,
        }
    }

    /// The role to assume, ignoring an empty string.
    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref().filter(|arn| !arn.is_empty())
    }
}

impl Config {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse and validate config from an in-memory YAML document.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(path),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialize)
    }

    /// Exported tags in label-name order. The order is stable for the life
    /// of the config, which keeps every collector's label schema fixed.
    pub fn exported_tags(&self) -> Vec<ExportedTag> {
        self.exported_tags
            .iter()
            .map(|(label, key)| ExportedTag {
                label: label.clone(),
                tag_key: key
                    .as_deref()
                    .filter(|k| !k.is_empty())
                    .unwrap_or(label)
                    .to_string(),
            })
            .collect()
    }

    /// Check the constraints serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        for label in self.exported_tags.keys() {
            if !is_valid_label_name(label) {
                return Err(ConfigError::Invalid(format!(
                    "exported tag label {label:?} is not a valid Prometheus label name"
                )));
            }
            if FIXED_LABELS.contains(&label.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "exported tag label {label:?} collides with a built-in label"
                )));
            }
        }

        Ok(())
    }
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, and not in the reserved `__` namespace.
fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with("__")
}
