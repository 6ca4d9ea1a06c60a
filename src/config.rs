//! Pair-set configuration
//!
//! Common labels and annotations come from an optional kustomization-style
//! YAML file and from `key=value` command-line overrides.
//!
//! ```yaml
//! commonLabels:
//!   app.kubernetes.io/part-of: checkout
//! commonAnnotations:
//!   owner: payments-team
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::transformers::{MapTransformer, MultiTransformer};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InjectConfig {
    #[serde(default)]
    pub common_labels: BTreeMap<String, String>,

    #[serde(default)]
    pub common_annotations: BTreeMap<String, String>,
}

impl InjectConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source)
            .map_err(|e| Error::ConfigError(format!("invalid pair-set config: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading pair-set config from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// Apply `key=value` overrides; later entries win over the file.
    pub fn with_overrides(mut self, labels: &[String], annotations: &[String]) -> Result<Self> {
        for pair in labels {
            let (key, value) = parse_pair(pair)?;
            self.common_labels.insert(key, value);
        }
        for pair in annotations {
            let (key, value) = parse_pair(pair)?;
            self.common_annotations.insert(key, value);
        }
        Ok(self)
    }

    /// Labels transformer followed by annotations transformer, each only
    /// when it has pairs to apply.
    pub fn transformer(&self) -> Result<MultiTransformer> {
        let mut multi = MultiTransformer::new();
        if !self.common_labels.is_empty() {
            multi.push(MapTransformer::labels(self.common_labels.clone())?);
        }
        if !self.common_annotations.is_empty() {
            multi.push(MapTransformer::annotations(self.common_annotations.clone())?);
        }
        Ok(multi)
    }
}

/// Split `key=value`; the value may be empty and may contain `=`.
pub fn parse_pair(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::ConfigError(format!(
            "expected key=value, got {pair:?}"
        ))),
    }
}
