//! Resource identity, documents and collections
//!
//! A resource is a parsed manifest body held as a [`serde_yaml::Value`] tree
//! together with the (group, version, kind, name) identity used as its key
//! in a [`ResMap`].

mod diff;
mod resmap;

use std::fmt;

use serde_yaml::Value;

use crate::error::{Error, Result};

pub use diff::{first_difference, Difference, Mismatch};
pub use resmap::ResMap;

/// Group, version and kind of a resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gvk {
    /// API group; empty for the core group
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl Gvk {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Split an `apiVersion` such as `apps/v1` (or `v1` for the core group).
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = if self.group.is_empty() {
            "~G"
        } else {
            &self.group
        };
        write!(f, "{}_{}_{}", group, self.version, self.kind)
    }
}

/// Identity of a resource within a collection.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResId {
    pub gvk: Gvk,
    pub name: String,
}

impl ResId {
    pub fn new(gvk: Gvk, name: &str) -> Self {
        Self {
            gvk,
            name: name.to_string(),
        }
    }

    /// Derive the identity from `apiVersion`, `kind` and `metadata.name`.
    pub fn from_document(doc: &Value) -> Result<Self> {
        let kind = doc
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidResource("document has no kind".to_string()))?;
        let api_version = doc
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let name = doc
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::InvalidResource(format!("{kind} document has no metadata.name"))
            })?;

        Ok(Self::new(Gvk::from_api_version(api_version, kind), name))
    }
}

impl fmt::Display for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.gvk, self.name)
    }
}

/// A single manifest body.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    document: Value,
}

impl Resource {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// Build a resource from an inline YAML snippet.
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(Self::new(serde_yaml::from_str(source)?))
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Value {
        &mut self.document
    }

    /// Look up a nested node by mapping keys.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.document, |node, key| node.as_mapping()?.get(*key))
    }
}
