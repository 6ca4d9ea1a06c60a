use std::collections::btree_map::{self, BTreeMap};

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use super::diff::{first_difference, Mismatch};
use super::{ResId, Resource};
use crate::error::{Error, Result};

/// Resources keyed by identity. Iteration order follows [`ResId`] ordering
/// and carries no meaning.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResMap {
    resources: BTreeMap<ResId, Resource>,
}

impl ResMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a multi-document YAML stream, skipping empty documents.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let mut resmap = Self::new();
        for document in serde_yaml::Deserializer::from_str(source) {
            let value = Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }
            let id = ResId::from_document(&value)?;
            debug!("Loaded {}", id);
            resmap.insert(id, Resource::new(value))?;
        }
        Ok(resmap)
    }

    /// Add a resource, rejecting a second resource with the same identity.
    pub fn insert(&mut self, id: ResId, resource: Resource) -> Result<()> {
        match self.resources.entry(id) {
            btree_map::Entry::Occupied(entry) => Err(Error::InvalidResource(format!(
                "duplicate resource {}",
                entry.key()
            ))),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(resource);
                Ok(())
            }
        }
    }

    /// Concatenate another collection into this one.
    pub fn append(&mut self, other: ResMap) -> Result<()> {
        for (id, resource) in other.resources {
            self.insert(id, resource)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &ResId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResId, &Resource)> {
        self.resources.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ResId, &mut Resource)> {
        self.resources.iter_mut()
    }

    /// Serialize as a `---` separated YAML stream.
    pub fn to_yaml_string(&self) -> Result<String> {
        let mut out = String::new();
        for (i, resource) in self.resources.values().enumerate() {
            if i > 0 {
                out.push_str("---\n");
            }
            out.push_str(&serde_yaml::to_string(resource.document())?);
        }
        Ok(out)
    }

    /// Serialize as a pretty-printed JSON array of documents.
    pub fn to_json_string(&self) -> Result<String> {
        let documents: Vec<&Value> = self.resources.values().map(Resource::document).collect();
        Ok(serde_json::to_string_pretty(&documents)?)
    }

    /// Compare against `actual`, treating `self` as the expectation, and
    /// report the first resource or field that differs.
    pub fn error_if_not_equal(&self, actual: &ResMap) -> std::result::Result<(), Mismatch> {
        for (id, expected) in &self.resources {
            let Some(found) = actual.resources.get(id) else {
                return Err(Mismatch::MissingResource(id.clone()));
            };
            if let Some(difference) = first_difference(expected.document(), found.document()) {
                return Err(Mismatch::Field {
                    resource: id.clone(),
                    difference,
                });
            }
        }

        match actual
            .resources
            .keys()
            .find(|id| !self.resources.contains_key(id))
        {
            Some(id) => Err(Mismatch::UnexpectedResource(id.clone())),
            None => Ok(()),
        }
    }
}

impl FromIterator<(ResId, Resource)> for ResMap {
    /// Later entries replace earlier ones with the same identity.
    fn from_iter<I: IntoIterator<Item = (ResId, Resource)>>(iter: I) -> Self {
        Self {
            resources: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Gvk;

    const STREAM: &str = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: cm1
---
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: deploy1
spec:
  replicas: 2
"#;

    #[test]
    fn test_from_yaml_str_skips_empty_documents() {
        let resmap = ResMap::from_yaml_str(STREAM).unwrap();
        assert_eq!(resmap.len(), 2);
        assert!(resmap
            .get(&ResId::new(Gvk::new("apps", "v1", "Deployment"), "deploy1"))
            .is_some());
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let doubled = format!("{STREAM}\n---\n{STREAM}");
        let err = ResMap::from_yaml_str(&doubled).unwrap_err();
        assert!(err.to_string().contains("duplicate resource"));
    }

    #[test]
    fn test_yaml_round_trip_preserves_field_order() {
        let source = "apiVersion: v1\nkind: Service\nmetadata:\n  name: svc1\nspec:\n  ports:\n  - port: 80\n  type: ClusterIP\n";
        let resmap = ResMap::from_yaml_str(source).unwrap();
        assert_eq!(resmap.to_yaml_string().unwrap(), source);
    }

    #[test]
    fn test_error_if_not_equal_reports_missing_resource() {
        let expected = ResMap::from_yaml_str(STREAM).unwrap();
        let actual = ResMap::from_yaml_str(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cm1\n",
        )
        .unwrap();

        match expected.error_if_not_equal(&actual) {
            Err(Mismatch::MissingResource(id)) => assert_eq!(id.name, "deploy1"),
            other => panic!("unexpected result: {other:?}"),
        }
        match actual.error_if_not_equal(&expected) {
            Err(Mismatch::UnexpectedResource(id)) => assert_eq!(id.name, "deploy1"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_error_if_not_equal_reports_field_path() {
        let expected = ResMap::from_yaml_str(STREAM).unwrap();
        let actual = ResMap::from_yaml_str(&STREAM.replace("replicas: 2", "replicas: 3")).unwrap();

        let err = expected.error_if_not_equal(&actual).unwrap_err();
        assert!(err.to_string().contains("spec.replicas"), "{err}");
        assert!(expected.error_if_not_equal(&expected.clone()).is_ok());
    }
}
