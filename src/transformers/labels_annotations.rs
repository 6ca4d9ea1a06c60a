//! Common label and annotation propagation
//!
//! Applies a fixed pair-set to every resource's `metadata`, and for kinds
//! with pod templates or selectors, to the nested locations that take part
//! in label matching.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use super::inject::{dotted, inject};
use super::kinds::{classify, MetadataField};
use super::validation::validate_pairs;
use super::Transformer;
use crate::error::Result;
use crate::resource::ResMap;

/// Injects common labels or annotations into every resource of a [`ResMap`].
#[derive(Clone, Debug)]
pub struct MapTransformer {
    field: MetadataField,
    pairs: BTreeMap<String, String>,
}

impl MapTransformer {
    /// Transformer for common labels, including selector fields.
    pub fn labels(pairs: BTreeMap<String, String>) -> Result<Self> {
        Self::new(MetadataField::Labels, pairs)
    }

    /// Transformer for common annotations; selector fields are left alone.
    pub fn annotations(pairs: BTreeMap<String, String>) -> Result<Self> {
        Self::new(MetadataField::Annotations, pairs)
    }

    pub fn new(field: MetadataField, pairs: BTreeMap<String, String>) -> Result<Self> {
        validate_pairs(field, &pairs)?;
        Ok(Self { field, pairs })
    }

    pub fn field(&self) -> MetadataField {
        self.field
    }

    pub fn pairs(&self) -> &BTreeMap<String, String> {
        &self.pairs
    }
}

impl Transformer for MapTransformer {
    /// Fails on the first structural error or conflict. Resources visited
    /// before the failure keep their changes.
    #[instrument(skip_all, fields(field = %self.field, pairs = self.pairs.len()))]
    fn transform(&self, resources: &mut ResMap) -> Result<()> {
        let mut locations = 0;
        for (id, resource) in resources.iter_mut() {
            for rule in classify(&id.gvk.group, &id.gvk.kind) {
                if !rule.scope.includes(self.field) {
                    continue;
                }
                let path = rule.path(self.field);
                let applied = inject(id, resource.document_mut(), &path, &self.pairs, rule.create)?;
                if applied {
                    debug!("Applied {} to {} at {}", self.field, id, dotted(&path));
                    locations += 1;
                } else {
                    debug!("Skipped {} at {}: path absent", id, dotted(&path));
                }
            }
        }

        info!(
            "Applied {} common {} to {} locations across {} resources",
            self.pairs.len(),
            self.field,
            locations,
            resources.len()
        );
        Ok(())
    }
}
