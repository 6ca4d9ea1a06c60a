//! Transformers that mutate a resource collection in place
//!
//! [`MapTransformer`] propagates common labels or annotations; a
//! [`MultiTransformer`] chains several transformers over the same
//! collection.

pub mod inject;
pub mod kinds;
mod labels_annotations;
pub mod validation;


pub use kinds::{classify, kind_class, InjectionRule, KindClass, Leaf, MetadataField, Scope};
pub use labels_annotations::MapTransformer;

use crate::error::Result;
use crate::resource::ResMap;

pub trait Transformer {
    fn transform(&self, resources: &mut ResMap) -> Result<()>;
}

/// Runs transformers in order, stopping at the first failure.
#[derive(Default)]
pub struct MultiTransformer {
    transformers: Vec<Box<dyn Transformer>>,
}

impl MultiTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transformer: impl Transformer + 'static) {
        self.transformers.push(Box::new(transformer));
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl Transformer for MultiTransformer {
    fn transform(&self, resources: &mut ResMap) -> Result<()> {
        for transformer in &self.transformers {
            transformer.transform(resources)?;
        }
        Ok(())
    }
}
