//! Path injection
//!
//! Walks a document along a path of mapping keys, creating empty mappings
//! where the path does not exist yet, and merges a pair-set into the mapping
//! found at the end.
//!
//! Merging is not atomic: when a conflicting key is found, keys merged
//! before it in the same call stay in the document.

use std::collections::BTreeMap;

use serde_yaml::mapping::Entry;
use serde_yaml::{Mapping, Value};
use tracing::trace;

use crate::error::{Error, Result};
use crate::resource::ResId;

/// Merge `pairs` into the mapping at `path` inside `document`.
///
/// Missing (or `null`) containers along the path are created when `create`
/// is set; otherwise the call returns `Ok(false)` without touching the
/// document. Returns `Ok(true)` once the pairs have been merged.
pub fn inject(
    resource: &ResId,
    document: &mut Value,
    path: &[&str],
    pairs: &BTreeMap<String, String>,
    create: bool,
) -> Result<bool> {
    let mut node = document;
    for (depth, key) in path.iter().enumerate() {
        let mapping = match node {
            Value::Mapping(mapping) => mapping,
            other => return Err(structural(resource, &path[..depth], other)),
        };

        node = match mapping.entry(Value::from(*key)) {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                if value.is_null() {
                    if !create {
                        return Ok(false);
                    }
                    *value = Value::Mapping(Mapping::new());
                }
                value
            }
            Entry::Vacant(entry) => {
                if !create {
                    return Ok(false);
                }
                entry.insert(Value::Mapping(Mapping::new()))
            }
        };
    }

    let target = match node {
        Value::Mapping(mapping) => mapping,
        other => return Err(structural(resource, path, other)),
    };

    for (key, value) in pairs {
        match target.get(key.as_str()) {
            None => {
                trace!("Setting {}={} at {}", key, value, dotted(path));
                target.insert(Value::from(key.as_str()), Value::from(value.as_str()));
            }
            Some(Value::String(existing)) if existing == value => {}
            Some(existing) => {
                return Err(Error::ConflictError {
                    resource: resource.clone(),
                    path: dotted(path),
                    key: key.clone(),
                    existing: scalar_text(existing),
                    new: value.clone(),
                });
            }
        }
    }

    Ok(true)
}

/// Join path segments with dots; the empty path is the document root.
pub fn dotted(path: &[&str]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

fn structural(resource: &ResId, path: &[&str], found: &Value) -> Error {
    Error::StructuralError {
        resource: resource.clone(),
        path: dotted(path),
        found: describe(found).to_string(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| describe(other).to_string()),
    }
}
