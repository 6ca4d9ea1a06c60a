//! Field-by-field comparison of resource documents

use std::fmt;

use serde_yaml::Value;
use thiserror::Error;

use super::ResId;

/// First point at which two documents disagree.
#[derive(Clone, Debug, PartialEq)]
pub struct Difference {
    /// Dotted path of the differing node; sequence items appear as `[i]`
    pub path: String,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        };
        write!(
            f,
            "at {}: expected {}, got {}",
            path,
            render(self.expected.as_ref()),
            render(self.actual.as_ref())
        )
    }
}

fn render(value: Option<&Value>) -> String {
    match value {
        None => "<absent>".to_string(),
        Some(value) => serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}")),
    }
}

#[derive(Error, Debug)]
pub enum Mismatch {
    #[error("resource {0} is missing")]
    MissingResource(ResId),

    #[error("unexpected resource {0}")]
    UnexpectedResource(ResId),

    #[error("resource {resource} differs {difference}")]
    Field {
        resource: ResId,
        difference: Difference,
    },
}

/// Walk both documents in parallel and return the first differing node.
///
/// Mapping keys are visited in the expected document's order, then any
/// keys only present in `actual`.
pub fn first_difference(expected: &Value, actual: &Value) -> Option<Difference> {
    let mut path = Vec::new();
    walk(expected, actual, &mut path)
}

fn walk(expected: &Value, actual: &Value, path: &mut Vec<String>) -> Option<Difference> {
    match (expected, actual) {
        (Value::Mapping(exp), Value::Mapping(act)) => {
            for (key, exp_value) in exp {
                path.push(key_segment(key));
                let found = match act.get(key) {
                    Some(act_value) => walk(exp_value, act_value, path),
                    None => Some(difference(path, Some(exp_value), None)),
                };
                if found.is_some() {
                    return found;
                }
                path.pop();
            }
            act.iter()
                .find(|(key, _)| !exp.contains_key(*key))
                .map(|(key, act_value)| {
                    path.push(key_segment(key));
                    difference(path, None, Some(act_value))
                })
        }
        (Value::Sequence(exp), Value::Sequence(act)) => {
            for i in 0..exp.len().max(act.len()) {
                path.push(format!("[{i}]"));
                let found = match (exp.get(i), act.get(i)) {
                    (Some(e), Some(a)) => walk(e, a, path),
                    (e, a) => Some(difference(path, e, a)),
                };
                if found.is_some() {
                    return found;
                }
                path.pop();
            }
            None
        }
        (Value::Tagged(exp), Value::Tagged(act)) if exp.tag == act.tag => {
            walk(&exp.value, &act.value, path)
        }
        _ if expected == actual => None,
        _ => Some(difference(path, Some(expected), Some(actual))),
    }
}

fn key_segment(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => render(Some(other)),
    }
}

fn difference(path: &[String], expected: Option<&Value>, actual: Option<&Value>) -> Difference {
    let mut joined = String::new();
    for segment in path {
        if !joined.is_empty() && !segment.starts_with('[') {
            joined.push('.');
        }
        joined.push_str(segment);
    }
    Difference {
        path: joined,
        expected: expected.cloned(),
        actual: actual.cloned(),
    }
}
