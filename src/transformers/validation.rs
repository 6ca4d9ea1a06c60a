//! Syntax checks for label and annotation pairs

use once_cell::sync::Lazy;
use regex::Regex;

use super::kinds::MetadataField;
use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;
const MAX_ANNOTATIONS_SIZE: usize = 256 * 1024;

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$").expect("valid name regex")
});

static PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid prefix regex")
});

/// Check a label or annotation key: `[prefix/]name`.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::ConfigError("key must not be empty".to_string()));
    }

    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN || !PREFIX_RE.is_match(prefix) {
                return Err(Error::ConfigError(format!(
                    "invalid key {key:?}: prefix must be a DNS subdomain of at most {MAX_PREFIX_LEN} characters"
                )));
            }
            name
        }
        None => key,
    };

    if name.is_empty() || name.len() > MAX_NAME_LEN || !NAME_RE.is_match(name) {
        return Err(Error::ConfigError(format!(
            "invalid key {key:?}: name must be 1-{MAX_NAME_LEN} alphanumeric characters, '-', '_' or '.', starting and ending with an alphanumeric character"
        )));
    }
    Ok(())
}

/// Check a label value; the empty string is allowed.
pub fn validate_label_value(key: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    if value.len() > MAX_NAME_LEN || !NAME_RE.is_match(value) {
        return Err(Error::ConfigError(format!(
            "invalid value {value:?} for label {key:?}: must be at most {MAX_NAME_LEN} alphanumeric characters, '-', '_' or '.', starting and ending with an alphanumeric character"
        )));
    }
    Ok(())
}

/// Validate a whole pair-set for the given metadata field.
pub fn validate_pairs<'a, I>(field: MetadataField, pairs: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut count = 0;
    let mut total_size = 0;
    for (key, value) in pairs {
        count += 1;
        validate_key(key)?;
        match field {
            MetadataField::Labels => validate_label_value(key, value)?,
            MetadataField::Annotations => total_size += key.len() + value.len(),
        }
    }

    if count == 0 {
        return Err(Error::ConfigError(format!("no {field} to apply")));
    }
    if total_size > MAX_ANNOTATIONS_SIZE {
        return Err(Error::ConfigError(format!(
            "annotations total {total_size} bytes, limit is {MAX_ANNOTATIONS_SIZE}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_valid_keys() {
        for key in [
            "app",
            "label-key1",
            "app.kubernetes.io/name",
            "example.com/Some_Name.v2",
            "a",
        ] {
            assert!(validate_key(key).is_ok(), "{key} should be valid");
        }
    }

    #[test]
    fn test_invalid_keys() {
        let long_name = "a".repeat(64);
        for key in [
            "",
            "/name",
            "prefix/",
            "-leading",
            "trailing-",
            "has space",
            "Upper.Case/name",
            "a/b/c",
            long_name.as_str(),
        ] {
            assert!(
                matches!(validate_key(key), Err(Error::ConfigError(_))),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_label_values() {
        assert!(validate_label_value("k", "").is_ok());
        assert!(validate_label_value("k", "label-value1").is_ok());
        assert!(validate_label_value("k", "v1.2_3").is_ok());
        assert!(validate_label_value("k", "has space").is_err());
        assert!(validate_label_value("k", "a/b").is_err());
        assert!(validate_label_value("k", &"v".repeat(64)).is_err());
    }

    #[test]
    fn test_annotation_values_are_free_form() {
        let pairs: BTreeMap<String, String> = [(
            "description".to_string(),
            "Anything goes: spaces, /slashes/ and\nnewlines".to_string(),
        )]
        .into_iter()
        .collect();
        assert!(validate_pairs(MetadataField::Annotations, &pairs).is_ok());
        assert!(validate_pairs(MetadataField::Labels, &pairs).is_err());
    }

    #[test]
    fn test_empty_pair_set_rejected() {
        let pairs = BTreeMap::<String, String>::new();
        let err = validate_pairs(MetadataField::Labels, &pairs).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: no labels to apply");
    }

    #[test]
    fn test_annotation_size_limit() {
        let pairs: BTreeMap<String, String> =
            [("big".to_string(), "x".repeat(MAX_ANNOTATIONS_SIZE))].into_iter().collect();
        assert!(validate_pairs(MetadataField::Annotations, &pairs).is_err());
    }
}
