//! Error types for label and annotation injection

use thiserror::Error;

use crate::resource::ResId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected pair-set or invalid command-line configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A container expected along an injection path holds a non-mapping value.
    #[error("Structural error in {resource}: expected a mapping at {path}, found {found}")]
    StructuralError {
        resource: ResId,
        path: String,
        found: String,
    },

    /// A target key already holds a different value.
    #[error(
        "Conflict in {resource} at {path}: key {key:?} already set to {existing:?}, refusing to overwrite with {new:?}"
    )]
    ConflictError {
        resource: ResId,
        path: String,
        key: String,
        existing: String,
        new: String,
    },

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Identity of the resource an injection failure happened in, if any.
    pub fn resource(&self) -> Option<&ResId> {
        match self {
            Error::StructuralError { resource, .. } | Error::ConflictError { resource, .. } => {
                Some(resource)
            }
            _ => None,
        }
    }
}
