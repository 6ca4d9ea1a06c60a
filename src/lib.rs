//! Kube Labeler
//!
//! Propagates a fixed set of common labels or annotations through a
//! collection of Kubernetes resource manifests: into every resource's
//! `metadata`, and for workloads and services, into the pod templates and
//! selectors that must agree with them.

pub mod config;
pub mod error;
pub mod resource;
pub mod transformers;

pub use config::InjectConfig;
pub use error::{Error, Result};
pub use resource::{Gvk, ResId, ResMap, Resource};
pub use transformers::{MapTransformer, MultiTransformer, Transformer};

/// Version string including the build commit.
pub fn version_info() -> String {
    format!(
        "{} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_SHA"),
        env!("BUILD_DATE"),
        env!("RUST_VERSION")
    )
}
