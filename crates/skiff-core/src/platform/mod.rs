//! Platform API boundary: Cloud Run v2 and Artifact Registry.
//!
//! The reconciler talks to the platform through the [`RunPlatform`]
//! trait; [`HttpRunClient`] is the production implementation over the
//! v2 REST surface. Resource models round-trip unmodeled fields so a
//! fetched service can be resubmitted without losing anything the
//! platform manages.

mod auth;
mod error;
mod registry;
mod run;
pub mod types;

pub use auth::AccessToken;
pub use error::PlatformError;
pub use registry::{ArtifactRegistry, HttpRegistryClient, Repository, verify_repository};
pub use run::{HttpRunClient, RunPlatform};
