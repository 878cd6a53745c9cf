//! Declarative deployment configuration.
//!
//! An `apps.yaml` file lists the applications to reconcile. The loader
//! applies defaults, resolves every image to a fully qualified Artifact
//! Registry URL, and validates name uniqueness before any platform call
//! is made.

mod loader;
mod schema;

pub use loader::{load, parse};
pub use schema::{AppSpec, DeployConfig, EnvPair, Limits, Scaling};
