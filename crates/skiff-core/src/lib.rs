//! Skiff Core Library
//!
//! Provides the domain logic for declarative Cloud Run deployments:
//! configuration loading, the platform API boundary, and the
//! create-or-update reconciler.

pub mod config;
pub mod context;
pub mod deploy;
pub mod platform;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{AppSpec, DeployConfig, EnvPair, Limits, Scaling};

    // Context
    pub use crate::context::DeployContext;

    // Platform
    pub use crate::platform::{
        AccessToken, ArtifactRegistry, HttpRegistryClient, HttpRunClient, PlatformError,
        RunPlatform,
    };

    // Reconciler
    pub use crate::deploy::{ReconcileOutcome, Reconciler};
}
