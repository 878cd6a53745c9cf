//! Schema for the apps.yaml deployment file.

use serde::{Deserialize, Serialize};

/// Fully resolved deployment configuration for one run.
///
/// `project`, `region`, and `repository` come from the entry point, not
/// the YAML file; they are carried here so image URLs can be resolved
/// once, up front.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub project: String,
    pub region: String,
    pub repository: String,
    pub apps: Vec<AppSpec>,
}

/// A single application to reconcile, identified by name.
///
/// Immutable after loading: `image_url` is always resolved before
/// reconciliation begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSpec {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Whether the service accepts traffic from the public internet.
    #[serde(default)]
    pub public: bool,

    /// Image name within the repository; defaults to the app name.
    #[serde(default)]
    pub image: String,

    #[serde(default, rename = "image-tag")]
    pub image_tag: String,

    /// Optional version suffix; the service id becomes `{name}-{version}`.
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub scaling: Scaling,

    #[serde(default)]
    pub limits: Limits,

    /// Ordered environment variable pairs.
    #[serde(default)]
    pub env: Vec<EnvPair>,

    /// Fully qualified image URL, resolved by the loader.
    #[serde(skip)]
    pub image_url: String,
}

impl AppSpec {
    /// Deterministic remote service identifier for this app.
    pub fn service_id(&self) -> String {
        match &self.version {
            Some(version) => format!("{}-{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

/// Instance scaling bounds and per-instance request concurrency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scaling {
    #[serde(default)]
    pub min: i32,
    #[serde(default)]
    pub max: i32,
    #[serde(default)]
    pub concurrency: i32,
}

/// Per-instance resource limits, in Cloud Run quantity notation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub memory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvPair {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_id_without_version_is_the_name() {
        let app = AppSpec {
            name: "dash".into(),
            description: None,
            public: false,
            image: "dash".into(),
            image_tag: "latest".into(),
            version: None,
            scaling: Scaling::default(),
            limits: Limits::default(),
            env: Vec::new(),
            image_url: String::new(),
        };
        assert_eq!(app.service_id(), "dash");
    }

    #[test]
    fn service_id_with_version_appends_suffix() {
        let app = AppSpec {
            name: "dash".into(),
            description: None,
            public: false,
            image: "dash".into(),
            image_tag: "latest".into(),
            version: Some("v2".into()),
            scaling: Scaling::default(),
            limits: Limits::default(),
            env: Vec::new(),
            image_url: String::new(),
        };
        assert_eq!(app.service_id(), "dash-v2");
    }
}
