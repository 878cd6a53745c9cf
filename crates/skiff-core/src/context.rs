//! Deployment context shared by all platform calls.

/// Identifies the project and region every reconciliation runs against.
///
/// Frontends create this once and pass it to the reconciler and registry
/// checks; nothing in the library holds process-wide state.
#[derive(Debug, Clone)]
pub struct DeployContext {
    project: String,
    region: String,
}

impl DeployContext {
    pub fn new(project: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            region: region.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// `projects/{project}/locations/{region}` — the parent of every service.
    pub fn location_path(&self) -> String {
        format!("projects/{}/locations/{}", self.project, self.region)
    }

    /// Full resource path for a service id.
    pub fn service_path(&self, service_id: &str) -> String {
        format!("{}/services/{}", self.location_path(), service_id)
    }

    /// Full resource path for an Artifact Registry repository.
    pub fn repository_path(&self, repository: &str) -> String {
        format!("{}/repositories/{}", self.location_path(), repository)
    }
}
