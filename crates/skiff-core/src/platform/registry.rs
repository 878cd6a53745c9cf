//! Artifact Registry repository check.
//!
//! One call per run, before any reconciliation: fail fast when the
//! target image repository is misconfigured instead of failing on the
//! first deploy.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::PlatformError;
use super::run::check;

const REGISTRY_ENDPOINT: &str = "https://artifactregistry.googleapis.com/v1/";
const USER_AGENT: &str = concat!("skiff/", env!("CARGO_PKG_VERSION"));

/// An Artifact Registry repository resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Repository {
    pub name: String,
    pub format: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[allow(async_fn_in_trait)]
pub trait ArtifactRegistry {
    /// Fetch a repository by full resource path. Returns
    /// [`PlatformError::NotFound`] when the repository does not exist.
    async fn get_repository(&self, path: &str) -> Result<Repository, PlatformError>;
}

/// Check that the repository exists, translating "not found" into an
/// actionable configuration error.
pub async fn verify_repository<R: ArtifactRegistry>(
    registry: &R,
    path: &str,
) -> anyhow::Result<()> {
    match registry.get_repository(path).await {
        Ok(repository) => {
            debug!(name = %repository.name, "repository verified");
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            anyhow::bail!("Repository not found, please specify a valid repository")
        }
        Err(err) => Err(anyhow::Error::new(err).context("GetRepository")),
    }
}

/// Production client over the Artifact Registry v1 REST API.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl HttpRegistryClient {
    pub fn new(token: &str) -> Result<Self, PlatformError> {
        Self::with_base(token, Url::parse(REGISTRY_ENDPOINT)?)
    }

    pub fn with_base(token: &str, base: Url) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base,
            token: token.to_string(),
        })
    }
}

impl ArtifactRegistry for HttpRegistryClient {
    async fn get_repository(&self, path: &str) -> Result<Repository, PlatformError> {
        debug!(path, "GetRepository");
        let url = self.base.join(path)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let response = check(response, path).await?;
        Ok(response.json().await?)
    }
}
