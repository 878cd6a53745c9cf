//! Cloud Run v2 service operations.

use std::time::Duration;

use tracing::debug;
use url::Url;

use super::PlatformError;
use super::types::{Operation, Service};

const RUN_ENDPOINT: &str = "https://run.googleapis.com/v2/";
const USER_AGENT: &str = concat!("skiff/", env!("CARGO_PKG_VERSION"));
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The service operations the reconciler consumes.
///
/// Create and update are asynchronous on the platform side: both return
/// an operation handle that [`RunPlatform::wait_operation`] drives to a
/// terminal state.
#[allow(async_fn_in_trait)]
pub trait RunPlatform {
    /// Fetch a service by full resource path. Returns
    /// [`PlatformError::NotFound`] when no such service exists; any
    /// other failure is returned unchanged.
    async fn get_service(&self, path: &str) -> Result<Service, PlatformError>;

    /// Submit a full service definition under a deterministic id.
    async fn create_service(
        &self,
        parent: &str,
        service_id: &str,
        service: Service,
    ) -> Result<Operation, PlatformError>;

    /// Resubmit a whole fetched-and-mutated service object.
    async fn update_service(&self, service: Service) -> Result<Operation, PlatformError>;

    /// Block until the operation reaches a terminal state and decode the
    /// resulting service.
    async fn wait_operation(&self, operation: Operation) -> Result<Service, PlatformError>;
}

/// Production client over the Cloud Run v2 REST API.
#[derive(Debug, Clone)]
pub struct HttpRunClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl HttpRunClient {
    pub fn new(token: &str) -> Result<Self, PlatformError> {
        Self::with_base(token, Url::parse(RUN_ENDPOINT)?)
    }

    /// Client against an explicit endpoint, used to point at emulators.
    pub fn with_base(token: &str, base: Url) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base,
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, PlatformError> {
        Ok(self.base.join(path)?)
    }

    async fn get_operation(&self, name: &str) -> Result<Operation, PlatformError> {
        let response = self
            .http
            .get(self.url(name)?)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = check(response, name).await?;
        Ok(response.json().await?)
    }
}

impl RunPlatform for HttpRunClient {
    async fn get_service(&self, path: &str) -> Result<Service, PlatformError> {
        debug!(path, "GetService");
        let response = self
            .http
            .get(self.url(path)?)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = check(response, path).await?;
        Ok(response.json().await?)
    }

    async fn create_service(
        &self,
        parent: &str,
        service_id: &str,
        service: Service,
    ) -> Result<Operation, PlatformError> {
        debug!(parent, service_id, "CreateService");
        let mut url = self.url(&format!("{parent}/services"))?;
        url.query_pairs_mut().append_pair("serviceId", service_id);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&service)
            .send()
            .await?;
        let response = check(response, service_id).await?;
        Ok(response.json().await?)
    }

    async fn update_service(&self, service: Service) -> Result<Operation, PlatformError> {
        debug!(path = %service.name, "UpdateService");
        let url = self.url(&service.name)?;
        let response = self
            .http
            .patch(url)
            .bearer_auth(&self.token)
            .json(&service)
            .send()
            .await?;
        let response = check(response, &service.name).await?;
        Ok(response.json().await?)
    }

    async fn wait_operation(&self, operation: Operation) -> Result<Service, PlatformError> {
        let mut operation = operation;
        while !operation.done {
            tokio::time::sleep(POLL_INTERVAL).await;
            operation = self.get_operation(&operation.name).await?;
        }

        if let Some(status) = operation.error {
            return Err(PlatformError::OperationFailed {
                message: status.message,
            });
        }

        let response = operation.response.ok_or_else(|| {
            PlatformError::MalformedResponse(format!(
                "operation {} finished without a response body",
                operation.name
            ))
        })?;
        serde_json::from_value(response)
            .map_err(|err| PlatformError::MalformedResponse(err.to_string()))
    }
}

/// Map an HTTP response to the platform error taxonomy: 404 becomes
/// `NotFound`, any other non-success status carries the API's own error
/// message.
pub(super) async fn check(
    response: reqwest::Response,
    resource: &str,
) -> Result<reqwest::Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(PlatformError::NotFound {
            resource: resource.to_string(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(PlatformError::Status {
        code: status.as_u16(),
        message: api_error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string()),
    })
}

/// Pull the message out of a Google API error body:
/// `{"error": {"code": .., "message": "..", "status": ".."}}`.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
