//! The reconciler: one existence check per application, then either the
//! create path or the update path.

use anyhow::Context;
use tracing::{debug, info};

use crate::config::AppSpec;
use crate::context::DeployContext;
use crate::platform::types::{
    Container, EnvVar, EXECUTION_ENVIRONMENT_GEN1, INGRESS_TRAFFIC_ALL,
    INGRESS_TRAFFIC_INTERNAL_ONLY, RevisionScaling, RevisionTemplate, Service,
};
use crate::platform::{PlatformError, RunPlatform};

const MANAGED_BY_LABEL: &str = "managed-by";
const MANAGED_BY_VALUE: &str = "skiff";
const REQUEST_TIMEOUT: &str = "300s";

/// Result of reconciling one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Service did not exist; it was created and is reachable at `url`.
    Created { url: String },
    /// Service existed and differed; the update produced `revision`.
    Updated { revision: String },
    /// Service existed and already matched the spec; nothing was
    /// submitted. `url` is the prior public URL.
    Unchanged { url: String },
}

/// Reconciles application specs against the platform, one at a time.
///
/// Holds the deployment context and the platform client explicitly; no
/// global state. The existence check runs fresh for every application
/// on every invocation — there is no cached prior-state tracking.
#[derive(Debug)]
pub struct Reconciler<P> {
    ctx: DeployContext,
    platform: P,
}

impl<P: RunPlatform> Reconciler<P> {
    pub fn new(ctx: DeployContext, platform: P) -> Self {
        Self { ctx, platform }
    }

    pub fn context(&self) -> &DeployContext {
        &self.ctx
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Ensure the remote service for `app` exists and matches the spec.
    ///
    /// "Not found" from the existence check routes to the create path;
    /// any other error aborts this application's reconciliation.
    pub async fn reconcile(&self, app: &AppSpec) -> anyhow::Result<ReconcileOutcome> {
        let service_id = app.service_id();
        let path = self.ctx.service_path(&service_id);

        match self.platform.get_service(&path).await {
            Ok(existing) => self.update(app, existing).await,
            Err(err) if err.is_not_found() => self.create(app, &service_id).await,
            Err(err) => Err(anyhow::Error::new(err).context(format!("GetService {path}"))),
        }
    }

    async fn create(&self, app: &AppSpec, service_id: &str) -> anyhow::Result<ReconcileOutcome> {
        info!(app = %app.name, service_id, "creating service");

        let service = self.desired_service(app);
        let operation = self
            .platform
            .create_service(&self.ctx.location_path(), service_id, service)
            .await
            .with_context(|| format!("CreateService {service_id}"))?;

        let created = self
            .platform
            .wait_operation(operation)
            .await
            .with_context(|| format!("CreateService {service_id}: waiting for operation"))?;
        ensure_succeeded(&created)?;

        Ok(ReconcileOutcome::Created { url: created.uri })
    }

    async fn update(&self, app: &AppSpec, mut service: Service) -> anyhow::Result<ReconcileOutcome> {
        let before = service.clone();
        apply_spec(&mut service.template, app);

        // The spec already matches the remote object; resubmitting would
        // only churn a new identical revision.
        if service == before {
            debug!(app = %app.name, "service unchanged, skipping update");
            return Ok(ReconcileOutcome::Unchanged { url: service.uri });
        }

        info!(app = %app.name, path = %service.name, "updating service");
        let path = service.name.clone();
        let operation = self
            .platform
            .update_service(service)
            .await
            .with_context(|| format!("UpdateService {path}"))?;

        let updated = self
            .platform
            .wait_operation(operation)
            .await
            .with_context(|| format!("UpdateService {path}: waiting for operation"))?;
        ensure_succeeded(&updated)?;

        Ok(ReconcileOutcome::Updated {
            revision: updated.template.revision.clone().unwrap_or_default(),
        })
    }

    /// Full service definition for the create path.
    fn desired_service(&self, app: &AppSpec) -> Service {
        let mut service = Service {
            description: app.description.clone(),
            ingress: Some(
                if app.public {
                    INGRESS_TRAFFIC_ALL
                } else {
                    INGRESS_TRAFFIC_INTERNAL_ONLY
                }
                .to_string(),
            ),
            ..Service::default()
        };
        service
            .labels
            .insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());

        service.template.timeout = Some(REQUEST_TIMEOUT.to_string());
        service.template.execution_environment = Some(EXECUTION_ENVIRONMENT_GEN1.to_string());
        apply_spec(&mut service.template, app);

        // cpu_idle is a create-time default, not a reconciled field.
        if let Some(container) = service.template.containers.first_mut()
            && let Some(resources) = container.resources.as_mut()
        {
            resources.cpu_idle = Some(true);
        }

        service
    }
}

/// Overwrite exactly the fields the configuration controls, leaving
/// every other field of the template untouched. The update path relies
/// on this being the complete list: the platform replaces the whole
/// object on update, so anything else must ride through unmodified.
fn apply_spec(template: &mut RevisionTemplate, app: &AppSpec) {
    let scaling = template
        .scaling
        .get_or_insert_with(RevisionScaling::default);
    scaling.min_instance_count = Some(app.scaling.min);
    scaling.max_instance_count = Some(app.scaling.max);
    template.max_instance_request_concurrency = Some(app.scaling.concurrency);

    if template.containers.is_empty() {
        template.containers.push(Container::default());
    }
    let container = &mut template.containers[0];
    container.image = app.image_url.clone();

    let resources = container.resources.get_or_insert_default();
    resources
        .limits
        .insert("cpu".to_string(), app.limits.cpu.clone());
    resources
        .limits
        .insert("memory".to_string(), app.limits.memory.clone());

    container.env = app
        .env
        .iter()
        .map(|pair| EnvVar::new(&pair.name, &pair.value))
        .collect();
}

/// Fail with the platform's own message when the operation's service
/// carries a non-success terminal condition.
fn ensure_succeeded(service: &Service) -> Result<(), PlatformError> {
    match &service.terminal_condition {
        Some(condition) if !condition.succeeded() => Err(PlatformError::OperationFailed {
            message: condition
                .message
                .clone()
                .unwrap_or_else(|| condition.state.clone()),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvPair, Limits, Scaling};
    use crate::platform::types::Condition;

    fn app() -> AppSpec {
        AppSpec {
            name: "dash".into(),
            description: Some("Dashboard".into()),
            public: true,
            image: "dash".into(),
            image_tag: "latest".into(),
            version: None,
            scaling: Scaling {
                min: 0,
                max: 5,
                concurrency: 50,
            },
            limits: Limits {
                cpu: "1".into(),
                memory: "512Mi".into(),
            },
            env: vec![EnvPair {
                name: "MODE".into(),
                value: "prod".into(),
            }],
            image_url: "europe-west1-docker.pkg.dev/acme/apps/dash:latest".into(),
        }
    }

    #[test]
    fn apply_spec_only_touches_controlled_fields() {
        let mut template = RevisionTemplate {
            timeout: Some("120s".into()),
            ..RevisionTemplate::default()
        };
        template
            .extra
            .insert("vpcAccess".into(), serde_json::json!({"connector": "c"}));

        apply_spec(&mut template, &app());

        assert_eq!(template.timeout.as_deref(), Some("120s"));
        assert!(template.extra.contains_key("vpcAccess"));
        assert_eq!(template.max_instance_request_concurrency, Some(50));
        let scaling = template.scaling.as_ref().unwrap();
        assert_eq!(scaling.min_instance_count, Some(0));
        assert_eq!(scaling.max_instance_count, Some(5));
        let container = &template.containers[0];
        assert_eq!(
            container.image,
            "europe-west1-docker.pkg.dev/acme/apps/dash:latest"
        );
        assert_eq!(container.env[0].name, "MODE");
        let limits = &container.resources.as_ref().unwrap().limits;
        assert_eq!(limits["cpu"], "1");
        assert_eq!(limits["memory"], "512Mi");
    }

    #[test]
    fn apply_spec_is_idempotent() {
        let mut template = RevisionTemplate::default();
        apply_spec(&mut template, &app());
        let once = template.clone();
        apply_spec(&mut template, &app());
        assert_eq!(template, once);
    }

    #[test]
    fn ensure_succeeded_surfaces_platform_message() {
        let service = Service {
            terminal_condition: Some(Condition {
                kind: Some("Ready".into()),
                state: "CONDITION_FAILED".into(),
                message: Some("quota exceeded".into()),
                extra: serde_json::Map::new(),
            }),
            ..Service::default()
        };
        let err = ensure_succeeded(&service).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
