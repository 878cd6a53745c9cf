//! Serde models of the Cloud Run v2 REST resources.
//!
//! Only the fields the reconciler reads or writes are modeled as typed
//! fields. Every resource carries a flattened `extra` map so fields the
//! platform manages (VPC access, volumes, annotations, encryption keys,
//! and anything added to the API later) survive a fetch-mutate-resubmit
//! round-trip untouched. The update path depends on this: the API
//! replaces the whole object, so a dropped field would be cleared
//! remotely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const INGRESS_TRAFFIC_ALL: &str = "INGRESS_TRAFFIC_ALL";
pub const INGRESS_TRAFFIC_INTERNAL_ONLY: &str = "INGRESS_TRAFFIC_INTERNAL_ONLY";
pub const EXECUTION_ENVIRONMENT_GEN1: &str = "EXECUTION_ENVIRONMENT_GEN1";
pub const CONDITION_SUCCEEDED: &str = "CONDITION_SUCCEEDED";

/// A Cloud Run service resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<String>,

    pub template: RevisionTemplate,

    /// Output only: the public URL once the service is routable.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uri: String,

    /// Output only: final status of the last operation on this service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_condition: Option<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_ready_revision: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Template for the revision a service deployment produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevisionTemplate {
    /// Output only on fetch; names the revision an update produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling: Option<RevisionScaling>,

    /// Request timeout in duration notation, e.g. `"300s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_instance_request_concurrency: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_environment: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevisionScaling {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_instance_count: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_instance_count: Option<i32>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceRequirements {
    /// Quantity limits keyed by `cpu` and `memory`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_idle: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_cpu_boost: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A literal environment variable. Variables sourced from secrets carry
/// a `valueSource` instead of `value`; that lands in `extra` and is
/// preserved as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvVar {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            extra: Map::new(),
        }
    }
}

/// Status condition on a service; `terminal_condition` uses this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Condition {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Condition {
    pub fn succeeded(&self) -> bool {
        self.state == CONDITION_SUCCEEDED
    }
}

/// Handle for a long-running operation returned by create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    pub name: String,

    pub done: bool,

    pub error: Option<OperationStatus>,

    /// The resulting resource, present once `done` without `error`.
    pub response: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationStatus {
    pub code: Option<i32>,
    pub message: String,
}
