//! The resource models must round-trip fields they do not understand:
//! the update path resubmits whole objects, so anything dropped here
//! would be cleared on the remote side.

use serde_json::{Value, json};
use skiff_core::platform::types::Service;

fn fetched_service() -> Value {
    json!({
        "name": "projects/acme/locations/europe-west1/services/dash",
        "uid": "4f7a0c9e",
        "generation": "7",
        "labels": {"managed-by": "skiff"},
        "annotations": {"serving.knative.dev/creator": "someone@acme.dev"},
        "createTime": "2024-03-01T10:00:00Z",
        "creator": "someone@acme.dev",
        "ingress": "INGRESS_TRAFFIC_ALL",
        "launchStage": "GA",
        "template": {
            "scaling": {"minInstanceCount": 0, "maxInstanceCount": 5},
            "vpcAccess": {"connector": "projects/acme/locations/europe-west1/connectors/main"},
            "timeout": "300s",
            "serviceAccount": "run-dash@acme.iam.gserviceaccount.com",
            "containers": [{
                "image": "europe-west1-docker.pkg.dev/acme/apps/dash:latest",
                "ports": [{"name": "http1", "containerPort": 8501}],
                "env": [
                    {"name": "MODE", "value": "prod"},
                    {"name": "API_KEY", "valueSource": {"secretKeyRef": {"secret": "api-key", "version": "latest"}}}
                ],
                "resources": {"limits": {"cpu": "1", "memory": "512Mi"}, "cpuIdle": true},
                "startupProbe": {"tcpSocket": {"port": 8501}, "periodSeconds": 240}
            }],
            "volumes": [{"name": "scratch", "emptyDir": {}}],
            "executionEnvironment": "EXECUTION_ENVIRONMENT_GEN1",
            "maxInstanceRequestConcurrency": 50,
            "encryptionKey": "projects/acme/locations/europe-west1/keyRings/kr/cryptoKeys/k"
        },
        "traffic": [{"type": "TRAFFIC_TARGET_ALLOCATION_TYPE_LATEST", "percent": 100}],
        "observedGeneration": "7",
        "terminalCondition": {
            "type": "Ready",
            "state": "CONDITION_SUCCEEDED",
            "lastTransitionTime": "2024-03-01T10:02:00Z"
        },
        "latestReadyRevision": "projects/acme/locations/europe-west1/services/dash/revisions/dash-00007-abc",
        "uri": "https://dash-4f7a0c9e-ew.a.run.app",
        "etag": "\"CKih-qEG\""
    })
}

#[test]
fn fetched_service_round_trips_bit_for_bit() {
    let raw = fetched_service();
    let service: Service = serde_json::from_value(raw.clone()).unwrap();
    let reserialized = serde_json::to_value(&service).unwrap();
    assert_eq!(reserialized, raw);
}

#[test]
fn unmodeled_fields_land_in_extra_maps() {
    let service: Service = serde_json::from_value(fetched_service()).unwrap();

    assert!(service.extra.contains_key("annotations"));
    assert!(service.extra.contains_key("etag"));
    assert!(service.template.extra.contains_key("vpcAccess"));
    assert!(service.template.extra.contains_key("encryptionKey"));
    assert!(service.template.extra.contains_key("volumes"));

    let container = &service.template.containers[0];
    assert!(container.extra.contains_key("ports"));
    assert!(container.extra.contains_key("startupProbe"));

    // A secret-sourced env var has no literal value; its source must
    // still ride through.
    let secret = &container.env[1];
    assert_eq!(secret.name, "API_KEY");
    assert_eq!(secret.value, None);
    assert!(secret.extra.contains_key("valueSource"));
}

#[test]
fn typed_fields_decode_from_the_fetched_object() {
    let service: Service = serde_json::from_value(fetched_service()).unwrap();

    assert_eq!(service.uri, "https://dash-4f7a0c9e-ew.a.run.app");
    assert!(service.terminal_condition.unwrap().succeeded());
    assert_eq!(service.template.max_instance_request_concurrency, Some(50));
    let scaling = service.template.scaling.unwrap();
    assert_eq!(scaling.max_instance_count, Some(5));
}
