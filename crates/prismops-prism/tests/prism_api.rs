//! Exercises the client against an in-process mock of the v3 VM API.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};

use prismops_prism::{PrismClient, PrismConfig, PrismError};

const TOTAL_VMS: u64 = 7;

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    // "admin:secret"
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Basic YWRtaW46c2VjcmV0")
}

async fn list_vms(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if !authorized(&headers) {
        return Err((StatusCode::UNAUTHORIZED, "bad credentials".to_string()));
    }
    state.requests.lock().unwrap().push(body.clone());

    let length = body["length"].as_u64().unwrap_or(20);
    let offset = body["offset"].as_u64().unwrap_or(0);
    // Serve at most 3 per page to force paging
    let end = (offset + length.min(3)).min(TOTAL_VMS);
    let entities: Vec<Value> = (offset..end)
        .map(|i| json!({"metadata": {"uuid": format!("uuid-{i}")}, "spec": {"name": format!("vm-{i}")}}))
        .collect();

    Ok(Json(json!({
        "metadata": {"kind": "vm", "total_matches": TOTAL_VMS, "length": entities.len(), "offset": offset},
        "entities": entities,
    })))
}

async fn get_vm(headers: HeaderMap, Path(uuid): Path<String>) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if uuid == "missing" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({"metadata": {"uuid": uuid}, "spec": {"name": "single"}})))
}

async fn spawn_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/api/nutanix/v3/vms/list", post(list_vms))
        .route("/api/nutanix/v3/vms/{uuid}", get(get_vm))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn client(endpoint: &str, password: &str) -> PrismClient {
    PrismClient::new(&PrismConfig::new(endpoint, "admin", password)).unwrap()
}

#[tokio::test]
async fn test_count_vms_uses_total_matches() {
    let (endpoint, state) = spawn_mock().await;

    let count = client(&endpoint, "secret").count_vms(None).await.unwrap();

    assert_eq!(count, TOTAL_VMS);
    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests, vec![json!({"kind": "vm", "length": 1, "offset": 0})]);
}

#[tokio::test]
async fn test_list_vms_passes_filter() {
    let (endpoint, state) = spawn_mock().await;

    let page = client(&endpoint, "secret")
        .list_vms(2, 0, Some("vm_name==web.*"))
        .await
        .unwrap();

    assert_eq!(page.entities.len(), 2);
    assert_eq!(page.summaries()[1].name.as_deref(), Some("vm-1"));
    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests[0]["filter"], "vm_name==web.*");
}

#[tokio::test]
async fn test_list_all_vms_follows_pages() {
    let (endpoint, state) = spawn_mock().await;

    let all = client(&endpoint, "secret").list_all_vms(None).await.unwrap();

    assert_eq!(all.entities.len() as u64, TOTAL_VMS);
    let names: Vec<_> = all
        .summaries()
        .into_iter()
        .filter_map(|s| s.name)
        .collect();
    assert_eq!(names.first().map(String::as_str), Some("vm-0"));
    assert_eq!(names.last().map(String::as_str), Some("vm-6"));
    assert_eq!(state.requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_vm() {
    let (endpoint, _) = spawn_mock().await;

    let vm = client(&endpoint, "secret").get_vm("abc").await.unwrap();
    assert_eq!(vm["metadata"]["uuid"], "abc");

    let err = client(&endpoint, "secret").get_vm("missing").await.unwrap_err();
    assert!(matches!(err, PrismError::Api { status: 404, .. }));
}

#[tokio::test]
async fn test_bad_credentials_surface_api_error() {
    let (endpoint, _) = spawn_mock().await;

    let err = client(&endpoint, "wrong").count_vms(None).await.unwrap_err();

    match err {
        PrismError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "bad credentials");
        }
        other => panic!("unexpected error: {other}"),
    }
}
