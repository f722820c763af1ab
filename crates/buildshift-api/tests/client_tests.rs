//! Endpoint behavior tests against a mock backend.

use std::collections::HashMap;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use buildshift_api::{ApiClient, SessionQuery};
use buildshift_core::config::Config;
use buildshift_core::error::BuildShiftError;
use buildshift_core::types::{Machine, TaskStatus};
use buildshift_data::lifecycle::{self, TaskAction};

fn client_for(server: &MockServer) -> ApiClient {
    let config = Config::default().with_base_url(server.uri());
    ApiClient::new(&config).unwrap()
}

// ============================================================
// Machines and tasks
// ============================================================

#[tokio::test]
async fn test_fetch_machines_joins_tasks_by_ip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/arduino_consumer/arduino/get-machines/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ip": "10.0.0.12", "alias": "counter-a" },
            { "ip": "10.0.0.13", "alias": "counter-b" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/arduino_consumer/arduino/get-tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ip": "10.0.0.12", "taskName": "batch-7", "notes": "hopper", "status": "running" }
        ])))
        .mount(&server)
        .await;

    let machines = client_for(&server).fetch_machines().await.unwrap();
    assert_eq!(machines.len(), 2);

    let busy = machines.iter().find(|m| m.ip == "10.0.0.12").unwrap();
    assert_eq!(busy.task_status(), TaskStatus::Running);
    assert_eq!(busy.task.as_ref().unwrap().name, "batch-7");

    let idle = machines.iter().find(|m| m.ip == "10.0.0.13").unwrap();
    assert_eq!(idle.task_status(), TaskStatus::Idle);
    assert!(idle.task.is_none());
}

#[tokio::test]
async fn test_fetch_machines_backend_error_maps_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/arduino_consumer/arduino/get-machines/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/arduino_consumer/arduino/get-tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_machines().await.unwrap_err();
    assert!(err.is_api_error());
    assert!(matches!(
        err,
        BuildShiftError::BackendStatus { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_add_machine_posts_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/arduino_consumer/arduino/add-machine/"))
        .and(body_json(json!({ "alias": "counter-a", "ip": "10.0.0.12" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let machine = Machine::new("10.0.0.12", "counter-a");
    client_for(&server).add_machine(&machine).await.unwrap();
}

#[tokio::test]
async fn test_add_machine_rejects_invalid_payload_before_sending() {
    let server = MockServer::start().await;
    // No mock mounted: a request would fail the test with a 404 panic guard
    Mock::given(method("POST"))
        .and(path("/api/arduino_consumer/arduino/add-machine/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let machine = Machine::new("10.0.0.12", "");
    let err = client_for(&server).add_machine(&machine).await.unwrap_err();
    assert!(err.is_rejected_action());
}

#[tokio::test]
async fn test_remove_machine_posts_ip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/arduino_consumer/arduino/remove-machine/"))
        .and(body_json(json!({ "ip": "10.0.0.12" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).remove_machine("10.0.0.12").await.unwrap();
}

#[tokio::test]
async fn test_task_update_carries_camel_case_name_and_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/arduino_consumer/arduino/task-update/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut machine = Machine::new("10.0.0.12", "counter-a");
    let update = lifecycle::apply(
        &mut machine,
        TaskAction::Start {
            name: "batch-7".into(),
            notes: String::new(),
        },
    )
    .unwrap();

    client_for(&server).send_task_update(&update).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["taskName"], "batch-7");
    assert_eq!(body["status"], "running");
    assert!(body["timestamp"].is_string());
}

// ============================================================
// Notion proxy
// ============================================================

#[tokio::test]
async fn test_fetch_leaderboard_parses_console_database() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notion-api/integrations/notion/consoleIntegration/database"))
        .and(query_param("name", "leaderboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "lb-1",
                "properties": {
                    "User": { "title": [{ "plain_text": "alice" }] },
                    "Count": { "number": 120 },
                    "Duration": { "number": 90 }
                }
            }]
        })))
        .mount(&server)
        .await;

    let entries = client_for(&server)
        .fetch_leaderboard("leaderboard")
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user, "alice");
    assert_eq!(entries[0].duration_secs, 90.0);
}

#[tokio::test]
async fn test_recipe_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notion/db/2a9cee7d24dc80a19293e3b115aed0a6"))
        .and(query_param("integration", "NOTION_API_KEY_PROJECT_MANAGEMENT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "aa-bb-cc",
                "properties": { "Name": { "title": [{ "plain_text": "Vanilla Base" }] } }
            }]
        })))
        .mount(&server)
        .await;

    // Page properties are requested with the dash-less id
    Mock::given(method("GET"))
        .and(path("/api/notion/page_properties/aabbcc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "Vanilla Base",
            "Milk (L)": 12.5,
            "Yield (L)": { "type": "formula", "formula": { "type": "number" } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/notion/recipes/compute/aa-bb-cc/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Yield (L)": 15.1
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let config = Config::default();

    let options = client
        .fetch_recipe_list(&config.recipe_database_id, &config.notion_integration)
        .await
        .unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].name, "Vanilla Base");

    let recipe = client
        .fetch_recipe(&options[0], &config.notion_integration)
        .await
        .unwrap();
    assert_eq!(recipe.fields.len(), 2);

    let mut inputs = HashMap::new();
    inputs.insert("Milk (L)".to_string(), "12.5".to_string());
    let result = client
        .compute_recipe(&recipe.id, &config.notion_integration, &inputs)
        .await
        .unwrap();
    assert_eq!(result["Yield (L)"], 15.1);
}

// ============================================================
// Analytics
// ============================================================

#[tokio::test]
async fn test_counter_sessions_query_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rumpshift-analytics/counter-session-data/"))
        .and(query_param("group_by", "User"))
        .and(query_param("agg", "sum"))
        .and(query_param("user", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "User": "alice", "Count": 42.0, "Duration": 90.0 }
        ])))
        .mount(&server)
        .await;

    let samples = client_for(&server)
        .fetch_counter_sessions(&SessionQuery::for_user("alice"))
        .await
        .unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].count, 42.0);
}

#[tokio::test]
async fn test_malformed_body_maps_to_response_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rumpshift-analytics/counter-session-data/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_counter_sessions(&SessionQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BuildShiftError::BackendResponse { .. }));
}
