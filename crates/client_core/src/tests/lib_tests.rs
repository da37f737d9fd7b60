use super::*;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared::error::ErrorCode;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

const EXPORT_CSV: &str = "Room,Date,Start Time,End Time,Purpose,Attendees,Booked By,Timestamp\n\
Lab A - Chemistry,2024-01-15,09:00,11:00,Organic Chemistry Research,8,Dr. Smith,2024-01-10T08:00:00Z\n\
Conference Room 1,2024-01-15,14:00,16:00,Weekly Team Meeting,12,Prof. Johnson,2024-01-10T09:00:00Z\n";

#[derive(Clone)]
struct EndpointState {
    envelopes: Arc<Mutex<Vec<Value>>>,
    export_hits: Arc<Mutex<u32>>,
    export_status: StatusCode,
    export_body: &'static str,
    write_status: StatusCode,
    query_response: Value,
}

impl EndpointState {
    fn new() -> Self {
        Self {
            envelopes: Arc::new(Mutex::new(Vec::new())),
            export_hits: Arc::new(Mutex::new(0)),
            export_status: StatusCode::OK,
            export_body: EXPORT_CSV,
            write_status: StatusCode::OK,
            query_response: json!({ "data": [] }),
        }
    }
}

async fn handle_exec(
    State(state): State<EndpointState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let action = body["action"].as_str().unwrap_or_default().to_string();
    state.envelopes.lock().await.push(body);

    if !state.write_status.is_success() {
        return (state.write_status, Json(json!({ "error": "sheet unavailable" })));
    }
    match action.as_str() {
        "getBookings" | "getAccessRequests" | "getBackups" => {
            (StatusCode::OK, Json(state.query_response.clone()))
        }
        _ => (StatusCode::OK, Json(json!({ "status": "success" }))),
    }
}

async fn handle_export(State(state): State<EndpointState>) -> (StatusCode, String) {
    *state.export_hits.lock().await += 1;
    (state.export_status, state.export_body.to_string())
}

async fn spawn_endpoint(state: EndpointState) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/exec", post(handle_exec))
        .route("/export.csv", get(handle_export))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn client_for(base_url: &str, with_export: bool) -> RemoteStoreClient {
    let mut config = RemoteStoreConfig::new(&format!("{base_url}/exec")).expect("config");
    if with_export {
        config = config
            .with_export_url(&format!("{base_url}/export.csv"))
            .expect("export url");
    }
    RemoteStoreClient::new(config.with_submitter("Dr. Smith")).expect("client")
}

fn sample_booking() -> NewBooking {
    NewBooking {
        room: "Ruang meeting lab (gedung lama)".into(),
        date: "2024-01-15".into(),
        start_time: "09:00".into(),
        end_time: "11:00".into(),
        purpose: "Organic Chemistry Research".into(),
        attendees: "8".into(),
    }
}

#[tokio::test]
async fn create_booking_posts_envelope_with_timestamp_and_submitter() {
    let state = EndpointState::new();
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, false);

    let ack = client
        .create_booking(sample_booking())
        .await
        .expect("create booking");
    assert_eq!(ack.into_inner(), json!({ "status": "success" }));

    let envelopes = state.envelopes.lock().await;
    assert_eq!(envelopes.len(), 1);
    let envelope = &envelopes[0];
    assert_eq!(envelope["action"], "createBooking");
    assert_eq!(envelope["data"]["room"], "Ruang meeting lab (gedung lama)");
    assert_eq!(envelope["data"]["startTime"], "09:00");
    assert_eq!(envelope["data"]["bookedBy"], "Dr. Smith");
    let timestamp = envelope["data"]["timestamp"].as_str().expect("timestamp");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn create_access_request_attaches_pending_status() {
    let state = EndpointState::new();
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, false);

    client
        .create_access_request(NewAccessRequest {
            full_name: "Sarah Chen".into(),
            student_id: "S-2024-001".into(),
            email: "sarah.chen@university.edu".into(),
            department: "Chemistry".into(),
            supervisor: String::new(),
            reason: "Thesis experiments".into(),
            selected_areas: vec!["lab-a".into(), "clean-room".into()],
        })
        .await
        .expect("create access request");

    let envelopes = state.envelopes.lock().await;
    let envelope = &envelopes[0];
    assert_eq!(envelope["action"], "createAccessRequest");
    assert_eq!(envelope["data"]["status"], "Pending");
    assert_eq!(envelope["data"]["selectedAreas"], json!(["lab-a", "clean-room"]));
    assert!(envelope["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn create_backup_record_marks_completed() {
    let state = EndpointState::new();
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, false);

    client
        .create_backup_record(NewBackupRecord {
            file_name: "Lab_Results_Jan_2024".into(),
            description: "Monthly results".into(),
            size: "890.00 MB".into(),
        })
        .await
        .expect("create backup");

    let envelopes = state.envelopes.lock().await;
    assert_eq!(envelopes[0]["action"], "createBackup");
    assert_eq!(envelopes[0]["data"]["fileName"], "Lab_Results_Jan_2024");
    assert_eq!(envelopes[0]["data"]["status"], "Completed");
}

#[tokio::test]
async fn non_success_status_is_a_retryable_transport_failure() {
    let mut state = EndpointState::new();
    state.write_status = StatusCode::INTERNAL_SERVER_ERROR;
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, false);

    let err = client
        .create_booking(sample_booking())
        .await
        .expect_err("must fail");
    assert!(matches!(err, StoreError::Status { status: 500, .. }));
    assert_eq!(err.code(), ErrorCode::Transport);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = client_for(&format!("http://{addr}"), false);
    let err = client
        .fetch_backups()
        .await
        .expect_err("must fail");
    assert!(matches!(err, StoreError::Transport { .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn fetch_bookings_prefers_the_published_export() {
    let state = EndpointState::new();
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, true);

    let bookings = client.fetch_bookings().await.expect("bookings");
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0].room, "Lab A - Chemistry");
    assert_eq!(bookings[1].booked_by, "Prof. Johnson");
    assert_eq!(*state.export_hits.lock().await, 1);
    assert!(state.envelopes.lock().await.is_empty());
}

#[tokio::test]
async fn fetch_bookings_falls_back_when_export_errors() {
    let mut state = EndpointState::new();
    state.export_status = StatusCode::NOT_FOUND;
    state.query_response = json!({
        "data": [
            { "room": "Lab B - Physics", "date": "2024-01-16", "startTime": "10:00", "endTime": "12:00" }
        ]
    });
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, true);

    let bookings = client.fetch_bookings().await.expect("bookings");
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].room, "Lab B - Physics");
    assert_eq!(bookings[0].end_time, "12:00");

    let envelopes = state.envelopes.lock().await;
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0], json!({ "action": "getBookings", "data": {} }));
}

#[tokio::test]
async fn fetch_bookings_falls_back_when_export_is_malformed() {
    let mut state = EndpointState::new();
    state.export_body = "<!DOCTYPE html>\n<html><body>Sign in</body></html>";
    state.query_response = json!([
        { "Room": "Research Lab C", "Date": "2024-01-16" }
    ]);
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, true);

    let bookings = client.fetch_bookings().await.expect("bookings");
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].room, "Research Lab C");
    assert_eq!(*state.export_hits.lock().await, 1);
}

#[tokio::test]
async fn fetch_bookings_without_export_uses_query_endpoint() {
    let mut state = EndpointState::new();
    state.query_response = json!([]);
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, false);

    let bookings = client.fetch_bookings().await.expect("bookings");
    assert!(bookings.is_empty());
    assert_eq!(*state.export_hits.lock().await, 0);
    assert_eq!(state.envelopes.lock().await.len(), 1);
}

#[tokio::test]
async fn fetch_bookings_surfaces_error_when_both_strategies_fail() {
    let mut state = EndpointState::new();
    state.export_status = StatusCode::SERVICE_UNAVAILABLE;
    state.write_status = StatusCode::BAD_GATEWAY;
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, true);

    let err = client.fetch_bookings().await.expect_err("must fail");
    assert!(matches!(err, StoreError::Status { status: 502, .. }));
}

#[tokio::test]
async fn fetch_bookings_rejects_query_answer_without_records() {
    let mut state = EndpointState::new();
    state.query_response = json!({ "status": "success" });
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, false);

    let err = client.fetch_bookings().await.expect_err("must fail");
    assert!(matches!(err, StoreError::Parse(ParseError::NotARecordList)));
    assert_eq!(err.code(), ErrorCode::Parse);
}

#[tokio::test]
async fn pass_through_reads_return_untyped_json() {
    let mut state = EndpointState::new();
    state.query_response = json!({ "data": [{ "fullName": "Sarah Chen", "status": "Pending" }] });
    let base_url = spawn_endpoint(state.clone()).await.expect("spawn endpoint");
    let client = client_for(&base_url, false);

    let requests = client.fetch_access_requests().await.expect("requests");
    assert_eq!(requests["data"][0]["status"], "Pending");
    let backups = client.fetch_backups().await.expect("backups");
    assert_eq!(backups, requests);

    let envelopes = state.envelopes.lock().await;
    assert_eq!(envelopes[0]["action"], "getAccessRequests");
    assert_eq!(envelopes[1]["action"], "getBackups");
}

#[test]
fn config_rejects_unparseable_endpoint() {
    let err = RemoteStoreConfig::new("not a url").expect_err("must fail");
    assert!(matches!(err, StoreError::InvalidEndpoint { .. }));
    assert_eq!(err.code(), ErrorCode::Configuration);
    assert!(!err.is_retryable());

    let config = RemoteStoreConfig::new(" https://script.example.com/exec ").expect("config");
    assert_eq!(config.submitted_by, DEFAULT_SUBMITTER);
    assert!(config.export_url.is_none());
    assert!(config
        .clone()
        .with_export_url("::")
        .is_err());
}
