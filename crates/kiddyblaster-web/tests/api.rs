//! Integration tests for the HTTP API
//!
//! Runs the router against an in-memory registry and the simulated reader.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use kiddyblaster_hardware::CardProtocol;
use kiddyblaster_hardware::mock::{MockReader, MockReaderHandle};
use kiddyblaster_scan::{ScanConfig, Scanner};
use kiddyblaster_storage::{Database, Registry, SqliteRegistry};
use kiddyblaster_web::{AppState, Device, build_router};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

const UID: &str = "04A1B2C3";

struct TestApp {
    router: Router,
    state: AppState,
    reader: MockReaderHandle,
    _db: Database,
}

async fn setup() -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let (reader, handle) = MockReader::new();
    let config = ScanConfig::default()
        .with_poll_interval(Duration::from_millis(10))
        .with_write_timeout(Duration::from_millis(200))
        .with_busy_timeout(Duration::from_millis(100));
    let scanner = Scanner::new(Box::new(reader) as Device, CardProtocol::default(), config);

    let state = AppState::new(scanner, SqliteRegistry::new(db.pool().clone()))
        .with_simulator(handle.clone());

    TestApp {
        router: build_router(state.clone()),
        state,
        reader: handle,
        _db: db,
    }
}

async fn request(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json_body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn present(app: &TestApp, card: Value) {
    let (status, _) = request(&app.router, Method::POST, "/simulator/present", Some(card)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_get_card() {
    let app = setup().await;

    let (status, body) = request(&app.router, Method::GET, "/cards/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    app.state.registry.insert("Pippi", "Pippi Langstrumpf").await.unwrap();

    let (status, body) = request(&app.router, Method::GET, "/cards/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "id": 1, "name": "Pippi", "uri": "Pippi Langstrumpf", "image": null })
    );

    let (status, body) = request(&app.router, Method::GET, "/cards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_two_phase_provisioning() {
    let app = setup().await;
    present(&app, json!({ "uid": UID })).await;

    let request_body = json!({ "name": "Pippi", "uri": "Pippi Langstrumpf" });
    let (status, body) =
        request(&app.router, Method::POST, "/cards/provision", Some(request_body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "status": "allocated", "id": 1 }));

    let renamed = json!({ "name": "Sams", "uri": "Das Sams" });
    let (status, body) =
        request(&app.router, Method::POST, "/cards/provision", Some(renamed)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "confirmationRequired");
    assert_eq!(body["existing"]["name"], "Pippi");

    let confirmed = json!({ "name": "Sams", "uri": "Das Sams", "confirmOverwriteOf": 1 });
    let (status, body) =
        request(&app.router, Method::POST, "/cards/provision", Some(confirmed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "updated", "id": 1 }));

    let entry = app.state.registry.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(entry.name, "Sams");
}

#[tokio::test]
async fn test_provision_without_card_times_out() {
    let app = setup().await;

    let (status, body) = request(
        &app.router,
        Method::POST,
        "/cards/provision",
        Some(json!({ "name": "Pippi", "uri": "Pippi" })),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "NO_CARD");
}

#[tokio::test]
async fn test_provision_with_busy_reader() {
    let app = setup().await;
    present(&app, json!({ "uid": UID })).await;
    let _held = app.state.scanner.checkout().await;

    let (status, _) = request(
        &app.router,
        Method::POST,
        "/cards/provision",
        Some(json!({ "name": "Pippi", "uri": "Pippi" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_pending_write_and_retry() {
    let app = setup().await;
    present(&app, json!({ "uid": UID })).await;
    app.reader.fail_writes(1);

    let (status, body) = request(
        &app.router,
        Method::POST,
        "/cards/provision",
        Some(json!({ "name": "Pippi", "uri": "Pippi" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["id"], 1);
    assert_eq!(body["pendingWrite"], true);

    let (status, body) = request(&app.router, Method::POST, "/cards/1/write", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 1, "cardId": 1 }));
}

#[tokio::test]
async fn test_present_rejects_bad_uid() {
    let app = setup().await;

    let (status, body) = request(
        &app.router,
        Method::POST,
        "/simulator/present",
        Some(json!({ "uid": "XYZ" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_simulator_disabled() {
    let app = setup().await;
    let mut state = app.state.clone();
    state.simulator = None;
    let router = build_router(state);

    let (status, _) = request(&router, Method::POST, "/simulator/remove", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stream_emits_card_events() {
    let app = setup().await;
    present(&app, json!({ "uid": UID, "cardId": 7 })).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/stream").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

    let mut body = response.into_body();
    let mut received = String::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !received.contains("\n\n") {
            let frame = body.frame().await.unwrap().unwrap();
            if let Some(data) = frame.data_ref() {
                received.push_str(&String::from_utf8_lossy(data));
            }
        }
    })
    .await
    .unwrap();

    assert!(received.starts_with("event: message\n"));
    let data = received
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let event: Value = serde_json::from_str(data).unwrap();
    assert_eq!(event["cardId"], 7);
    assert!(event["time"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_stream_disconnect_frees_reader() {
    let app = setup().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/stream").body(Body::empty()).unwrap())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.state.scanner.reader().is_leased());

    drop(response);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!app.state.scanner.reader().is_leased());
}
