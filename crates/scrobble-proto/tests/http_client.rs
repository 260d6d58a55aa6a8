//! HttpClient against a local axum stand-in for the scrobbler server.
//!
//! Run with: cargo test -p scrobble-proto --test http_client

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use scrobble_proto::client::{ApiError, HttpClient, ScrobblerApi};
use scrobble_proto::config::ServerConfig;
use scrobble_proto::protocol::{StartRequest, Station, Track};

async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base_url: String) -> HttpClient {
    HttpClient::new(&ServerConfig {
        base_url,
        request_timeout_secs: 1,
        connect_timeout_secs: 1,
    })
    .unwrap()
}

async fn start_handler(Json(req): Json<StartRequest>) -> impl IntoResponse {
    if req.station.as_str() == "fipjazz" {
        (
            StatusCode::OK,
            Json(json!({"success": true, "message": "Started scrobbling fipjazz"})),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": format!("Unknown station: {}", req.station)})),
        )
    }
}

fn scrobbler_router() -> Router {
    Router::new()
        .route(
            "/api/stations",
            get(|| async { Json(json!({"stations": ["fipjazz", "superfly"], "count": 2})) }),
        )
        .route("/api/start", post(start_handler))
        .route(
            "/api/stop",
            post(|| async { Json(json!({"success": true, "message": "Stopped scrobbling"})) }),
        )
        .route(
            "/api/emergency-stop",
            post(|| async {
                Json(json!({"success": true, "message": "Emergency stop activated - all scrobbling halted"}))
            }),
        )
        .route(
            "/api/status",
            get(|| async {
                Json(json!({
                    "is_active": true,
                    "station_name": "fipjazz",
                    "current_track": {"artist": "Ahmad Jamal", "title": "Poinciana"},
                    "last_scrobbled": {"artist": null, "title": null},
                    "error": null
                }))
            }),
        )
}

#[tokio::test]
async fn test_stations_and_status() {
    let client = client_for(spawn_server(scrobbler_router()).await);

    let catalog = client.stations().await.unwrap();
    assert_eq!(
        catalog.stations,
        vec![Station::from("fipjazz"), Station::from("superfly")]
    );
    assert_eq!(catalog.count, Some(2));

    let status = client.status().await.unwrap();
    assert!(status.is_active);
    assert_eq!(status.station_name, Some(Station::from("fipjazz")));
    assert_eq!(
        status.current_track,
        Some(Track::new("Ahmad Jamal", "Poinciana"))
    );
    assert!(!status.last_scrobbled.unwrap().is_complete());
}

#[tokio::test]
async fn test_start_failure_body_is_honoured_despite_400() {
    let client = client_for(spawn_server(scrobbler_router()).await);

    let ok = client.start(&Station::from("fipjazz")).await.unwrap();
    assert!(ok.success);
    assert_eq!(ok.message.as_deref(), Some("Started scrobbling fipjazz"));

    let rejected = client.start(&Station::from("nope")).await.unwrap();
    assert!(!rejected.success);
    assert_eq!(rejected.error.as_deref(), Some("Unknown station: nope"));
}

#[tokio::test]
async fn test_stop_and_emergency_stop() {
    let client = client_for(spawn_server(scrobbler_router()).await);
    assert!(client.stop().await.unwrap().success);
    assert!(client.emergency_stop().await.unwrap().success);
}

#[tokio::test]
async fn test_status_non_success_is_a_transport_failure() {
    let router = Router::new().route(
        "/api/status",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Scrobbler not initialized"})),
            )
        }),
    );
    let client = client_for(spawn_server(router).await);

    match client.status().await {
        Err(ApiError::Status(code)) => assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR),
        other => panic!("expected HTTP status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_command_without_json_body_maps_to_status_error() {
    let router = Router::new().route(
        "/api/stop",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let client = client_for(spawn_server(router).await);

    match client.stop().await {
        Err(ApiError::Status(code)) => assert_eq!(code, StatusCode::BAD_GATEWAY),
        other => panic!("expected HTTP status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_status_body_is_a_decode_error() {
    let router = Router::new().route("/api/status", get(|| async { "<html>maintenance</html>" }));
    let client = client_for(spawn_server(router).await);

    assert!(matches!(client.status().await, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let router = Router::new().route(
        "/api/status",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"is_active": false}))
        }),
    );
    let client = client_for(spawn_server(router).await);

    let err = client.status().await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_failure() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(format!("http://{}", addr));
    assert!(matches!(
        client.stations().await,
        Err(ApiError::Transport(_))
    ));
}
