use super::*;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct ServerState {
    captured: Arc<Mutex<Option<oneshot::Sender<(Option<String>, PredictionRequest)>>>>,
}

async fn handle_predict(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<PredictionRequest>,
) -> Json<serde_json::Value> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    if let Some(tx) = state.captured.lock().await.take() {
        let _ = tx.send((content_type, payload));
    }
    Json(serde_json::json!({
        "success": true,
        "crowd_level": "Medium",
        "suggestion": "Moderately busy - try after 15 minutes",
        "probabilities": { "High": 0.2, "Low": 0.1, "Medium": 0.7 }
    }))
}

async fn handle_options() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "machines": ["Bench Press", "Leg Press", "Treadmill"],
        "workout_plans": ["Cardio", "Strength"],
        "muscle_groups": ["Chest", "Legs"]
    }))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "model_loaded": false,
        "timestamp": "2024-05-01T10:00:00.000123"
    }))
}

async fn spawn_api_server(app: Router) -> std::io::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api"))
}

fn sample_request() -> PredictionRequest {
    PredictionRequest {
        machine_name: "Treadmill".to_string(),
        workout_day: "Friday".to_string(),
        workout_plan: "Cardio".to_string(),
        muscle_group: "Legs".to_string(),
        start_hour: 7,
        duration_min: 45,
    }
}

#[tokio::test]
async fn predict_posts_json_body_and_decodes_response() {
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        captured: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/api/predict", post(handle_predict))
        .with_state(state);
    let base_url = spawn_api_server(app).await.expect("spawn server");
    let api = HttpPredictionApi::new(&base_url).expect("client");

    let response = api.predict(&sample_request()).await.expect("predict");
    assert!(response.success);
    assert_eq!(response.crowd_level.as_deref(), Some("Medium"));
    let probabilities = response.probabilities.expect("probabilities");
    assert_eq!(probabilities.get("Medium"), Some(&0.7));

    let (content_type, payload) = rx.await.expect("captured request");
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(payload, sample_request());
}

#[tokio::test]
async fn predict_decodes_failure_body_from_error_status() {
    let app = Router::new().route(
        "/api/predict",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Model not loaded. Please ensure models are trained."
                })),
            )
        }),
    );
    let base_url = spawn_api_server(app).await.expect("spawn server");
    let api = HttpPredictionApi::new(&base_url).expect("client");

    let response = api.predict(&sample_request()).await.expect("predict");
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Model not loaded. Please ensure models are trained.")
    );
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let app = Router::new().route("/api/predict", post(|| async { "<html>oops</html>" }));
    let base_url = spawn_api_server(app).await.expect("spawn server");
    let api = HttpPredictionApi::new(&base_url).expect("client");

    let err = api.predict(&sample_request()).await.expect_err("must fail");
    assert!(matches!(err, ApiClientError::Decode { .. }), "{err}");
}

#[tokio::test]
async fn options_and_health_are_fetched_from_api_base() {
    let app = Router::new()
        .route("/api/options", get(handle_options))
        .route("/api/health", get(handle_health));
    let base_url = spawn_api_server(app).await.expect("spawn server");
    let api = HttpPredictionApi::new(&format!("{base_url}/")).expect("client");

    let options = api.options().await.expect("options");
    assert!(options.success);
    assert_eq!(
        options.machines.expect("machines"),
        ["Bench Press", "Leg Press", "Treadmill"]
    );

    let health = api.health().await.expect("health");
    assert!(!health.model_loaded);
    assert_eq!(health.status.as_deref(), Some("healthy"));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = HttpPredictionApi::new(&format!("http://{addr}/api")).expect("client");
    let err = api.health().await.expect_err("must fail");
    assert!(err.is_transport(), "{err}");
}

#[tokio::test]
async fn request_timeout_from_settings_ends_hung_requests() {
    let app = Router::new().route(
        "/api/health",
        get(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Json(serde_json::json!({ "model_loaded": true }))
        }),
    );
    let base_url = spawn_api_server(app).await.expect("spawn server");
    let settings = ClientSettings {
        api_base_url: base_url,
        request_timeout_secs: 1,
    };
    let api = HttpPredictionApi::from_settings(&settings).expect("client");

    let err = api.health().await.expect_err("must time out");
    assert!(err.is_transport(), "{err}");
}

#[test]
fn rejects_invalid_base_url() {
    assert!(matches!(
        HttpPredictionApi::new("gym server"),
        Err(ApiClientError::InvalidBaseUrl { .. })
    ));
}
