//! HTTP oracle server.
//!
//! Serves quantum readings as JSON: raw samples are acquired through the
//! configured credential chain, classified, and returned together with their
//! buckets and majority vote.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};

use quantum_oracle_core::{
    AcquireError, ClassificationRequest, ClassificationResult, CredentialChain, DEFAULT_COUNT,
    DEFAULT_MAX, DEFAULT_MIN, KeyedSource, Reading, read_keyed,
};

/// Largest number of samples served per reading.
pub const MAX_READING_LENGTH: usize = 1024;

/// Shared server state.
pub struct OracleState {
    source: Arc<dyn KeyedSource>,
    chain: CredentialChain,
}

impl OracleState {
    pub fn new(source: Arc<dyn KeyedSource>, chain: CredentialChain) -> Self {
        Self { source, chain }
    }
}

#[derive(Deserialize)]
struct ReadingParams {
    length: Option<usize>,
    min: Option<i64>,
    max: Option<i64>,
    /// Unlocks the fallback credentials when the primary key fails.
    secret: Option<String>,
}

#[derive(Deserialize)]
struct ClassifyParams {
    /// Comma-separated raw bytes, e.g. `0,128,255`.
    data: Option<String>,
    min: Option<i64>,
    max: Option<i64>,
}

#[derive(Serialize)]
struct ReadingResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reading: Option<Reading>,
    /// Error message if request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ClassifyResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    source: String,
    fallbacks: usize,
}

fn failed_reading(status: StatusCode, error: String) -> (StatusCode, Json<ReadingResponse>) {
    (
        status,
        Json(ReadingResponse {
            success: false,
            reading: None,
            error: Some(error),
        }),
    )
}

fn failed_classify(error: String) -> (StatusCode, Json<ClassifyResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ClassifyResponse {
            success: false,
            result: None,
            error: Some(error),
        }),
    )
}

fn bounds(min: Option<i64>, max: Option<i64>) -> Result<(i64, i64), String> {
    let min = min.unwrap_or(DEFAULT_MIN);
    let max = max.unwrap_or(DEFAULT_MAX);
    if min > max {
        return Err(format!("min ({min}) must not exceed max ({max})"));
    }
    Ok((min, max))
}

async fn handle_reading(
    State(state): State<Arc<OracleState>>,
    Query(params): Query<ReadingParams>,
) -> (StatusCode, Json<ReadingResponse>) {
    let length = params
        .length
        .unwrap_or(DEFAULT_COUNT)
        .clamp(1, MAX_READING_LENGTH);
    let (min, max) = match bounds(params.min, params.max) {
        Ok(b) => b,
        Err(e) => return failed_reading(StatusCode::BAD_REQUEST, e),
    };
    let request = ClassificationRequest::new(length, min, max);
    let secret = params.secret;

    let worker = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        read_keyed(
            worker.source.as_ref(),
            &worker.chain,
            request,
            secret.as_deref(),
        )
    })
    .await;

    match outcome {
        Ok(Ok(reading)) => (
            StatusCode::OK,
            Json(ReadingResponse {
                success: true,
                reading: Some(reading),
                error: None,
            }),
        ),
        Ok(Err(err)) => {
            log::warn!("reading failed: {}", err.cause());
            let status = match err {
                AcquireError::Locked { .. } => StatusCode::FORBIDDEN,
                AcquireError::Exhausted { .. } => StatusCode::BAD_GATEWAY,
            };
            failed_reading(status, err.to_string())
        }
        Err(join_err) => {
            log::error!("reading task panicked: {join_err}");
            failed_reading(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            )
        }
    }
}

/// Parse `"0, 128,255"` into bytes.
fn parse_bytes(data: &str) -> Result<Vec<u8>, String> {
    data.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .map_err(|_| format!("'{s}' is not a byte value (0-255)"))
        })
        .collect()
}

async fn handle_classify(Query(params): Query<ClassifyParams>) -> (StatusCode, Json<ClassifyResponse>) {
    let (min, max) = match bounds(params.min, params.max) {
        Ok(b) => b,
        Err(e) => return failed_classify(e),
    };
    let raw = match parse_bytes(params.data.as_deref().unwrap_or("")) {
        Ok(raw) => raw,
        Err(e) => return failed_classify(e),
    };
    if raw.len() > MAX_READING_LENGTH {
        return failed_classify(format!(
            "at most {MAX_READING_LENGTH} samples per request"
        ));
    }
    let result = ClassificationRequest::new(raw.len(), min, max).run(&raw);
    (
        StatusCode::OK,
        Json(ClassifyResponse {
            success: true,
            result: Some(result),
            error: None,
        }),
    )
}

async fn handle_health(State(state): State<Arc<OracleState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        source: state.source.name().to_string(),
        fallbacks: state.chain.fallbacks().len(),
    })
}

async fn handle_index(State(state): State<Arc<OracleState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Quantum Oracle Server",
        "version": quantum_oracle_core::VERSION,
        "source": state.source.name(),
        "endpoints": {
            "/": "This API index",
            "/api/v1/reading": {
                "method": "GET",
                "description": "Acquire quantum samples, classify them, and vote",
                "params": {
                    "length": format!("Number of samples (1-{MAX_READING_LENGTH}, default: {DEFAULT_COUNT})"),
                    "min": format!("Lower bound of the rescaled range (default: {DEFAULT_MIN})"),
                    "max": format!("Upper bound of the rescaled range (default: {DEFAULT_MAX})"),
                    "secret": "Unlocks fallback API keys if the primary key fails",
                }
            },
            "/api/v1/classify": {
                "method": "GET",
                "description": "Classify caller-supplied bytes without contacting the source",
                "params": {
                    "data": "Comma-separated bytes (0-255)",
                    "min": "Lower bound (default: 0)",
                    "max": "Upper bound (default: 100)",
                }
            },
            "/health": "Health check",
        },
        "examples": {
            "reading": "/api/v1/reading?length=3",
            "custom_range": "/api/v1/reading?length=5&min=-10&max=10",
            "classify": "/api/v1/classify?data=0,128,255",
        }
    }))
}

/// Build the axum router.
pub fn build_router(state: OracleState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/api/v1/reading", get(handle_reading))
        .route("/api/v1/classify", get(handle_classify))
        .route("/health", get(handle_health))
        .with_state(Arc::new(state))
}

/// Run the HTTP oracle server until the listener fails.
pub async fn run_server(state: OracleState, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, app).await
}
