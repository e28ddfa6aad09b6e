//! Linear-regression prediction endpoints.
//!
//! Both endpoints accept a comma-separated `x` query parameter and answer with
//! the same JSON envelope:
//!
//! ```text
//! {
//!   "data": { "predictions": [...] },
//!   "metadata": { "eventId": "...", "serverTimestamp": 1712.., "time": 0.0012 }
//! }
//! ```
//!
//! The inline variant computes `y = INTERCEPT + BETA * x` locally; the remote
//! variant POSTs `[[x0], [x1], ...]` to a hosted model endpoint and relays the
//! decoded predictions. Every response (including errors) carries a permissive
//! CORS header so the endpoints stay callable across origins.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::serve::AppState;

/// Immutable regression coefficients, read once at process start.
#[derive(Debug, Clone, Copy)]
pub struct RegressionConfig {
    pub beta: f64,
    pub intercept: f64,
}

impl RegressionConfig {
    /// Read `BETA` and `INTERCEPT` from the environment. Both are required.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            beta: env_f64("BETA")?,
            intercept: env_f64("INTERCEPT")?,
        })
    }
}

/// Hosted model endpoint configuration.
#[derive(Debug, Clone)]
pub struct RemoteModelConfig {
    pub endpoint_url: String,
}

impl RemoteModelConfig {
    /// Read `MODEL_ENDPOINT_URL` from the environment; `None` when unset.
    pub fn from_env() -> Option<Self> {
        std::env::var("MODEL_ENDPOINT_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|endpoint_url| Self { endpoint_url })
    }
}

fn env_f64(name: &str) -> Result<f64, AppError> {
    let raw = std::env::var(name)
        .map_err(|_| AppError::config(format!("Missing {name} in environment (.env).")))?;
    raw.trim()
        .parse()
        .map_err(|_| AppError::config(format!("Invalid {name} value '{raw}': expected a number.")))
}

/// Apply `y = intercept + beta * x` to each input, preserving order.
pub fn run_regression(config: &RegressionConfig, xs: &[f64]) -> Vec<f64> {
    xs.iter().map(|x| config.intercept + config.beta * x).collect()
}

/// Parse a comma-separated list of numbers.
pub fn parse_inputs(raw: &str) -> Result<Vec<f64>, AppError> {
    let mut out = Vec::new();
    for part in raw.split(',') {
        let trimmed = part.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| AppError::data(format!("Invalid numeric input '{trimmed}'.")))?;
        out.push(value);
    }
    if out.is_empty() {
        return Err(AppError::data("Empty prediction input."));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub data: PredictionData,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
pub struct PredictionData {
    pub predictions: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMetadata {
    #[serde(rename = "eventId")]
    pub event_id: Uuid,
    /// Server wall-clock time, epoch milliseconds.
    #[serde(rename = "serverTimestamp")]
    pub server_timestamp: i64,
    /// Elapsed processing time, seconds.
    pub time: f64,
}

/// Wrap predictions in the response envelope.
pub fn wrap_predictions(predictions: Vec<f64>, started: Instant) -> PredictionResponse {
    PredictionResponse {
        data: PredictionData { predictions },
        metadata: ResponseMetadata {
            event_id: Uuid::new_v4(),
            server_timestamp: Utc::now().timestamp_millis(),
            time: started.elapsed().as_secs_f64(),
        },
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /predict?x=1,2,3` — inline regression.
pub async fn inline(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let started = Instant::now();
    match extract_inputs(&params) {
        Ok(xs) => {
            let predictions = run_regression(&state.regression, &xs);
            ok_json(wrap_predictions(predictions, started))
        }
        Err(err) => error_json(StatusCode::BAD_REQUEST, &err),
    }
}

/// `GET /predict/remote?x=1,2,3` — delegate to the hosted model endpoint.
pub async fn remote(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let xs = match extract_inputs(&params) {
        Ok(xs) => xs,
        Err(err) => return error_json(StatusCode::BAD_REQUEST, &err),
    };

    let Some(remote) = &state.remote else {
        return error_json(
            StatusCode::SERVICE_UNAVAILABLE,
            &AppError::config("MODEL_ENDPOINT_URL is not configured."),
        );
    };

    match invoke_remote(&state.http, remote, &xs).await {
        Ok(predictions) => ok_json(wrap_predictions(predictions, started)),
        Err(err) => error_json(StatusCode::BAD_GATEWAY, &err),
    }
}

fn extract_inputs(params: &HashMap<String, String>) -> Result<Vec<f64>, AppError> {
    let raw = params
        .get("x")
        .ok_or_else(|| AppError::data("Missing query parameter 'x'."))?;
    parse_inputs(raw)
}

/// Send `[[x0], [x1], ...]` to the hosted endpoint and decode the predictions.
async fn invoke_remote(
    client: &reqwest::Client,
    remote: &RemoteModelConfig,
    xs: &[f64],
) -> Result<Vec<f64>, AppError> {
    let payload: Vec<[f64; 1]> = xs.iter().map(|&x| [x]).collect();
    let resp = client
        .post(&remote.endpoint_url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| AppError::external(format!("Model endpoint request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::external(format!(
            "Model endpoint answered with status {}.",
            resp.status()
        )));
    }

    resp.json()
        .await
        .map_err(|e| AppError::external(format!("Failed to decode model endpoint response: {e}")))
}

fn ok_json<T: Serialize>(body: T) -> Response {
    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(body),
    )
        .into_response()
}

fn error_json(status: StatusCode, err: &AppError) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(serde_json::json!({ "error": err.message() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_matches_the_documented_example() {
        let config = RegressionConfig {
            beta: 2.0,
            intercept: 1.0,
        };
        assert_eq!(run_regression(&config, &[10.0]), vec![21.0]);
    }

    #[test]
    fn regression_preserves_order_and_length() {
        let config = RegressionConfig {
            beta: -0.5,
            intercept: 3.0,
        };
        let xs = [4.0, 0.0, -2.0, 10.0];
        let ys = run_regression(&config, &xs);
        assert_eq!(ys.len(), xs.len());
        assert_eq!(ys, vec![1.0, 3.0, 4.0, -2.0]);
    }

    #[test]
    fn inputs_parse_in_order() {
        assert_eq!(parse_inputs("10").unwrap(), vec![10.0]);
        assert_eq!(parse_inputs("1, 2.5 ,-3").unwrap(), vec![1.0, 2.5, -3.0]);
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        assert!(parse_inputs("").is_err());
        assert!(parse_inputs("1,,2").is_err());
        assert!(parse_inputs("1,abc").is_err());
    }

    #[test]
    fn missing_query_parameter_is_rejected() {
        let params = HashMap::new();
        let err = extract_inputs(&params).unwrap_err();
        assert!(err.message().contains("'x'"));
    }

    #[test]
    fn envelope_uses_the_wire_field_names() {
        let started = Instant::now();
        let response = wrap_predictions(vec![21.0], started);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["data"]["predictions"][0], 21.0);
        assert!(value["metadata"]["eventId"].is_string());
        assert!(value["metadata"]["serverTimestamp"].is_i64());
        assert!(value["metadata"]["time"].is_number());
    }
}
