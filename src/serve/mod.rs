//! HTTP serving app.
//!
//! Loads the exported artifact pair and exposes three routes:
//!
//! - `GET /` and `POST /`: a minimal web form classifying free text (`form`)
//! - `GET /predict`: inline linear-regression predictions (`regression`)
//! - `GET /predict/remote`: the same contract, delegated to a hosted model
//!   endpoint
//!
//! Configuration (regression coefficients, optional remote endpoint) is read
//! from the environment exactly once at startup into immutable structs; the
//! handlers only ever see it through a shared [`AppState`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::error::AppError;
use crate::io::{load_artifacts, ArtifactPair};

pub mod form;
pub mod regression;

pub use regression::{RegressionConfig, RemoteModelConfig};

/// Serving configuration derived from CLI flags.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub addr: SocketAddr,
    pub artifacts_dir: PathBuf,
}

/// Shared state threaded through axum handlers.
pub struct AppState {
    /// Inline regression coefficients (from `BETA` / `INTERCEPT`).
    pub regression: RegressionConfig,
    /// Hosted model endpoint (from `MODEL_ENDPOINT_URL`), if configured.
    pub remote: Option<RemoteModelConfig>,
    /// The loaded feature-space/model pairing.
    pub artifacts: ArtifactPair,
    /// Async HTTP client for remote-model invocations.
    pub http: reqwest::Client,
}

/// Start the serving app and block until it exits.
pub fn run(config: &ServeConfig) -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let regression = RegressionConfig::from_env()?;
    let remote = RemoteModelConfig::from_env();
    let artifacts = load_artifacts(&config.artifacts_dir)?;
    info!(
        run_id = %artifacts.run_id,
        vocab = artifacts.feature_space.vocab_len(),
        "loaded artifact pair"
    );

    let state = Arc::new(AppState {
        regression,
        remote,
        artifacts,
        http: reqwest::Client::new(),
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::config(format!("Failed to start async runtime: {e}")))?;
    runtime.block_on(serve_async(config.addr, state))
}

async fn serve_async(addr: SocketAddr, state: Arc<AppState>) -> Result<(), AppError> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind {addr}: {e}")))?;
    info!(%addr, "serving predictions");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::external(format!("Server error: {e}")))
}

/// Build the route table.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(form::render).post(form::classify))
        .route("/predict", get(regression::inline))
        .route("/predict/remote", get(regression::remote))
        .with_state(state)
}
