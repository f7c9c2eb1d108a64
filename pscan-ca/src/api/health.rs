//! Liveness and health endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Service name reported by `GET /`
pub const SERVICE_NAME: &str = "PediaScan API";

/// Liveness response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build identification captured by build.rs
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            git_hash: env!("GIT_HASH"),
            build_timestamp: env!("BUILD_TIMESTAMP"),
            build_profile: env!("BUILD_PROFILE"),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: &'static str,
    /// Module name ("pscan-ca")
    pub module: &'static str,
    /// Crate version from Cargo.toml
    pub version: &'static str,
    pub build: BuildInfo,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether WebM/Opus uploads can be transcoded
    pub ffmpeg_available: bool,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "online",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok",
        module: "pscan-ca",
        version: env!("CARGO_PKG_VERSION"),
        build: BuildInfo::current(),
        uptime_seconds,
        ffmpeg_available: state.analyzer.ffmpeg_available(),
    })
}

/// Build liveness and health routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}
