//! pscan-ca library interface
//!
//! Cry analysis service: decodes uploaded infant-cry recordings, extracts
//! acoustic features and combines them with a caregiver questionnaire into
//! a dehydration / throat-pain risk assessment.

pub mod api;
pub mod assessment;
pub mod error;
pub mod features;
pub mod ingest;
pub mod pipeline;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use pscan_common::config::ServiceConfig;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::features::FeatureExtractor;
use crate::ingest::{AudioIngestor, IngestError};
use crate::pipeline::CryAnalyzer;

/// Startup failures while assembling the service
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Invalid CORS origin '{0}'")]
    InvalidOrigin(String),
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<CryAnalyzer>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(analyzer: CryAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            startup_time: Utc::now(),
        }
    }

    /// Build state from validated configuration
    ///
    /// # Errors
    /// Fails when ffmpeg is required but unavailable.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, StartupError> {
        let ingestor = AudioIngestor::from_config(&config.decoder)?;
        let extractor = FeatureExtractor::from_config(&config.analysis);
        Ok(Self::new(CryAnalyzer::new(ingestor, extractor)))
    }
}

/// Cross-origin policy: explicit origins, credentials allowed
fn cors_layer(origins: &[String]) -> Result<CorsLayer, StartupError> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| StartupError::InvalidOrigin(origin.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Build application router
///
/// # Errors
/// Fails when a configured CORS origin is not a valid header value.
pub fn build_router(state: AppState, config: &ServiceConfig) -> Result<Router, StartupError> {
    let router = Router::new()
        .merge(api::health_routes())
        .merge(api::cry_analysis_routes())
        .merge(api::assessment_routes())
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(cors_layer(&config.cors.allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}
