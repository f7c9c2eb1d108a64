//! Error types for pscan-ca
//!
//! Client errors carry a user-facing message. Internal errors are logged in
//! full and answered with a generic message.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::features::FeatureError;
use crate::ingest::IngestError;
use crate::pipeline::AnalysisError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request (400)
    #[error("{0}")]
    Validation(String),

    /// Upload could not be decoded as audio (400)
    #[error("{0}")]
    Decode(String),

    /// Decoder needed for this upload is not installed (400)
    #[error("{0}")]
    DecoderUnavailable(String),

    /// Decoded audio holds no usable samples (400)
    #[error("{0}")]
    EmptySignal(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Decode(_) => "DECODE_ERROR",
            ApiError::DecoderUnavailable(_) => "DECODER_UNAVAILABLE",
            ApiError::EmptySignal(_) => "EMPTY_SIGNAL",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match self {
            ApiError::Internal(detail) => {
                error!(code, detail = %detail, "Request failed");
                "Internal error while processing the request".to_string()
            }
            ApiError::Validation(msg)
            | ApiError::Decode(msg)
            | ApiError::DecoderUnavailable(msg)
            | ApiError::EmptySignal(msg) => {
                warn!(code, message = %msg, "Request rejected");
                msg
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Ingest(IngestError::DecoderUnavailable { dependency, reason }) => {
                ApiError::DecoderUnavailable(format!(
                    "This audio format needs {dependency}, which is not installed on the server \
                     (install ffmpeg: https://ffmpeg.org/download.html). Detail: {reason}"
                ))
            }
            AnalysisError::Ingest(IngestError::Decode(_)) => ApiError::Decode(
                "Audio processing failed: the upload is not decodable audio. \
                 Make sure the recording is complete and ffmpeg is installed."
                    .to_string(),
            ),
            AnalysisError::Ingest(IngestError::TimedOut(limit)) => ApiError::Decode(format!(
                "Audio processing failed: decoding took longer than {} seconds",
                limit.as_secs()
            )),
            AnalysisError::Ingest(err @ (IngestError::Io(_) | IngestError::Worker(_))) => {
                ApiError::Internal(err.to_string())
            }
            AnalysisError::Features(
                err @ (FeatureError::EmptySignal | FeatureError::NonFiniteSample { .. }),
            ) => ApiError::EmptySignal(format!(
                "Audio processing failed: {}. Make sure the recording contains sound \
                 and ffmpeg is installed.",
                err
            )),
            AnalysisError::Features(err @ FeatureError::InvalidSampleRate(_)) => {
                ApiError::Internal(err.to_string())
            }
            AnalysisError::Worker(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Validation(format!("Invalid multipart form: {}", err.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
