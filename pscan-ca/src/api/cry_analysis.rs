//! Cry recording upload and analysis
//!
//! POST /api/cry-analyze accepts a multipart form with the recording in the
//! `audio` field and answers with the extracted [`CryFeatures`].

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::features::CryFeatures;
use crate::ingest::is_audio_media_type;
use crate::AppState;

/// Multipart field carrying the recording
pub const AUDIO_FIELD: &str = "audio";

/// Cry analysis response
#[derive(Debug, Serialize)]
pub struct CryAnalysisResponse {
    pub success: bool,
    pub cry_features: CryFeatures,
    pub message: &'static str,
}

/// The `audio` part of the form, validated
struct AudioUpload {
    media_type: String,
    bytes: Vec<u8>,
}

/// Pull the `audio` field out of the form
///
/// **Validation order:** field present, declared type is `audio/*`, content
/// non-empty.
async fn read_audio_field(mut multipart: Multipart) -> ApiResult<AudioUpload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let media_type = field.content_type().unwrap_or_default().to_string();
        if !is_audio_media_type(&media_type) {
            return Err(ApiError::Validation(
                "Invalid file type. Please upload an audio file.".to_string(),
            ));
        }

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::Validation("Empty audio file received".to_string()));
        }

        return Ok(AudioUpload {
            media_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::Validation(format!(
        "Missing '{}' file field in multipart form",
        AUDIO_FIELD
    )))
}

async fn analyze_upload(state: AppState, multipart: Multipart) -> ApiResult<Json<CryAnalysisResponse>> {
    let upload = read_audio_field(multipart).await?;
    info!(
        bytes = upload.bytes.len(),
        media_type = %upload.media_type,
        "Received cry recording"
    );

    let cry_features = state
        .analyzer
        .analyze(upload.bytes, &upload.media_type)
        .await?;

    Ok(Json(CryAnalysisResponse {
        success: true,
        cry_features,
        message: "Audio analysis completed successfully",
    }))
}

/// POST /api/cry-analyze
pub async fn analyze_cry(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<CryAnalysisResponse>> {
    let request_id = Uuid::new_v4();
    analyze_upload(state, multipart?)
        .instrument(info_span!("cry_analysis", %request_id))
        .await
}

/// Build cry analysis routes
pub fn cry_analysis_routes() -> Router<AppState> {
    Router::new().route("/api/cry-analyze", post(analyze_cry))
}
