//! Risk assessment endpoint
//!
//! POST /api/assess takes the questionnaire as top-level fields alongside
//! the baby's age, cry features and medical-record metadata.

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assessment::{self, AssessmentResult, ObservedFeatures, QuestionnaireAnswers};
use crate::error::ApiResult;
use crate::AppState;

/// Assessment request body
#[derive(Debug, Deserialize)]
pub struct AssessmentRequest {
    pub baby_age_months: i64,
    #[serde(default)]
    pub cry_features: ObservedFeatures,
    #[serde(default)]
    pub has_medical_records: bool,
    #[serde(default)]
    pub medical_records_name: Option<String>,
    #[serde(flatten)]
    pub answers: QuestionnaireAnswers,
}

/// Assessment result plus echoed request metadata
#[derive(Debug, Serialize)]
pub struct AssessmentReport {
    #[serde(flatten)]
    pub result: AssessmentResult,
    pub baby_age_months: i64,
    pub has_medical_records: bool,
    pub medical_records_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InputSummary {
    pub baby_age_months: i64,
    pub wet_diapers: Option<String>,
    pub medical_records_uploaded: bool,
    /// Questionnaire keys answered "yes", excluding `wet_diapers`
    pub key_symptoms: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub success: bool,
    pub assessment: AssessmentReport,
    pub input_summary: InputSummary,
}

/// POST /api/assess
pub async fn assess(
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> ApiResult<Json<AssessmentResponse>> {
    let Json(request) = payload?;

    let result = assessment::assess(&request.answers, &request.cry_features);

    info!(
        baby_age_months = request.baby_age_months,
        dehydration_score = result.dehydration_score,
        throat_score = result.throat_score,
        risk = result.dehydration_risk.as_str(),
        "Assessment complete"
    );

    let input_summary = InputSummary {
        baby_age_months: request.baby_age_months,
        wet_diapers: request.answers.wet_diapers.clone(),
        medical_records_uploaded: request.has_medical_records,
        key_symptoms: request.answers.affirmed(),
    };

    Ok(Json(AssessmentResponse {
        success: true,
        assessment: AssessmentReport {
            result,
            baby_age_months: request.baby_age_months,
            has_medical_records: request.has_medical_records,
            medical_records_name: request.medical_records_name,
        },
        input_summary,
    }))
}

/// Build assessment routes
pub fn assessment_routes() -> Router<AppState> {
    Router::new().route("/api/assess", post(assess))
}
