//! Cry analysis pipeline: upload bytes to [`CryFeatures`]

use thiserror::Error;
use tracing::info;

use crate::features::{CryFeatures, FeatureError, FeatureExtractor};
use crate::ingest::{AudioIngestor, IngestError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error("Feature extraction worker failed: {0}")]
    Worker(String),
}

/// Decode then extract, sharing one ingestor across requests
#[derive(Debug)]
pub struct CryAnalyzer {
    ingestor: AudioIngestor,
    extractor: FeatureExtractor,
}

impl CryAnalyzer {
    pub fn new(ingestor: AudioIngestor, extractor: FeatureExtractor) -> Self {
        Self {
            ingestor,
            extractor,
        }
    }

    pub fn ffmpeg_available(&self) -> bool {
        self.ingestor.ffmpeg_available()
    }

    /// Analyze one uploaded recording
    ///
    /// Extraction is CPU-bound and runs on the blocking pool.
    pub async fn analyze(&self, bytes: Vec<u8>, media_type: &str) -> Result<CryFeatures, AnalysisError> {
        let upload_bytes = bytes.len();
        let pcm = self.ingestor.ingest(bytes, media_type).await?;
        let backend = pcm.backend;

        let extractor = self.extractor;
        let features = tokio::task::spawn_blocking(move || extractor.extract(&pcm.samples, pcm.sample_rate))
            .await
            .map_err(|e| AnalysisError::Worker(e.to_string()))??;

        info!(
            upload_bytes,
            media_type,
            decoder = backend.as_str(),
            duration_seconds = features.duration_seconds,
            cry_silence_ratio = features.cry_silence_ratio,
            "Cry analysis complete"
        );

        Ok(features)
    }
}
