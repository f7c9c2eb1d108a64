//! Audio ingestion: uploaded bytes to mono PCM at the analysis rate
//!
//! **Pipeline:**
//! 1. Write the upload to a scoped temporary file (removed on drop, including
//!    timeout and request cancellation)
//! 2. Decode natively with symphonia, then resample to 22,050 Hz
//! 3. If the native decoder fails and ffmpeg is available, transcode with
//!    ffmpeg straight to 22,050 Hz mono
//!
//! Decodes are bounded by a semaphore and a wall-clock timeout. The permit
//! travels with the blocking decode and resample work, so a timed-out request
//! keeps its slot until that work has actually finished.

pub mod decoder;
pub mod ffmpeg;
pub mod resampler;

use pscan_common::config::{DecoderConfig, TARGET_SAMPLE_RATE};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use self::ffmpeg::{FfmpegTranscoder, FFMPEG};

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// A decoder the upload needs is not installed
    #[error("{dependency} is required to decode this audio but is unavailable: {reason}")]
    DecoderUnavailable {
        dependency: &'static str,
        reason: String,
    },

    /// The upload is not decodable audio
    #[error("Could not decode audio: {0}")]
    Decode(String),

    #[error("Audio decoding timed out after {0:?}")]
    TimedOut(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task panicked or the decode pool shut down
    #[error("Decode worker failed: {0}")]
    Worker(String),
}

/// Which decoder produced the samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderBackend {
    Symphonia,
    Ffmpeg,
}

impl DecoderBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecoderBackend::Symphonia => "symphonia",
            DecoderBackend::Ffmpeg => "ffmpeg",
        }
    }
}

/// Mono f32 PCM ready for feature extraction
#[derive(Debug)]
pub struct DecodedPcm {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub backend: DecoderBackend,
}

/// Turns uploaded audio bytes into [`DecodedPcm`]
///
/// Built once at startup; ffmpeg is resolved eagerly so a missing binary
/// is reported before the first request.
#[derive(Debug)]
pub struct AudioIngestor {
    ffmpeg: Option<FfmpegTranscoder>,
    decode_timeout: Duration,
    permits: Arc<Semaphore>,
    scratch_dir: Option<PathBuf>,
}

impl AudioIngestor {
    /// Build the ingestor from the `[decoder]` config section
    ///
    /// # Errors
    /// `DecoderUnavailable` when ffmpeg is required but cannot be resolved
    /// or executed.
    pub fn from_config(config: &DecoderConfig) -> Result<Self, IngestError> {
        let ffmpeg = if config.ffmpeg_enabled {
            match FfmpegTranscoder::locate(config.ffmpeg_path.as_deref()) {
                Ok(transcoder) => {
                    info!(
                        binary = %transcoder.binary().display(),
                        version = transcoder.version(),
                        "ffmpeg fallback available"
                    );
                    Some(transcoder)
                }
                Err(e) if config.require_ffmpeg => return Err(e),
                Err(e) => {
                    warn!(
                        "{}; WebM/Opus uploads will be rejected with DECODER_UNAVAILABLE",
                        e
                    );
                    None
                }
            }
        } else {
            info!("ffmpeg fallback disabled by configuration");
            None
        };

        Ok(Self {
            ffmpeg,
            decode_timeout: config.decode_timeout(),
            permits: Arc::new(Semaphore::new(config.max_concurrent_decodes.max(1))),
            scratch_dir: config.scratch_dir.clone(),
        })
    }

    pub fn ffmpeg_available(&self) -> bool {
        self.ffmpeg.is_some()
    }

    /// Decode slots not currently held by a running decode
    pub fn idle_decode_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Decode an upload to mono PCM at [`TARGET_SAMPLE_RATE`]
    ///
    /// # Arguments
    /// * `bytes` - Raw upload content
    /// * `media_type` - Declared content type, used as a container hint
    ///
    /// # Errors
    /// * `Decode` for empty, corrupt or unrecognized content
    /// * `DecoderUnavailable` when only ffmpeg could decode the content
    /// * `TimedOut` when decoding exceeds the configured timeout
    pub async fn ingest(&self, bytes: Vec<u8>, media_type: &str) -> Result<DecodedPcm, IngestError> {
        if bytes.is_empty() {
            return Err(IngestError::Decode("upload is empty".to_string()));
        }

        if self.permits.available_permits() == 0 {
            debug!("All decode slots busy, waiting");
        }
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| IngestError::Worker(e.to_string()))?;

        let upload = self.scoped_file(media_type)?;
        tokio::fs::write(upload.path(), &bytes).await?;

        debug!(
            path = %upload.path().display(),
            bytes = bytes.len(),
            media_type,
            "Upload staged for decoding"
        );

        let decoded = tokio::time::timeout(
            self.decode_timeout,
            self.decode_path(upload.path(), permit),
        )
        .await
        .map_err(|_| IngestError::TimedOut(self.decode_timeout))??;

        debug!(
            backend = decoded.backend.as_str(),
            samples = decoded.samples.len(),
            "Upload decoded"
        );

        Ok(decoded)
        // `upload` dropped here; the temporary file is removed
    }

    fn scoped_file(&self, media_type: &str) -> Result<tempfile::NamedTempFile, IngestError> {
        let suffix = extension_for(media_type)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let mut builder = tempfile::Builder::new();
        builder.prefix("pscan-").suffix(&suffix);

        let file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }

    /// Decode the staged upload while holding `permit`
    ///
    /// The permit moves into each blocking closure and back out, so it is
    /// released only when the CPU work ends, even if this future is dropped.
    async fn decode_path(
        &self,
        path: &Path,
        permit: OwnedSemaphorePermit,
    ) -> Result<DecodedPcm, IngestError> {
        let owned = path.to_path_buf();
        let (native, permit) =
            tokio::task::spawn_blocking(move || (decoder::decode_file(&owned), permit))
                .await
                .map_err(|e| IngestError::Worker(e.to_string()))?;

        match native {
            Ok(audio) => {
                let source_rate = audio.sample_rate;
                let samples = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    resampler::resample_mono(audio.samples, source_rate, TARGET_SAMPLE_RATE)
                })
                .await
                .map_err(|e| IngestError::Worker(e.to_string()))??;

                Ok(DecodedPcm {
                    samples,
                    sample_rate: TARGET_SAMPLE_RATE,
                    backend: DecoderBackend::Symphonia,
                })
            }
            Err(native_err) => match &self.ffmpeg {
                Some(ffmpeg) => {
                    debug!(error = %native_err, "Native decode failed, falling back to ffmpeg");
                    // Child is killed on drop, so the slot can go with this future
                    let _permit = permit;
                    let samples = ffmpeg.transcode(path, TARGET_SAMPLE_RATE).await?;
                    Ok(DecodedPcm {
                        samples,
                        sample_rate: TARGET_SAMPLE_RATE,
                        backend: DecoderBackend::Ffmpeg,
                    })
                }
                None if native_err.is_unsupported() => Err(IngestError::DecoderUnavailable {
                    dependency: FFMPEG,
                    reason: native_err.to_string(),
                }),
                None => Err(IngestError::Decode(native_err.to_string())),
            },
        }
    }
}

/// True for `audio/*` media types (parameters ignored)
pub fn is_audio_media_type(media_type: &str) -> bool {
    essence(media_type).starts_with("audio/")
}

/// File extension hint for a declared audio media type
pub fn extension_for(media_type: &str) -> Option<&'static str> {
    match essence(media_type).as_str() {
        "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => Some("wav"),
        "audio/webm" => Some("webm"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/ogg" | "audio/opus" => Some("ogg"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/mp4" | "audio/x-m4a" | "audio/aac" => Some("m4a"),
        _ => None,
    }
}

/// Lowercased `type/subtype` without parameters such as `;codecs=opus`
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_media_type_detection() {
        assert!(is_audio_media_type("audio/webm"));
        assert!(is_audio_media_type("audio/webm;codecs=opus"));
        assert!(is_audio_media_type("Audio/WAV"));
        assert!(!is_audio_media_type("text/plain"));
        assert!(!is_audio_media_type("application/octet-stream"));
        assert!(!is_audio_media_type(""));
    }

    #[test]
    fn test_extension_hints() {
        assert_eq!(extension_for("audio/webm;codecs=opus"), Some("webm"));
        assert_eq!(extension_for("audio/wav"), Some("wav"));
        assert_eq!(extension_for("audio/x-wav"), Some("wav"));
        assert_eq!(extension_for("audio/mpeg"), Some("mp3"));
        assert_eq!(extension_for("audio/x-m4a"), Some("m4a"));
        assert_eq!(extension_for("audio/unknown"), None);
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let config = DecoderConfig {
            ffmpeg_enabled: false,
            require_ffmpeg: false,
            ..Default::default()
        };
        let ingestor = AudioIngestor::from_config(&config).unwrap();
        assert!(!ingestor.ffmpeg_available());

        let err = ingestor.ingest(Vec::new(), "audio/wav").await.unwrap_err();
        assert!(matches!(err, IngestError::Decode(_)));
    }

    #[test]
    fn test_required_ffmpeg_missing_fails_fast() {
        let config = DecoderConfig {
            ffmpeg_path: Some(PathBuf::from("/nonexistent/bin/ffmpeg")),
            ..Default::default()
        };
        let err = AudioIngestor::from_config(&config).unwrap_err();
        assert!(matches!(err, IngestError::DecoderUnavailable { .. }));
    }

    #[test]
    fn test_optional_ffmpeg_missing_degrades() {
        let config = DecoderConfig {
            ffmpeg_path: Some(PathBuf::from("/nonexistent/bin/ffmpeg")),
            require_ffmpeg: false,
            ..Default::default()
        };
        let ingestor = AudioIngestor::from_config(&config).unwrap();
        assert!(!ingestor.ffmpeg_available());
    }
}
