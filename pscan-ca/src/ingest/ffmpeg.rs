//! ffmpeg transcoding fallback
//!
//! Used for containers and codecs the native decoder does not handle
//! (notably WebM/Opus from browser `MediaRecorder`). ffmpeg writes mono
//! little-endian f32 PCM at the requested rate to stdout, so no second
//! temporary file is needed.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use super::IngestError;

/// Name of the external dependency, as reported to users
pub const FFMPEG: &str = "ffmpeg";

/// Resolved and probed ffmpeg binary
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
    version: String,
}

impl FfmpegTranscoder {
    /// Resolve the ffmpeg binary and confirm it runs
    ///
    /// `configured` takes precedence over a `PATH` search. Runs
    /// `ffmpeg -version` synchronously; call at startup only.
    pub fn locate(configured: Option<&Path>) -> Result<Self, IngestError> {
        let binary = match configured {
            Some(path) => path.to_path_buf(),
            None => which::which(FFMPEG).map_err(|e| IngestError::DecoderUnavailable {
                dependency: FFMPEG,
                reason: format!("not found on PATH ({})", e),
            })?,
        };

        let output = std::process::Command::new(&binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| IngestError::DecoderUnavailable {
                dependency: FFMPEG,
                reason: format!("cannot execute {}: {}", binary.display(), e),
            })?;

        if !output.status.success() {
            return Err(IngestError::DecoderUnavailable {
                dependency: FFMPEG,
                reason: format!("{} -version exited with {}", binary.display(), output.status),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("unknown version")
            .trim()
            .to_string();

        Ok(Self { binary, version })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Transcode `input` to mono f32 samples at `sample_rate`
    ///
    /// The child is killed if this future is dropped (timeout or request
    /// cancellation).
    pub async fn transcode(&self, input: &Path, sample_rate: u32) -> Result<Vec<f32>, IngestError> {
        debug!(input = %input.display(), sample_rate, "Transcoding with ffmpeg");

        let output = Command::new(&self.binary)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-i"])
            .arg(input)
            .args(["-vn", "-ac", "1", "-ar"])
            .arg(sample_rate.to_string())
            .args(["-f", "f32le", "-acodec", "pcm_f32le", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| IngestError::Worker(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, stderr = %stderr.trim(), "ffmpeg rejected upload");
            return Err(IngestError::Decode(
                "ffmpeg could not decode the upload (unsupported or corrupt audio)".to_string(),
            ));
        }

        Ok(pcm_f32le_to_samples(&output.stdout))
    }
}

/// Interpret raw little-endian f32 bytes; a trailing partial sample is dropped
fn pcm_f32le_to_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_conversion() {
        let mut bytes = Vec::new();
        for v in [0.5f32, -0.25, 1.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.push(0xFF);

        assert_eq!(pcm_f32le_to_samples(&bytes), vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn test_locate_nonexistent_binary() {
        let err = FfmpegTranscoder::locate(Some(Path::new("/nonexistent/bin/ffmpeg"))).unwrap_err();
        assert!(matches!(
            err,
            IngestError::DecoderUnavailable { dependency: FFMPEG, .. }
        ));
    }
}
