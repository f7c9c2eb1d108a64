//! Test Helper Utilities
//!
//! Shared utilities for testing pscan-ca

#![allow(dead_code)]

pub mod audio_generator;

pub use audio_generator::{generate_test_wav, wav_bytes, AudioConfig};

use std::path::{Path, PathBuf};

use pscan_common::config::DecoderConfig;

/// Decoder settings that never touch ffmpeg, so tests run on hosts without it
pub fn native_only_decoder() -> DecoderConfig {
    DecoderConfig {
        ffmpeg_enabled: false,
        require_ffmpeg: false,
        ..Default::default()
    }
}

/// Build a `multipart/form-data` body with a single file field
///
/// # Returns
/// (content-type header value, body bytes)
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "pscan-test-boundary-7MA4YWxkTrZu0gW";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    (format!("multipart/form-data; boundary={}", boundary), body)
}

/// How a stand-in ffmpeg answers a transcode request
pub enum StubTranscode {
    /// Write these samples to stdout as f32le
    Samples(Vec<f32>),
    /// Print to stderr and exit 1
    Reject,
}

/// Write an executable shell script that behaves like ffmpeg
///
/// It answers `-version` and handles any other invocation per `behavior`,
/// so the ffmpeg fallback can be driven without ffmpeg installed.
#[cfg(unix)]
pub fn stub_ffmpeg(dir: &Path, behavior: StubTranscode) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let transcode = match behavior {
        StubTranscode::Samples(samples) => {
            let pcm = dir.join("stub-output.f32le");
            let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
            std::fs::write(&pcm, bytes).unwrap();
            format!("cat '{}'", pcm.display())
        }
        StubTranscode::Reject => {
            "echo 'Invalid data found when processing input' >&2\nexit 1".to_string()
        }
    };

    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"-version\" ]; then\n  echo 'ffmpeg version stub'\n  exit 0\nfi\n{}\n",
        transcode
    );

    let path = dir.join("ffmpeg");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Decoder settings that use the given ffmpeg binary
pub fn decoder_with_ffmpeg(binary: PathBuf) -> DecoderConfig {
    DecoderConfig {
        ffmpeg_path: Some(binary),
        ..Default::default()
    }
}
