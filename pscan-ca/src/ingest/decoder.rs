//! In-process audio decoding
//!
//! Decodes an audio file to mono f32 PCM using symphonia (WAV, FLAC, MP3,
//! AAC/MP4, Ogg Vorbis, ...). Codecs symphonia does not ship, such as Opus in
//! browser-recorded WebM, surface as [`NativeDecodeError::Unsupported`] so the
//! caller can fall back to ffmpeg.

use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Native decoder failures
#[derive(Debug, Error)]
pub enum NativeDecodeError {
    /// Container or codec not supported by symphonia
    #[error("unsupported format or codec: {0}")]
    Unsupported(String),

    /// Supported format but unreadable content
    #[error("malformed audio: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NativeDecodeError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, NativeDecodeError::Unsupported(_))
    }
}

impl From<SymphoniaError> for NativeDecodeError {
    fn from(err: SymphoniaError) -> Self {
        match err {
            SymphoniaError::Unsupported(what) => NativeDecodeError::Unsupported(what.to_string()),
            SymphoniaError::IoError(e) => NativeDecodeError::Io(e),
            other => NativeDecodeError::Malformed(other.to_string()),
        }
    }
}

/// Mono PCM as decoded, before resampling
#[derive(Debug)]
pub struct NativeAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source before mixdown
    pub channels: usize,
}

/// Decode an audio file to mono f32 PCM samples
///
/// **Algorithm:**
/// 1. Probe the container (file extension as hint)
/// 2. Select the first track with a real codec
/// 3. Decode every packet of that track; corrupt packets are skipped
/// 4. Mix each frame down to mono by averaging channels
pub fn decode_file(path: &Path) -> Result<NativeAudio, NativeDecodeError> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| NativeDecodeError::Unsupported("no audio track found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut mono: Vec<f32> = Vec::new();
    // Reused across packets while the channel layout and packet size allow it
    let mut sample_buf: Option<(SampleBuffer<f32>, usize)> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                tracing::warn!(reason, "Skipping corrupt audio packet");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels = spec.channels.count();
        if channels == 0 {
            continue;
        }

        let reusable = matches!(
            &sample_buf,
            Some((buf, buf_channels))
                if *buf_channels == channels && buf.capacity() >= decoded.capacity() * channels
        );
        if !reusable {
            sample_buf = Some((
                SampleBuffer::<f32>::new(decoded.capacity() as u64, spec),
                channels,
            ));
        }
        let Some((buf, _)) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        mono.extend(
            buf.samples()
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    let sample_rate = sample_rate
        .ok_or_else(|| NativeDecodeError::Malformed("sample rate unknown".to_string()))?;

    tracing::debug!(
        path = %path.display(),
        sample_rate,
        channels,
        total_samples = mono.len(),
        "Native decode complete"
    );

    Ok(NativeAudio {
        samples: mono,
        sample_rate,
        channels,
    })
}
