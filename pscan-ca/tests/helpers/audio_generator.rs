//! Audio Test Fixture Generator
//!
//! WAV recordings with cry-like characteristics, written to disk or kept in
//! memory for multipart uploads

use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub frequency: f32,
    pub amplitude: f32,
    /// Alternate tone and silence in bursts of this length
    pub burst_seconds: Option<f64>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 2.0,
            sample_rate: 44100,
            channels: 2,
            frequency: 450.0,
            amplitude: 0.5,
            burst_seconds: None,
        }
    }
}

fn write_wav<W: Write + Seek>(writer: W, config: &AudioConfig) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::new(writer, spec)?;
    let total_samples = (config.duration_seconds * config.sample_rate as f64) as usize;
    let burst_samples = config
        .burst_seconds
        .map(|s| (s * config.sample_rate as f64) as usize)
        .filter(|&n| n > 0);

    for i in 0..total_samples {
        let silent = burst_samples.is_some_and(|n| (i / n) % 2 == 1);
        let sample = if silent {
            0
        } else {
            let t = i as f32 / config.sample_rate as f32;
            (config.amplitude * (2.0 * std::f32::consts::PI * config.frequency * t).sin()
                * i16::MAX as f32) as i16
        };

        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Generate a test WAV file with specified configuration
///
/// # Returns
/// Generated file path
pub fn generate_test_wav(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_wav(file, config)?;
    Ok(path.to_path_buf())
}

/// Generate WAV content in memory
pub fn wav_bytes(config: &AudioConfig) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    write_wav(&mut cursor, config).expect("in-memory WAV encoding");
    cursor.into_inner()
}
