//! Cry feature extraction
//!
//! Reduces a mono PCM signal of any length to a fixed five-value record:
//! - Average short-time RMS energy and its standard deviation
//! - Cry/silence ratio (fraction of frames louder than 30% of the mean energy)
//! - Mean spectral centroid (pitch proxy)
//! - Duration
//!
//! Extraction is pure: identical samples always yield an identical record.

pub mod framing;
pub mod spectral;

use pscan_common::config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::framing::FrameGrid;
use self::spectral::CentroidAnalyzer;

/// Frames with RMS above `ratio * mean(RMS)` count as active cry
pub const ACTIVE_CRY_THRESHOLD_RATIO: f64 = 0.3;

/// Feature extraction errors
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    /// Zero-length sample buffer
    #[error("No audio data found")]
    EmptySignal,

    /// Sample rate of zero makes duration undefined
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// NaN or infinite sample in the buffer
    #[error("Non-finite audio sample at index {index}")]
    NonFiniteSample { index: usize },
}

/// Quantitative description of a recorded cry
///
/// All fields are finite and rounded for stable serialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CryFeatures {
    /// Mean short-time RMS energy (6 decimals)
    pub average_energy: f64,
    /// Population standard deviation of short-time RMS energy (6 decimals)
    pub energy_variation: f64,
    /// Fraction of frames classified as active cry, in [0, 1] (3 decimals)
    pub cry_silence_ratio: f64,
    /// Mean spectral centroid in Hz (2 decimals)
    pub avg_pitch: f64,
    /// Signal length in seconds (2 decimals)
    pub duration_seconds: f64,
}

/// Short-time feature extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureExtractor {
    frame_length: usize,
    hop_length: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl FeatureExtractor {
    /// `frame_length` and `hop_length` must be non-zero (enforced by config validation)
    pub fn new(frame_length: usize, hop_length: usize) -> Self {
        Self {
            frame_length,
            hop_length,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.frame_length, config.hop_length)
    }

    /// Extract cry features from mono PCM samples
    ///
    /// # Arguments
    /// * `samples` - Mono PCM audio samples (f32, nominally in [-1.0, 1.0])
    /// * `sample_rate` - Sample rate of `samples` in Hz
    ///
    /// # Errors
    /// * `EmptySignal` when `samples` is empty
    /// * `InvalidSampleRate` when `sample_rate` is 0
    /// * `NonFiniteSample` when any sample is NaN or infinite
    pub fn extract(&self, samples: &[f32], sample_rate: u32) -> Result<CryFeatures, FeatureError> {
        if samples.is_empty() {
            return Err(FeatureError::EmptySignal);
        }
        if sample_rate == 0 {
            return Err(FeatureError::InvalidSampleRate(sample_rate));
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(FeatureError::NonFiniteSample { index });
        }

        let grid = FrameGrid::new(samples, self.frame_length, self.hop_length);

        let energies: Vec<f64> = grid.frames().map(framing::rms).collect();

        let mut analyzer = CentroidAnalyzer::new(self.frame_length, sample_rate);
        let centroids: Vec<f64> = grid.frames().map(|frame| analyzer.centroid(frame)).collect();

        let average_energy = mean(&energies);
        let energy_variation = std_dev(&energies, average_energy);
        let cry_silence_ratio = active_ratio(&energies, average_energy);
        let avg_pitch = mean(&centroids);
        let duration_seconds = samples.len() as f64 / sample_rate as f64;

        tracing::debug!(
            samples = samples.len(),
            sample_rate,
            frames = grid.len(),
            average_energy,
            energy_variation,
            cry_silence_ratio,
            avg_pitch,
            "Cry features extracted"
        );

        Ok(CryFeatures {
            average_energy: round_to(average_energy, 6),
            energy_variation: round_to(energy_variation, 6),
            cry_silence_ratio: round_to(cry_silence_ratio, 3),
            avg_pitch: round_to(avg_pitch, 2),
            duration_seconds: round_to(duration_seconds, 2),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Fraction of frames whose energy exceeds the active-cry threshold; 0 with no frames
fn active_ratio(energies: &[f64], mean_energy: f64) -> f64 {
    if energies.is_empty() {
        return 0.0;
    }
    let threshold = mean_energy * ACTIVE_CRY_THRESHOLD_RATIO;
    let active = energies.iter().filter(|&&e| e > threshold).count();
    active as f64 / energies.len() as f64
}

/// Round to a fixed number of decimal places
///
/// Goes through decimal formatting, which rounds the exact binary value
/// with ties to even. Scaling by a power of ten would round `0.125` up.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 22_050;

    fn generate_sine_wave(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
        let num_samples = (duration_secs * RATE as f32) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / RATE as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin() * amplitude
            })
            .collect()
    }

    /// Alternating half-second bursts of tone and silence
    fn generate_bursts(duration_secs: f32) -> Vec<f32> {
        let tone = generate_sine_wave(450.0, duration_secs, 0.4);
        tone.iter()
            .enumerate()
            .map(|(i, &s)| if (i / (RATE as usize / 2)) % 2 == 0 { s } else { 0.0 })
            .collect()
    }

    #[test]
    fn test_empty_samples() {
        let extractor = FeatureExtractor::default();
        assert_eq!(extractor.extract(&[], RATE), Err(FeatureError::EmptySignal));
    }

    #[test]
    fn test_zero_sample_rate() {
        let extractor = FeatureExtractor::default();
        assert_eq!(
            extractor.extract(&[0.1, 0.2], 0),
            Err(FeatureError::InvalidSampleRate(0))
        );
    }

    #[test]
    fn test_non_finite_sample() {
        let extractor = FeatureExtractor::default();
        let samples = vec![0.1, 0.2, f32::NAN, 0.3];
        assert_eq!(
            extractor.extract(&samples, RATE),
            Err(FeatureError::NonFiniteSample { index: 2 })
        );
    }

    #[test]
    fn test_silence() {
        let extractor = FeatureExtractor::default();
        let features = extractor.extract(&vec![0.0; RATE as usize], RATE).unwrap();

        assert_eq!(features.average_energy, 0.0);
        assert_eq!(features.energy_variation, 0.0);
        assert_eq!(features.cry_silence_ratio, 0.0);
        assert_eq!(features.avg_pitch, 0.0);
        assert_eq!(features.duration_seconds, 1.0);
    }

    #[test]
    fn test_steady_tone() {
        let extractor = FeatureExtractor::default();
        let samples = generate_sine_wave(1000.0, 2.0, 0.5);
        let features = extractor.extract(&samples, RATE).unwrap();

        // Interior frames of a 0.5-amplitude sine have RMS 0.5/sqrt(2)
        assert!(features.average_energy > 0.3 && features.average_energy < 0.36);
        assert!(features.energy_variation < 0.05);
        assert_eq!(features.cry_silence_ratio, 1.0);
        // Onset/offset frames spread energy upward, so allow some slack
        assert!(
            (features.avg_pitch - 1000.0).abs() < 300.0,
            "avg_pitch = {}",
            features.avg_pitch
        );
        assert_eq!(features.duration_seconds, 2.0);
    }

    #[test]
    fn test_bursts_are_partly_active() {
        let extractor = FeatureExtractor::default();
        let features = extractor.extract(&generate_bursts(4.0), RATE).unwrap();

        assert!(
            features.cry_silence_ratio > 0.4 && features.cry_silence_ratio < 0.7,
            "cry_silence_ratio = {}",
            features.cry_silence_ratio
        );
        assert!(features.energy_variation > 0.1);
    }

    #[test]
    fn test_duration_uses_sample_rate() {
        let extractor = FeatureExtractor::default();
        let samples = vec![0.01; 33_075];
        let features = extractor.extract(&samples, RATE).unwrap();
        assert_eq!(features.duration_seconds, 1.5);

        let features = extractor.extract(&samples, 44_100).unwrap();
        assert_eq!(features.duration_seconds, 0.75);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = FeatureExtractor::default();
        let samples = generate_bursts(3.0);
        let first = extractor.extract(&samples, RATE).unwrap();
        let second = extractor.extract(&samples, RATE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ratio_bounds_for_short_clip() {
        let extractor = FeatureExtractor::new(256, 64);
        let features = extractor.extract(&[0.9, -0.9, 0.1], RATE).unwrap();
        assert!((0.0..=1.0).contains(&features.cry_silence_ratio));
        assert!(features.average_energy.is_finite());
        assert!(features.avg_pitch.is_finite());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123_456_7, 6), 0.123_457);
        assert_eq!(round_to(0.6666, 3), 0.667);
        assert_eq!(round_to(1234.5678, 2), 1234.57);
    }

    #[test]
    fn test_round_to_ties_go_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(2.5, 0), 2.0);
        // 2.675 is stored just below the tie
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(0.0, 6), 0.0);
    }
}
