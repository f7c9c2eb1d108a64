//! Mono resampling using rubato
//!
//! Brings natively decoded audio to the analysis rate (22,050 Hz). Audio
//! transcoded by ffmpeg already arrives at that rate.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

use super::IngestError;

/// Resample a mono buffer from `input_rate` to `output_rate`
///
/// Returns the input unchanged when the rates already match, and an empty
/// buffer for empty input.
pub fn resample_mono(input: Vec<f32>, input_rate: u32, output_rate: u32) -> Result<Vec<f32>, IngestError> {
    if input_rate == output_rate || input.is_empty() {
        return Ok(input);
    }
    if input_rate == 0 {
        return Err(IngestError::Decode("input sample rate is 0".to_string()));
    }

    debug!(
        input_rate,
        output_rate,
        input_frames = input.len(),
        "Resampling mono audio"
    );

    let input_frames = input.len();
    let mut resampler = FastFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0, // no runtime ratio changes
        PolynomialDegree::Septic,
        input_frames,
        1,
    )
    .map_err(|e| IngestError::Decode(format!("Failed to create resampler: {}", e)))?;

    let mut output = resampler
        .process(&[input], None)
        .map_err(|e| IngestError::Decode(format!("Resampling failed: {}", e)))?;

    let resampled = output.pop().unwrap_or_default();

    debug!(
        input_frames,
        output_frames = resampled.len(),
        "Resampling complete"
    );

    Ok(resampled)
}
