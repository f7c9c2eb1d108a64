//! Spectral centroid (pitch proxy)
//!
//! ## Algorithm
//! 1. Apply a periodic Hann window to the frame
//! 2. Forward FFT of size `frame_length`
//! 3. Magnitude of bins `0..=n/2`, bin `k` at `k * sample_rate / n` Hz
//! 4. Centroid = Σ f·|X| / Σ |X|; frames without energy report 0 Hz

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Reusable per-extraction FFT state
pub struct CentroidAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    bin_hz: f64,
}

impl CentroidAnalyzer {
    pub fn new(frame_length: usize, sample_rate: u32) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_length);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let window = (0..frame_length)
            .map(|i| (0.5 - 0.5 * (2.0 * PI * i as f64 / frame_length as f64).cos()) as f32)
            .collect();

        Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); frame_length],
            scratch,
            bin_hz: sample_rate as f64 / frame_length as f64,
        }
    }

    /// Spectral centroid of one frame in Hz
    ///
    /// `frame` must be exactly `frame_length` samples long.
    pub fn centroid(&mut self, frame: &[f32]) -> f64 {
        for (slot, (&sample, &w)) in self.buffer.iter_mut().zip(frame.iter().zip(&self.window)) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let nyquist_bin = self.buffer.len() / 2;
        let mut weighted = 0.0f64;
        let mut total = 0.0f64;
        for (k, bin) in self.buffer[..=nyquist_bin].iter().enumerate() {
            let magnitude = bin.norm() as f64;
            weighted += k as f64 * self.bin_hz * magnitude;
            total += magnitude;
        }

        if total <= f32::MIN_POSITIVE as f64 {
            0.0
        } else {
            weighted / total
        }
    }
}
