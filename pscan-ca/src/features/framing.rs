//! Centered short-time framing
//!
//! The signal is zero-padded by `frame_length / 2` on both sides so that frame
//! `i` is centered on sample `i * hop_length`. For a non-empty signal of `n`
//! samples this yields `1 + n / hop_length` frames.

/// Zero-padded signal cut into overlapping analysis frames
pub struct FrameGrid {
    padded: Vec<f32>,
    frame_length: usize,
    hop_length: usize,
    frame_count: usize,
}

impl FrameGrid {
    pub fn new(samples: &[f32], frame_length: usize, hop_length: usize) -> Self {
        let pad = frame_length / 2;

        let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
        padded.resize(pad, 0.0);
        padded.extend_from_slice(samples);
        padded.resize(padded.len() + pad, 0.0);

        let frame_count = if samples.is_empty() || hop_length == 0 || padded.len() < frame_length {
            0
        } else {
            1 + (padded.len() - frame_length) / hop_length
        };

        Self {
            padded,
            frame_length,
            hop_length,
            frame_count,
        }
    }

    pub fn len(&self) -> usize {
        self.frame_count
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// Iterate over frames in time order
    pub fn frames(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.frame_count).map(move |i| {
            let start = i * self.hop_length;
            &self.padded[start..start + self.frame_length]
        })
    }
}

/// Root-mean-square amplitude of one frame
pub fn rms(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = frame.iter().map(|&s| (s as f64).powi(2)).sum();
    (sum_squares / frame.len() as f64).sqrt()
}
