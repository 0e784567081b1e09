//! # Pitch Detection Module
//!
//! This module implements the time-domain autocorrelation pitch detector used
//! for both the singer's microphone and the reference track.
//!
//! ## Features
//! - RMS noise gate to filter out silence and background hiss
//! - Lag search confined to the 50 Hz - 1000 Hz vocal band
//! - Normalized-correlation confidence gate to reject aperiodic frames
//! - Every degenerate case resolves to `None`, never to NaN or infinity

use crate::error::FrameError;

/// Number of samples per analysis frame.
///
/// At 44.1 kHz this is roughly 46 ms of audio, enough to hold at least two
/// periods of anything above ~43 Hz.
pub const FRAME_SIZE: usize = 2048;

/// Lowest fundamental the detector will report, in Hz.
pub const MIN_FREQUENCY: f32 = 50.0;

/// Highest fundamental the detector will report, in Hz.
pub const MAX_FREQUENCY: f32 = 1000.0;

/// Frames quieter than this RMS level are treated as silence.
pub const RMS_THRESHOLD: f32 = 0.01;

/// Minimum ratio R(bestLag) / R(0) for a frame to count as periodic.
pub const CONFIDENCE_THRESHOLD: f32 = 0.30;

/// A borrowed block of time-domain samples together with its sample rate.
///
/// The frame never owns the samples; the caller keeps the buffer and may
/// reuse it on the next tick.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    samples: &'a [f32],
    sample_rate: u32,
}

impl<'a> Frame<'a> {
    /// Wraps a sample slice, rejecting frames that violate the caller contract.
    ///
    /// # Errors
    /// * [`FrameError::Empty`] - the slice holds no samples
    /// * [`FrameError::ZeroSampleRate`] - the sample rate is zero
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Result<Self, FrameError> {
        if samples.is_empty() {
            return Err(FrameError::Empty);
        }
        if sample_rate == 0 {
            return Err(FrameError::ZeroSampleRate);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Runs [`detect_pitch`] on this frame.
    pub fn detect_pitch(&self) -> Option<f32> {
        detect_pitch(self.samples, self.sample_rate)
    }
}

/// A confident pitch reading for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Fundamental frequency in Hz, always within `[MIN_FREQUENCY, MAX_FREQUENCY]`.
    pub frequency: f32,
    /// The winning lag in samples.
    pub lag: usize,
    /// Normalized correlation R(lag) / R(0), in `[CONFIDENCE_THRESHOLD, 1]`.
    pub clarity: f32,
}

/// Estimates the fundamental frequency of one frame.
///
/// # Arguments
/// * `signal` - Time-domain samples, roughly in `[-1, 1]`
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// * `Some(frequency)` - Detected frequency in Hz
/// * `None` - No pitch detected (silence, noise, or an unusable frame)
pub fn detect_pitch(signal: &[f32], sample_rate: u32) -> Option<f32> {
    estimate_pitch(signal, sample_rate).map(|estimate| estimate.frequency)
}

/// Same as [`detect_pitch`] but also reports the winning lag and its clarity.
pub fn estimate_pitch(signal: &[f32], sample_rate: u32) -> Option<PitchEstimate> {
    let size = signal.len();
    if size < 2 || sample_rate == 0 {
        return None;
    }

    // --- Noise Gate: RMS over the whole frame ---
    // R(0) is the same sum of squares, so it is computed once here.
    let r0: f64 = signal.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    let rms = (r0 / size as f64).sqrt();
    if !rms.is_finite() || rms < f64::from(RMS_THRESHOLD) {
        return None;
    }
    if r0 == 0.0 {
        return None;
    }

    // --- Lag range covering the vocal band ---
    let min_lag = ((sample_rate / MAX_FREQUENCY as u32) as usize).max(1);
    let max_lag = ((sample_rate / MIN_FREQUENCY as u32) as usize).min(size - 1);
    if min_lag > max_lag {
        return None;
    }

    // --- Autocorrelation search; strict `>` keeps the lowest lag on ties ---
    let mut best_lag = 0;
    let mut best_correlation = 0.0_f64;
    for lag in min_lag..=max_lag {
        let correlation = autocorrelation(signal, lag);
        if correlation > best_correlation {
            best_correlation = correlation;
            best_lag = lag;
        }
    }

    if best_lag == 0 {
        return None;
    }

    let clarity = best_correlation / r0;
    if !clarity.is_finite() || clarity < f64::from(CONFIDENCE_THRESHOLD) {
        return None;
    }

    let frequency = sample_rate as f32 / best_lag as f32;
    if frequency.is_finite() && (MIN_FREQUENCY..=MAX_FREQUENCY).contains(&frequency) {
        Some(PitchEstimate {
            frequency,
            lag: best_lag,
            clarity: clarity as f32,
        })
    } else {
        None
    }
}

/// R(lag) = sum of x[i] * x[i + lag] over the overlapping region.
fn autocorrelation(signal: &[f32], lag: usize) -> f64 {
    signal
        .iter()
        .zip(&signal[lag..])
        .map(|(&a, &b)| f64::from(a) * f64::from(b))
        .sum()
}
