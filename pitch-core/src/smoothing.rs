//! Single-pole low-pass filter over successive detector outputs.

/// Weight kept from the previous smoothed value.
pub const SMOOTHING_RETAIN: f32 = 0.8;

/// Weight given to the newest raw estimate.
pub const SMOOTHING_BLEND: f32 = 0.2;

/// Keeps the displayed pitch from jittering between frames.
///
/// A detection gap clears the history so that the next voiced frame starts
/// unsmoothed instead of gliding in from a stale value.
#[derive(Debug, Clone, Default)]
pub struct PitchSmoother {
    previous: Option<f32>,
}

impl PitchSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw detector result and returns the smoothed pitch.
    pub fn update(&mut self, raw: Option<f32>) -> Option<f32> {
        let smoothed = raw.map(|raw| match self.previous {
            Some(previous) => previous * SMOOTHING_RETAIN + raw * SMOOTHING_BLEND,
            None => raw,
        });
        self.previous = smoothed;
        smoothed
    }

    pub fn current(&self) -> Option<f32> {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
