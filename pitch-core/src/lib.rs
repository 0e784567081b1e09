// pitch-core/src/lib.rs

//! The core logic for the singing pitch trainer.
//! This crate is responsible for pitch detection, musical unit conversions,
//! match classification, session scoring and the live graph history.
//! It is completely headless: it performs no audio capture, no decoding
//! and contains no GUI or scheduling code.

pub mod chords;
pub mod config;
pub mod dominant;
pub mod error;
pub mod graph;
pub mod history;
pub mod pitch;
pub mod scoring;
pub mod session;
pub mod smoothing;
pub mod tuning;

pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, FrameError};
pub use pitch::Frame;
pub use scoring::{Classification, SessionReport, SessionScore};
pub use session::PitchSession;

use serde::Serialize;

/// Represents the result of a single live comparison cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickOutput {
    /// The singer's smoothed pitch in Hz.
    pub user_frequency: Option<f32>,
    /// The singer's unsmoothed detector output in Hz.
    pub raw_user_frequency: Option<f32>,
    /// Pitch of the reference audio, or the key tonic when the audio is silent.
    pub reference_frequency: Option<f32>,
    /// Note name of the reference pitch.
    pub reference_note: Option<&'static str>,
    /// The frequency the singer was compared against.
    pub target_frequency: f32,
    /// Deviation of the smoothed pitch from the target in cents.
    pub cents_offset: Option<f32>,
    /// Feedback bucket; `None` while waiting for voiced input.
    pub classification: Option<Classification>,
    /// Counters after this tick.
    pub score: SessionScore,
}

impl TickOutput {
    /// Status pill text: the classification label, or "Waiting".
    pub fn status(&self) -> &'static str {
        self.classification.map_or("Waiting", Classification::label)
    }
}
