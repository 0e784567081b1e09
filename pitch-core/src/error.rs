//! # Error Types
//!
//! Absence of a pitch is never an error in this crate; detectors and
//! conversions return `Option`. The types here cover caller-contract
//! violations only: malformed frames, invalid targets and bad configuration.

use std::path::PathBuf;

/// A frame that cannot be analysed at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("frame contains no samples")]
    Empty,

    #[error("sample rate must be positive")]
    ZeroSampleRate,
}

/// Errors raised by the live comparison engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid frame: {0}")]
    Frame(#[from] FrameError),

    #[error("target frequency must be positive and finite, got {0}")]
    InvalidTarget(f32),

    #[error("pitch class must be in 0..=11, got {0}")]
    InvalidPitchClass(u8),

    #[error("reference frame sample rate {reference} Hz differs from microphone rate {mic} Hz")]
    SampleRateMismatch { mic: u32, reference: u32 },

    #[error("session is not listening; call start() first")]
    NotListening,
}

/// Errors raised while loading or validating an [`crate::config::EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Convenience Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
