//! # Listening Session Module
//!
//! All mutable state of one practice session lives in [`PitchSession`]: the
//! smoother, the score counters and the graph history. The session has no
//! timer of its own; an external driver calls [`PitchSession::tick`] once per
//! frame pair and simply stops calling it to cancel.

use log::{debug, trace};

use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError, Result};
use crate::history::{HistoryBuffer, HistorySnapshot};
use crate::pitch::Frame;
use crate::scoring::{Classification, SessionReport, SessionScore};
use crate::smoothing::PitchSmoother;
use crate::{TickOutput, tuning};

#[derive(Debug, Clone)]
pub struct PitchSession {
    config: EngineConfig,
    smoother: PitchSmoother,
    score: SessionScore,
    history: HistoryBuffer,
    /// Tonic of the song key, used when no reference audio is voiced.
    key_tonic: Option<f32>,
    listening: bool,
}

impl Default for PitchSession {
    fn default() -> Self {
        Self::with_valid_config(EngineConfig::default())
    }
}

impl PitchSession {
    /// Creates an idle session; call [`start`](Self::start) before ticking.
    pub fn new(config: EngineConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: EngineConfig) -> Self {
        Self {
            history: HistoryBuffer::new(config.history_capacity),
            config,
            smoother: PitchSmoother::new(),
            score: SessionScore::default(),
            key_tonic: None,
            listening: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the static fallback target (440 Hz unless configured otherwise).
    pub fn set_default_target(&mut self, freq: f32) -> Result<()> {
        if !(freq.is_finite() && freq > 0.0) {
            return Err(EngineError::InvalidTarget(freq));
        }
        self.config.default_target_hz = freq;
        Ok(())
    }

    /// Sets the song key from its pitch class (0 = C), or clears it with `None`.
    pub fn set_key(&mut self, pitch_class: Option<u8>) -> Result<()> {
        self.key_tonic = match pitch_class {
            Some(pc) => Some(tuning::tonic_frequency(pc).ok_or(EngineError::InvalidPitchClass(pc))?),
            None => None,
        };
        debug!("Key tonic set to {:?} Hz", self.key_tonic);
        Ok(())
    }

    pub fn key_tonic(&self) -> Option<f32> {
        self.key_tonic
    }

    /// Enters listening mode and resets the score for the new session.
    ///
    /// Calling this while already listening changes nothing.
    pub fn start(&mut self) {
        if self.listening {
            debug!("Session already listening; start ignored");
            return;
        }
        self.score = SessionScore::default();
        self.smoother.reset();
        self.listening = true;
        debug!("Session started");
    }

    /// Leaves listening mode and returns the report card.
    ///
    /// # Returns
    /// * `Some(report)` - The session classified enough ticks
    /// * `None` - Too few ticks, or the session was not listening
    pub fn stop(&mut self) -> Option<SessionReport> {
        if !self.listening {
            return None;
        }
        self.listening = false;
        self.smoother.reset();

        let report = self.score.report();
        match &report {
            Some(report) => debug!(
                "Session stopped: score {}% over {} ticks",
                report.score, self.score.total
            ),
            None => debug!(
                "Session stopped: report suppressed, only {} ticks classified",
                self.score.total
            ),
        }
        report
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Counters of the current session, or of the last one after `stop`.
    pub fn score(&self) -> SessionScore {
        self.score
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        self.history.snapshot()
    }

    /// Clears the graph history (user-initiated refresh).
    pub fn reset_history(&mut self) {
        self.history.reset();
    }

    /// Runs one live cycle over a microphone frame and an optional reference frame.
    ///
    /// The cycle detects both pitches, smooths the user's, resolves the target,
    /// classifies and counts a voiced user pitch, then records both channels in
    /// the history. A silent microphone frame leaves the counters untouched.
    ///
    /// # Errors
    /// * [`EngineError::NotListening`] - `start` has not been called
    /// * [`EngineError::SampleRateMismatch`] - the two frames disagree on sample rate
    pub fn tick(&mut self, mic: Frame<'_>, reference: Option<Frame<'_>>) -> Result<TickOutput> {
        if !self.listening {
            return Err(EngineError::NotListening);
        }
        if let Some(reference) = reference {
            if reference.sample_rate() != mic.sample_rate() {
                return Err(EngineError::SampleRateMismatch {
                    mic: mic.sample_rate(),
                    reference: reference.sample_rate(),
                });
            }
        }

        let raw_user = mic.detect_pitch();
        let reference_frequency = reference
            .and_then(|frame| frame.detect_pitch())
            .or(self.key_tonic);

        let user = self.smoother.update(raw_user);
        let target = reference_frequency.unwrap_or(self.config.default_target_hz);
        let cents = user.and_then(|freq| tuning::cents_offset(freq, target));
        let classification = cents.map(Classification::from_cents);
        if let Some(classification) = classification {
            self.score.record(classification);
        }

        self.history.push(reference_frequency, user);

        trace!(
            "tick user={user:?} reference={reference_frequency:?} target={target} cents={cents:?} -> {classification:?}"
        );

        Ok(TickOutput {
            user_frequency: user,
            raw_user_frequency: raw_user,
            reference_frequency,
            reference_note: reference_frequency.and_then(tuning::note_name),
            target_frequency: target,
            cents_offset: cents,
            classification,
            score: self.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::FRAME_SIZE;
    use std::f32::consts::PI;

    const SR: u32 = 44100;

    fn sine(freq: f32) -> Vec<f32> {
        (0..FRAME_SIZE)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / SR as f32).sin())
            .collect()
    }

    fn frame(samples: &[f32]) -> Frame<'_> {
        Frame::new(samples, SR).unwrap()
    }

    #[test]
    fn tick_requires_start() {
        let mut session = PitchSession::default();
        let mic = sine(440.0);
        assert_eq!(
            session.tick(frame(&mic), None).unwrap_err(),
            EngineError::NotListening
        );
    }

    #[test]
    fn match_against_default_target() {
        let mut session = PitchSession::default();
        session.start();
        let mic = sine(440.0);
        let out = session.tick(frame(&mic), None).unwrap();
        assert_eq!(out.classification, Some(Classification::Match));
        assert_eq!(out.target_frequency, 440.0);
        assert_eq!(out.reference_frequency, None);
        assert_eq!(out.score.total, 1);
        assert_eq!(out.score.matched, 1);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn silence_leaves_counters_and_records_gap() {
        let mut session = PitchSession::default();
        session.start();
        let silence = vec![0.0; FRAME_SIZE];
        let reference = sine(220.0);
        let out = session.tick(frame(&silence), Some(frame(&reference))).unwrap();
        assert_eq!(out.user_frequency, None);
        assert_eq!(out.classification, None);
        assert_eq!(out.score, SessionScore::default());
        assert_eq!(out.reference_note, Some("A3"));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.user, vec![None]);
        assert!(snapshot.reference[0].is_some());
    }

    #[test]
    fn reference_overrides_key_and_key_overrides_default() {
        let mut session = PitchSession::default();
        session.set_key(Some(0)).unwrap();
        session.start();
        let mic = sine(262.0);

        let out = session.tick(frame(&mic), None).unwrap();
        let tonic = out.reference_frequency.unwrap();
        assert!((tonic - 261.63).abs() < 0.01);
        assert_eq!(out.target_frequency, tonic);
        assert_eq!(out.classification, Some(Classification::Match));

        let reference = sine(330.0);
        let out = session.tick(frame(&mic), Some(frame(&reference))).unwrap();
        let reference_freq = out.reference_frequency.unwrap();
        assert!((reference_freq - 330.0).abs() < 3.3);
        assert_eq!(out.classification, Some(Classification::TooLow));
    }

    #[test]
    fn sharp_singer_gets_direction() {
        let mut session = PitchSession::default();
        session.start();
        // ~35 cents sharp of 440 Hz
        let mic = sine(449.0);
        let out = session.tick(frame(&mic), None).unwrap();
        assert_eq!(out.classification, Some(Classification::NearHigh));
        assert_eq!(out.score.near, 1);
    }

    #[test]
    fn start_resets_score_once() {
        let mut session = PitchSession::default();
        session.start();
        let mic = sine(440.0);
        session.tick(frame(&mic), None).unwrap();
        session.start();
        assert_eq!(session.score().total, 1);

        assert_eq!(session.stop(), None);
        assert!(!session.is_listening());
        assert_eq!(session.score().total, 1);

        session.start();
        assert_eq!(session.score().total, 0);
        // History survives a new session until explicitly reset.
        assert_eq!(session.history().len(), 1);
        session.reset_history();
        assert!(session.history().is_empty());
    }

    #[test]
    fn stop_reports_after_enough_ticks() {
        let mut session = PitchSession::default();
        session.start();
        let mic = sine(440.0);
        for _ in 0..60 {
            session.tick(frame(&mic), None).unwrap();
        }
        let report = session.stop().unwrap();
        assert_eq!(report.score, 100);
        assert_eq!(report.match_percent, 100);
        assert_eq!(session.stop(), None);
    }

    #[test]
    fn contract_violations() {
        let mut session = PitchSession::default();
        assert_eq!(
            session.set_default_target(0.0),
            Err(EngineError::InvalidTarget(0.0))
        );
        assert_eq!(session.set_key(Some(12)), Err(EngineError::InvalidPitchClass(12)));
        assert!(session.set_default_target(261.63).is_ok());

        session.start();
        let mic = sine(440.0);
        let reference = sine(440.0);
        let other_rate = Frame::new(&reference, 48000).unwrap();
        assert_eq!(
            session.tick(frame(&mic), Some(other_rate)).unwrap_err(),
            EngineError::SampleRateMismatch { mic: 44100, reference: 48000 }
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            history_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(PitchSession::new(config).is_err());
    }
}
