//! # Synthetic Frame Source
//!
//! Stands in for a microphone and a playing reference track. Audio arrives in
//! small device-sized blocks which are accumulated into full analysis frames,
//! the same way a capture callback would feed the analysis thread.

use crossbeam_channel::Sender;
use pitch_core::pitch::FRAME_SIZE;
use std::f32::consts::TAU;

/// Samples delivered per simulated device callback.
pub const BLOCK_SIZE: usize = 512;

/// A continuous-phase sine voice with optional vibrato.
#[derive(Debug, Clone)]
pub struct ToneVoice {
    pub frequency: f32,
    pub amplitude: f32,
    /// Peak vibrato depth in cents.
    pub vibrato_cents: f32,
    pub vibrato_rate_hz: f32,
    sample_rate: u32,
    phase: f32,
    elapsed: u64,
}

impl ToneVoice {
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            frequency,
            amplitude: 0.5,
            vibrato_cents: 0.0,
            vibrato_rate_hz: 5.5,
            sample_rate,
            phase: 0.0,
            elapsed: 0,
        }
    }

    pub fn with_vibrato(mut self, cents: f32) -> Self {
        self.vibrato_cents = cents;
        self
    }

    /// Renders the next block, advancing the phase.
    pub fn render(&mut self, out: &mut [f32]) {
        let sr = self.sample_rate as f32;
        for sample in out.iter_mut() {
            let t = self.elapsed as f32 / sr;
            let wobble = self.vibrato_cents * (TAU * self.vibrato_rate_hz * t).sin();
            let freq = self.frequency * 2.0_f32.powf(wobble / 1200.0);
            *sample = self.amplitude * self.phase.sin();
            self.phase = (self.phase + TAU * freq / sr) % TAU;
            self.elapsed += 1;
        }
    }
}

/// One microphone frame plus the matching reference frame, if a track plays.
#[derive(Debug, Clone)]
pub struct FramePair {
    pub mic: Vec<f32>,
    pub reference: Option<Vec<f32>>,
    /// Playback position of the reference track at the start of the frame, in seconds.
    pub position: f64,
}

/// Accumulates device blocks into full frames for both channels.
#[derive(Debug)]
pub struct FrameAssembler {
    mic_buffer: Vec<f32>,
    reference_buffer: Vec<f32>,
    with_reference: bool,
    sample_rate: u32,
    consumed: u64,
}

impl FrameAssembler {
    pub fn new(sample_rate: u32, with_reference: bool) -> Self {
        Self {
            mic_buffer: Vec::with_capacity(FRAME_SIZE * 2),
            reference_buffer: Vec::with_capacity(FRAME_SIZE * 2),
            with_reference,
            sample_rate,
            consumed: 0,
        }
    }

    /// Appends one block per channel and returns every frame pair that became complete.
    pub fn push(&mut self, mic: &[f32], reference: &[f32]) -> Vec<FramePair> {
        self.mic_buffer.extend_from_slice(mic);
        if self.with_reference {
            self.reference_buffer.extend_from_slice(reference);
        }

        let mut ready = Vec::new();
        while self.mic_buffer.len() >= FRAME_SIZE {
            let position = self.consumed as f64 / f64::from(self.sample_rate);
            let mic_frame = self.mic_buffer[..FRAME_SIZE].to_vec();
            self.mic_buffer.drain(..FRAME_SIZE);

            let reference_frame = if self.with_reference {
                let frame = self.reference_buffer[..FRAME_SIZE].to_vec();
                self.reference_buffer.drain(..FRAME_SIZE);
                Some(frame)
            } else {
                None
            };

            self.consumed += FRAME_SIZE as u64;
            ready.push(FramePair {
                mic: mic_frame,
                reference: reference_frame,
                position,
            });
        }
        ready
    }
}

/// Settings for one simulated practice run.
#[derive(Debug, Clone)]
pub struct Performance {
    pub sample_rate: u32,
    pub frames: usize,
    pub singer: ToneVoice,
    pub reference: Option<ToneVoice>,
    /// Mute the singer for one frame out of every `gap_every`.
    pub gap_every: Option<usize>,
}

/// Renders the performance block by block and sends complete frame pairs.
///
/// Returns the number of frames delivered; stops early if the receiver hangs up.
pub fn stream_performance(mut performance: Performance, sender: Sender<FramePair>) -> usize {
    let mut assembler =
        FrameAssembler::new(performance.sample_rate, performance.reference.is_some());
    let mut mic_block = vec![0.0; BLOCK_SIZE];
    let mut reference_block = vec![0.0; BLOCK_SIZE];
    let mut delivered = 0;

    while delivered < performance.frames {
        performance.singer.render(&mut mic_block);
        if let Some(reference) = performance.reference.as_mut() {
            reference.render(&mut reference_block);
        }

        for mut pair in assembler.push(&mic_block, &reference_block) {
            if delivered >= performance.frames {
                break;
            }
            if performance
                .gap_every
                .is_some_and(|every| every > 0 && delivered % every == every - 1)
            {
                pair.mic.fill(0.0);
            }
            if sender.send(pair).is_err() {
                log::warn!("Analysis side hung up after {delivered} frames");
                return delivered;
            }
            delivered += 1;
        }
    }
    delivered
}
