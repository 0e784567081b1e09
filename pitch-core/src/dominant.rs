//! # Dominant Note Module
//!
//! Offline scan of a decoded reference track to find the note it dwells on
//! most. The result is shown as the song's approximate main note.
//!
//! The scan:
//! 1. Caps the track to its first `max_seconds`
//! 2. Slides a `frame_size` window forward by `hop_size` samples
//! 3. Runs the live pitch detector on each window and names the note
//! 4. Returns the note with the highest tally

use std::collections::HashMap;

use crate::config::DominantNoteConfig;
use crate::error::FrameError;
use crate::{pitch, tuning};

/// Outcome of a dominant-note scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominantNote {
    /// Winning note name, e.g. `"A3"`.
    pub name: &'static str,
    /// Number of frames that were named `name`.
    pub count: usize,
    /// Frames examined in the capped region.
    pub frames_scanned: usize,
    /// Frames that produced a usable note.
    pub voiced_frames: usize,
}

/// Finds the most frequent note in the opening of a mono waveform.
///
/// Ties go to the note that reached the winning tally first during the scan,
/// so the result is reproducible for a given input.
///
/// # Returns
/// * `Ok(Some(note))` - At least one frame yielded a usable pitch
/// * `Ok(None)` - Silent, atonal, or shorter than one frame
/// * `Err(FrameError::ZeroSampleRate)` - The caller passed a zero sample rate
pub fn estimate_dominant_note(
    samples: &[f32],
    sample_rate: u32,
    config: &DominantNoteConfig,
) -> Result<Option<DominantNote>, FrameError> {
    if sample_rate == 0 {
        return Err(FrameError::ZeroSampleRate);
    }

    let cap = (f64::from(config.max_seconds) * f64::from(sample_rate)).floor() as usize;
    let max_samples = samples.len().min(cap);
    let frame_size = config.frame_size;
    let hop_size = config.hop_size.max(1);

    let mut tallies: HashMap<&'static str, usize> = HashMap::new();
    let mut best: Option<(&'static str, usize)> = None;
    let mut frames_scanned = 0;
    let mut voiced_frames = 0;

    let mut start = 0;
    while start + frame_size < max_samples {
        frames_scanned += 1;
        let frame = &samples[start..start + frame_size];
        start += hop_size;

        let Some(name) = pitch::detect_pitch(frame, sample_rate).and_then(tuning::note_name)
        else {
            continue;
        };
        voiced_frames += 1;

        let count = tallies.entry(name).or_insert(0);
        *count += 1;
        if best.is_none_or(|(_, best_count)| *count > best_count) {
            best = Some((name, *count));
        }
    }

    let result = best.map(|(name, count)| DominantNote {
        name,
        count,
        frames_scanned,
        voiced_frames,
    });

    match &result {
        Some(note) => log::info!(
            "Dominant note {} ({} of {} frames, {} voiced)",
            note.name,
            note.count,
            note.frames_scanned,
            note.voiced_frames
        ),
        None => log::info!("No dominant note found in {frames_scanned} frames"),
    }

    Ok(result)
}
