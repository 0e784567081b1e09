//! # Musical Tuning Module
//!
//! Pure conversions between frequencies and musical units, based on equal
//! temperament with A4 = 440 Hz.
//!
//! ## Features
//! - Cent offset between a sung frequency and its target
//! - Note name (pitch class + octave) for any frequency in the MIDI range
//! - Tonic frequency for a song key given as a pitch class

use once_cell::sync::Lazy;

/// Concert pitch A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI: i32 = 69;

/// MIDI note number of middle C (C4).
pub const C4_MIDI: i32 = 60;

/// The chromatic pitch classes starting at C, sharps only.
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Note names for every MIDI note number (0 = C-1, 127 = G9).
///
/// Built once so that `note_name` can hand out `&'static str` without
/// allocating on every tick.
static MIDI_NOTE_NAMES: Lazy<Vec<String>> = Lazy::new(|| {
    (0..=127_i32)
        .map(|midi| {
            let pitch_class = PITCH_CLASSES[midi.rem_euclid(12) as usize];
            let octave = midi.div_euclid(12) - 1;
            format!("{pitch_class}{octave}")
        })
        .collect()
});

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
///
/// # Returns
/// * `Some(cents)` - When both frequencies are positive and finite
/// * `None` - Otherwise; the logarithm would be undefined
pub fn cents_offset(freq: f32, target_freq: f32) -> Option<f32> {
    if !is_valid_frequency(freq) || !is_valid_frequency(target_freq) {
        return None;
    }
    Some(1200.0 * (freq / target_freq).log2())
}

/// Rounds a frequency to the nearest MIDI note number.
///
/// Returns `None` for non-positive or non-finite input and for notes
/// outside the MIDI range `0..=127`.
pub fn midi_note(freq: f32) -> Option<u8> {
    if !is_valid_frequency(freq) {
        return None;
    }
    let semitones = (12.0 * (freq / A4_FREQUENCY).log2()).round();
    let midi = A4_MIDI as f32 + semitones;
    if (0.0..=127.0).contains(&midi) {
        Some(midi as u8)
    } else {
        None
    }
}

/// Equal-tempered frequency of a MIDI note number.
pub fn midi_frequency(midi: u8) -> f32 {
    A4_FREQUENCY * 2.0_f32.powf((i32::from(midi) - A4_MIDI) as f32 / 12.0)
}

/// Maps a frequency to its nearest note name, e.g. `440.0 -> "A4"`.
///
/// # Returns
/// * `Some(name)` - Pitch class followed by octave number
/// * `None` - Input is not a usable frequency or falls outside the MIDI range
pub fn note_name(freq: f32) -> Option<&'static str> {
    midi_note(freq).map(|midi| MIDI_NOTE_NAMES[midi as usize].as_str())
}

/// Frequency of a key's tonic in the fourth octave (C4 to B4).
///
/// `pitch_class` follows the usual 0 = C, 1 = C#, ..., 11 = B numbering.
pub fn tonic_frequency(pitch_class: u8) -> Option<f32> {
    if pitch_class >= 12 {
        return None;
    }
    Some(midi_frequency(C4_MIDI as u8 + pitch_class))
}

/// Parses the tonic of a key label such as `"F#"`, `"Bb"` or `"C# Minor"`.
///
/// Only the first whitespace-separated word is examined; a trailing mode
/// word is ignored.
pub fn pitch_class_from_name(name: &str) -> Option<u8> {
    let tonic = name.split_whitespace().next()?;
    let mut chars = tonic.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let natural: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let accidental = match chars.as_str() {
        "" => 0,
        "#" | "♯" => 1,
        "b" | "♭" => -1,
        _ => return None,
    };
    Some((natural + accidental).rem_euclid(12) as u8)
}

fn is_valid_frequency(freq: f32) -> bool {
    freq.is_finite() && freq > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cents_of_unison_and_octaves() {
        assert_abs_diff_eq!(cents_offset(440.0, 440.0).unwrap(), 0.0);
        assert_abs_diff_eq!(cents_offset(880.0, 440.0).unwrap(), 1200.0, epsilon = 1e-3);
        assert_abs_diff_eq!(cents_offset(220.0, 440.0).unwrap(), -1200.0, epsilon = 1e-3);
        assert_abs_diff_eq!(cents_offset(123.4, 123.4).unwrap(), 0.0);
    }

    #[test]
    fn cents_rejects_unusable_frequencies() {
        assert_eq!(cents_offset(0.0, 440.0), None);
        assert_eq!(cents_offset(440.0, 0.0), None);
        assert_eq!(cents_offset(-10.0, 440.0), None);
        assert_eq!(cents_offset(f32::NAN, 440.0), None);
        assert_eq!(cents_offset(440.0, f32::INFINITY), None);
    }

    #[test]
    fn note_names() {
        assert_eq!(note_name(440.0), Some("A4"));
        assert_eq!(note_name(261.63), Some("C4"));
        assert_eq!(note_name(880.0), Some("A5"));
        assert_eq!(note_name(277.18), Some("C#4"));
        assert_eq!(note_name(8.18), Some("C-1"));
    }

    #[test]
    fn note_name_outside_midi_range() {
        assert_eq!(note_name(f32::NAN), None);
        assert_eq!(note_name(0.0), None);
        assert_eq!(note_name(1.0), None);
        assert_eq!(note_name(20_000.0), None);
    }

    #[test]
    fn midi_round_trip() {
        assert_eq!(midi_note(midi_frequency(69)), Some(69));
        assert_abs_diff_eq!(midi_frequency(60), 261.6256, epsilon = 1e-2);
    }

    #[test]
    fn tonic_frequencies() {
        assert_abs_diff_eq!(tonic_frequency(0).unwrap(), 261.6256, epsilon = 1e-2);
        assert_abs_diff_eq!(tonic_frequency(9).unwrap(), 440.0, epsilon = 1e-3);
        assert_eq!(tonic_frequency(12), None);
    }

    #[test]
    fn pitch_class_parsing() {
        assert_eq!(pitch_class_from_name("C"), Some(0));
        assert_eq!(pitch_class_from_name("F#"), Some(6));
        assert_eq!(pitch_class_from_name("F# Minor"), Some(6));
        assert_eq!(pitch_class_from_name("bb major"), Some(10));
        assert_eq!(pitch_class_from_name("Cb"), Some(11));
        assert_eq!(pitch_class_from_name("H"), None);
        assert_eq!(pitch_class_from_name(""), None);
        assert_eq!(pitch_class_from_name("C##"), None);
    }
}
