//! Chord timeline lookup for a playing reference track.
//!
//! Segments come from an external analysis service; this module only answers
//! "which label is active at playback time t".

use serde::{Deserialize, Serialize};

/// One labelled chord starting at `time` seconds into the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordSegment {
    pub time: f64,
    #[serde(alias = "chord")]
    pub label: String,
}

impl ChordSegment {
    pub fn new(time: f64, label: impl Into<String>) -> Self {
        Self {
            time,
            label: label.into(),
        }
    }
}

/// Chord segments ordered by ascending start time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordTimeline {
    segments: Vec<ChordSegment>,
}

impl ChordTimeline {
    /// Builds a timeline, dropping segments with a non-finite start time and
    /// sorting the rest. Segments sharing a start time keep their input order.
    pub fn new(segments: impl IntoIterator<Item = ChordSegment>) -> Self {
        let (mut segments, dropped): (Vec<ChordSegment>, Vec<ChordSegment>) = segments
            .into_iter()
            .partition(|segment| segment.time.is_finite());
        if !dropped.is_empty() {
            log::warn!(
                "Dropped {} chord segment(s) with a non-finite start time",
                dropped.len()
            );
        }
        segments.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { segments }
    }

    /// Parses the `[{"time": .., "chord": ..}, ..]` payload of the analysis service.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let segments: Vec<ChordSegment> = serde_json::from_str(json)?;
        Ok(Self::new(segments))
    }

    /// Label of the last segment starting at or before `position` seconds.
    pub fn label_at(&self, position: f64) -> Option<&str> {
        let index = self.segments.partition_point(|segment| segment.time <= position);
        index
            .checked_sub(1)
            .map(|last| self.segments[last].label.as_str())
    }

    pub fn segments(&self) -> &[ChordSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
