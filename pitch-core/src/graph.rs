//! Geometry for drawing the live comparison graph.
//!
//! Nothing here touches a canvas. A renderer asks for polylines in pixel
//! space and strokes each one separately, which leaves a visible break
//! wherever a channel had no pitch.

use crate::history::HistorySnapshot;

/// Frequency at the bottom of the graph, in Hz.
pub const GRAPH_MIN_FREQ: f32 = 50.0;

/// Frequency at the top of the graph, in Hz.
pub const GRAPH_MAX_FREQ: f32 = 1000.0;

/// Horizontal guide lines, in Hz.
pub const GRID_FREQUENCIES: [f32; 3] = [200.0, 440.0, 800.0];

/// A point of a trace in pixel coordinates; y grows downward.
pub type Point = (f32, f32);

/// Splits a channel into maximal runs of present samples.
///
/// Each run carries the history index alongside the frequency.
pub fn trace_segments<I>(channel: I) -> Vec<Vec<(usize, f32)>>
where
    I: IntoIterator<Item = Option<f32>>,
{
    let mut segments = Vec::new();
    let mut current: Vec<(usize, f32)> = Vec::new();
    for (index, sample) in channel.into_iter().enumerate() {
        match sample {
            Some(freq) if freq.is_finite() => current.push((index, freq)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Maps history indices and frequencies onto a fixed pixel area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphScale {
    pub width: f32,
    pub height: f32,
    /// Number of history slots spread across the width.
    pub capacity: usize,
}

impl GraphScale {
    pub fn new(width: f32, height: f32, capacity: usize) -> Self {
        Self {
            width,
            height,
            capacity,
        }
    }

    pub fn x_for(&self, index: usize) -> f32 {
        let span = self.capacity.saturating_sub(1).max(1) as f32;
        index as f32 / span * self.width
    }

    /// Linear in Hz, clamped to the graph's frequency range.
    pub fn y_for(&self, freq: f32) -> f32 {
        let pct = (freq - GRAPH_MIN_FREQ) / (GRAPH_MAX_FREQ - GRAPH_MIN_FREQ);
        self.height - pct.clamp(0.0, 1.0) * self.height
    }

    /// Broken polyline for one channel; one inner `Vec` per unbroken stroke.
    pub fn polylines<I>(&self, channel: I) -> Vec<Vec<Point>>
    where
        I: IntoIterator<Item = Option<f32>>,
    {
        trace_segments(channel)
            .into_iter()
            .map(|segment| {
                segment
                    .into_iter()
                    .map(|(index, freq)| (self.x_for(index), self.y_for(freq)))
                    .collect()
            })
            .collect()
    }

    /// Reference and user polylines for a whole snapshot.
    pub fn traces(&self, snapshot: &HistorySnapshot) -> (Vec<Vec<Point>>, Vec<Vec<Point>>) {
        (
            self.polylines(snapshot.reference.iter().copied()),
            self.polylines(snapshot.user.iter().copied()),
        )
    }

    /// y positions of the horizontal guide lines.
    pub fn grid_lines(&self) -> [f32; 3] {
        GRID_FREQUENCIES.map(|freq| self.y_for(freq))
    }
}
