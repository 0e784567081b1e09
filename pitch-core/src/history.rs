//! # History Buffer Module
//!
//! Fixed-capacity two-channel time series feeding the live comparison graph.
//! Index `i` of the reference channel and index `i` of the user channel always
//! describe the same tick; a `None` sample is a gap the renderer must not
//! bridge.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of ticks kept for the live graph.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// Reference and user pitch history, pushed in lockstep.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    reference: VecDeque<Option<f32>>,
    user: VecDeque<Option<f32>>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// # Panics
    /// * If `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be positive");
        Self {
            reference: VecDeque::with_capacity(capacity + 1),
            user: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends one tick to both channels, evicting the oldest tick when full.
    pub fn push(&mut self, reference: Option<f32>, user: Option<f32>) {
        self.reference.push_back(reference);
        self.user.push_back(user);
        while self.reference.len() > self.capacity {
            self.reference.pop_front();
            self.user.pop_front();
        }
        debug_assert_eq!(self.reference.len(), self.user.len());
    }

    /// Empties both channels.
    pub fn reset(&mut self) {
        self.reference.clear();
        self.user.clear();
    }

    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reference(&self) -> &VecDeque<Option<f32>> {
        &self.reference
    }

    pub fn user(&self) -> &VecDeque<Option<f32>> {
        &self.user
    }

    /// Iterates `(reference, user)` pairs from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (Option<f32>, Option<f32>)> + '_ {
        self.reference.iter().copied().zip(self.user.iter().copied())
    }

    /// Copies both channels out for a renderer.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            capacity: self.capacity,
            reference: self.reference.iter().copied().collect(),
            user: self.user.iter().copied().collect(),
        }
    }
}

/// An owned copy of the history; both channels have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub capacity: usize,
    pub reference: Vec<Option<f32>>,
    pub user: Vec<Option<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_in_lockstep() {
        let mut history = HistoryBuffer::default();
        for i in 0..250 {
            history.push(Some(i as f32), Some(i as f32 + 0.5));
            assert_eq!(history.reference().len(), history.user().len());
        }
        assert_eq!(history.len(), 200);

        let snapshot = history.snapshot();
        assert_eq!(snapshot.reference.len(), 200);
        assert_eq!(snapshot.user.len(), 200);
        assert_eq!(snapshot.reference.first(), Some(&Some(50.0)));
        assert_eq!(snapshot.reference.last(), Some(&Some(249.0)));
        assert_eq!(snapshot.user.first(), Some(&Some(50.5)));
        for (i, (reference, user)) in history.iter().enumerate() {
            assert_eq!(reference, Some((i + 50) as f32));
            assert_eq!(user, Some((i + 50) as f32 + 0.5));
        }
    }

    #[test]
    fn gaps_are_preserved() {
        let mut history = HistoryBuffer::new(4);
        history.push(Some(440.0), None);
        history.push(None, Some(220.0));
        history.push(None, None);
        let snapshot = history.snapshot();
        assert_eq!(snapshot.reference, vec![Some(440.0), None, None]);
        assert_eq!(snapshot.user, vec![None, Some(220.0), None]);
    }

    #[test]
    fn reset_clears_both_channels() {
        let mut history = HistoryBuffer::new(3);
        history.push(Some(1.0), Some(2.0));
        history.reset();
        assert!(history.is_empty());
        assert!(history.user().is_empty());
        assert_eq!(history.capacity(), 3);
    }

    #[test]
    #[should_panic(expected = "history capacity must be positive")]
    fn zero_capacity_panics() {
        let _ = HistoryBuffer::new(0);
    }
}
