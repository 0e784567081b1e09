//! # Scoring Module
//!
//! Buckets a cent offset into Match / Near / Miss with a direction, keeps the
//! running per-session counters and turns them into the end-of-session
//! report card.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offsets up to this many cents count as a match.
pub const MATCH_CENTS: f32 = 20.0;

/// Offsets up to this many cents (and above [`MATCH_CENTS`]) count as near.
pub const NEAR_CENTS: f32 = 50.0;

/// Sessions with fewer classified ticks than this produce no report.
pub const MIN_REPORT_SAMPLES: u32 = 50;

/// Feedback for one voiced tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Match,
    NearHigh,
    NearLow,
    TooHigh,
    TooLow,
}

/// The counter a [`Classification`] contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Match,
    Near,
    Miss,
}

impl Classification {
    /// Classifies a signed cent offset; positive means sharp.
    ///
    /// Zero and the boundaries themselves fall into the tighter bucket, so
    /// exactly 20 cents is a match and exactly 50 cents is near.
    pub fn from_cents(cents: f32) -> Self {
        let abs_cents = cents.abs();
        let sharp = cents > 0.0;
        if abs_cents <= MATCH_CENTS {
            Classification::Match
        } else if abs_cents <= NEAR_CENTS {
            if sharp {
                Classification::NearHigh
            } else {
                Classification::NearLow
            }
        } else if sharp {
            Classification::TooHigh
        } else {
            Classification::TooLow
        }
    }

    pub fn bucket(self) -> Bucket {
        match self {
            Classification::Match => Bucket::Match,
            Classification::NearHigh | Classification::NearLow => Bucket::Near,
            Classification::TooHigh | Classification::TooLow => Bucket::Miss,
        }
    }

    /// Status pill text shown next to the live pitch.
    pub fn label(self) -> &'static str {
        match self {
            Classification::Match => "Match",
            Classification::NearHigh => "Near (High)",
            Classification::NearLow => "Near (Low)",
            Classification::TooHigh => "Too High",
            Classification::TooLow => "Too Low",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Running counters for one listening session.
///
/// Counters only ever grow; a new session gets a fresh value instead of
/// decrementing the old one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScore {
    pub total: u32,
    #[serde(rename = "match")]
    pub matched: u32,
    pub near: u32,
    pub miss: u32,
}

impl SessionScore {
    /// Counts one classified tick in its bucket and in `total`.
    pub fn record(&mut self, classification: Classification) {
        match classification.bucket() {
            Bucket::Match => self.matched += 1,
            Bucket::Near => self.near += 1,
            Bucket::Miss => self.miss += 1,
        }
        self.total += 1;
    }

    /// Builds the report card, or `None` when too few ticks were classified.
    pub fn report(&self) -> Option<SessionReport> {
        SessionReport::from_score(self)
    }
}

/// Qualitative verdict attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportMessage {
    Excellent,
    Good,
    Fair,
    NeedsPractice,
}

impl ReportMessage {
    pub fn from_score(score: u32) -> Self {
        if score > 85 {
            ReportMessage::Excellent
        } else if score > 70 {
            ReportMessage::Good
        } else if score > 50 {
            ReportMessage::Fair
        } else {
            ReportMessage::NeedsPractice
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            ReportMessage::Excellent => "Incredible! You nailed it.",
            ReportMessage::Good => "Great job! You were mostly on pitch.",
            ReportMessage::Fair => "Good effort. Try to listen closely to the reference.",
            ReportMessage::NeedsPractice => "Keep practicing!",
        }
    }
}

impl fmt::Display for ReportMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// End-of-session report card. All percentages are rounded to integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Overall score where a near tick is worth half a match.
    pub score: u32,
    pub match_percent: u32,
    pub near_percent: u32,
    pub miss_percent: u32,
    pub message: ReportMessage,
}

impl SessionReport {
    pub fn from_score(score: &SessionScore) -> Option<Self> {
        if score.total < MIN_REPORT_SAMPLES {
            return None;
        }
        let total = f64::from(score.total);
        let percent = |count: f64| ((count / total) * 100.0).round() as u32;

        let overall = percent(f64::from(score.matched) + f64::from(score.near) * 0.5);
        Some(Self {
            score: overall,
            match_percent: percent(f64::from(score.matched)),
            near_percent: percent(f64::from(score.near)),
            miss_percent: percent(f64::from(score.miss)),
            message: ReportMessage::from_score(overall),
        })
    }
}
