//! Placement-time rules attached to exams by hardified constraints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Assignment, ExamId, Schedule};

/// A rule the decoder enforces while placing an exam.
///
/// Rules referring to another exam only bind once that exam is placed;
/// until then they admit every candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardRule {
    /// Date must lie within `[start, end]`.
    WithinDays { start: NaiveDate, end: NaiveDate },
    /// Date must differ from `date`.
    NotOnDay { date: NaiveDate },
    /// Sitting must finish before `other` starts.
    Before { other: ExamId },
    /// Sitting must start after `other` finishes.
    After { other: ExamId },
}

impl HardRule {
    /// Whether placing `candidate` is allowed given the placements so far.
    pub fn admits(&self, candidate: &Assignment, placed: &Schedule) -> bool {
        match self {
            HardRule::WithinDays { start, end } => {
                candidate.date >= *start && candidate.date <= *end
            }
            HardRule::NotOnDay { date } => candidate.date != *date,
            HardRule::Before { other } => placed
                .assignment(*other)
                .map_or(true, |o| candidate.finishes_before(o)),
            HardRule::After { other } => placed
                .assignment(*other)
                .map_or(true, |o| o.finishes_before(candidate)),
        }
    }
}
