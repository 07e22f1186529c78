//! Exam (schedulable item) model.
//!
//! An exam is the unit placed on the calendar. It has a sitting duration,
//! optional extra time (e.g. for accommodations), an optional fixed
//! placement decided before optimization, and the hard rules attached to it
//! by hardified constraints.
//!
//! # Time Model
//! Occupancy is measured in minutes of the day. An exam starting at a slot
//! occupies `[start, start + duration + extra)` on that slot's date.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::calendar::{CalendarSlot, TimeWindow};
use crate::constraints::HardRule;

/// Exam identifier.
///
/// Chromosomes, constraints and schedules refer to exams only through this
/// id, never through references into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExamId(pub u32);

impl fmt::Display for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ExamId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// An exam to be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    /// Unique exam identifier.
    pub id: ExamId,
    /// Subject code.
    #[serde(default)]
    pub code: String,
    /// Human-readable name (used in reports).
    #[serde(default)]
    pub name: String,
    /// Sitting duration (minutes).
    pub duration_minutes: i64,
    /// Extra minutes appended to the sitting.
    #[serde(default)]
    pub extra_minutes: i64,
    /// Consecutive same-day calendar slots required at the start position.
    #[serde(default = "default_slot_count")]
    pub slot_count: u32,
    /// Pre-decided placement. Fixed exams are never moved by the decoder.
    #[serde(default)]
    pub fixed: Option<CalendarSlot>,
    /// Placement-time rules installed by hardified constraints.
    #[serde(skip)]
    pub hard_rules: Vec<HardRule>,
}

fn default_slot_count() -> u32 {
    1
}

impl Exam {
    /// Creates a new exam with the given id and duration.
    pub fn new(id: impl Into<ExamId>, duration_minutes: i64) -> Self {
        Self {
            id: id.into(),
            code: String::new(),
            name: String::new(),
            duration_minutes,
            extra_minutes: 0,
            slot_count: 1,
            fixed: None,
            hard_rules: Vec::new(),
        }
    }

    /// Sets the subject code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the extra minutes appended to the sitting.
    pub fn with_extra_minutes(mut self, minutes: i64) -> Self {
        self.extra_minutes = minutes;
        self
    }

    /// Sets the number of consecutive slots required.
    pub fn with_slot_count(mut self, count: u32) -> Self {
        self.slot_count = count;
        self
    }

    /// Pins the exam to a slot.
    pub fn fixed_at(mut self, slot: CalendarSlot) -> Self {
        self.fixed = Some(slot);
        self
    }

    /// Whether the exam was placed before optimization.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// Total occupied minutes (duration + extra time).
    #[inline]
    pub fn occupied_minutes(&self) -> i64 {
        self.duration_minutes + self.extra_minutes
    }

    /// Occupied window if the exam starts at `slot`.
    pub fn window_at(&self, slot: &CalendarSlot) -> TimeWindow {
        let start = slot.start_minute();
        TimeWindow::new(start, start + self.occupied_minutes())
    }

    /// Label for logs and reports: the name if present, else the code, else the id.
    pub fn label(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else if !self.code.is_empty() {
            self.code.clone()
        } else {
            format!("exam {}", self.id)
        }
    }
}
