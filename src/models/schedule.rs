//! Schedule (decoded solution) model.
//!
//! A schedule maps each exam either to a concrete placement (date and
//! occupied window) or to "unplaced". Schedules are produced fresh by every
//! decode; the exam registry itself never holds placement state.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::calendar::{CalendarSlot, TimeWindow};
use super::exam::ExamId;

/// An exam placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Placed exam.
    pub exam_id: ExamId,
    /// Date of the sitting.
    pub date: NaiveDate,
    /// Start time of the slot the exam was placed on.
    pub start: NaiveTime,
    /// Occupied window (minutes since midnight).
    pub window: TimeWindow,
    /// Whether the placement came from a pre-fixed exam.
    pub fixed: bool,
}

impl Assignment {
    /// Creates an assignment at a slot with the given occupied window.
    pub fn new(exam_id: ExamId, slot: CalendarSlot, window: TimeWindow) -> Self {
        Self {
            exam_id,
            date: slot.date,
            start: slot.start,
            window,
            fixed: false,
        }
    }

    /// Marks the assignment as pre-fixed.
    pub fn as_fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Occupied minutes.
    #[inline]
    pub fn duration_min(&self) -> i64 {
        self.window.duration_min()
    }

    /// Whether this sitting ends no later than `other` begins.
    pub fn finishes_before(&self, other: &Assignment) -> bool {
        self.date < other.date
            || (self.date == other.date && self.window.end_min <= other.window.start_min)
    }

    /// Whether two sittings overlap in time.
    pub fn collides_with(&self, other: &Assignment) -> bool {
        self.date == other.date && self.window.overlaps(&other.window)
    }
}

/// A decoded schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Placed exams by id.
    pub assignments: BTreeMap<ExamId, Assignment>,
    /// Exams that could not be placed, in decode order.
    pub unplaced: Vec<ExamId>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a placement.
    pub fn place(&mut self, assignment: Assignment) {
        self.assignments.insert(assignment.exam_id, assignment);
    }

    /// Records an exam that could not be placed.
    pub fn mark_unplaced(&mut self, exam_id: ExamId) {
        self.unplaced.push(exam_id);
    }

    /// Placement of an exam, if placed.
    #[inline]
    pub fn assignment(&self, exam_id: ExamId) -> Option<&Assignment> {
        self.assignments.get(&exam_id)
    }

    /// Whether the exam is placed.
    #[inline]
    pub fn is_placed(&self, exam_id: ExamId) -> bool {
        self.assignments.contains_key(&exam_id)
    }

    /// Number of placed exams.
    pub fn placed_count(&self) -> usize {
        self.assignments.len()
    }

    /// Number of unplaced exams.
    pub fn unplaced_count(&self) -> usize {
        self.unplaced.len()
    }

    /// Whether every exam has a placement.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    /// Occupied minutes per date (only dates with at least one sitting).
    pub fn minutes_by_date(&self) -> BTreeMap<NaiveDate, i64> {
        let mut load = BTreeMap::new();
        for a in self.assignments.values() {
            *load.entry(a.date).or_insert(0) += a.duration_min();
        }
        load
    }

    /// Assignments sorted by date, then start time.
    pub fn chronological(&self) -> Vec<&Assignment> {
        let mut out: Vec<&Assignment> = self.assignments.values().collect();
        out.sort_by_key(|a| (a.date, a.window.start_min, a.exam_id));
        out
    }

    /// Number of overlapping placement pairs.
    ///
    /// The decoder never produces overlaps; schedules assembled by hand or
    /// deserialized may contain them.
    pub fn collision_count(&self) -> usize {
        let sorted = self.chronological();
        let mut count = 0;
        for (i, a) in sorted.iter().enumerate() {
            for b in &sorted[i + 1..] {
                if b.date != a.date || b.window.start_min >= a.window.end_min {
                    break;
                }
                if a.collides_with(b) {
                    count += 1;
                }
            }
        }
        count
    }
}
