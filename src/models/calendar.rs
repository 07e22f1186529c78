//! Calendar slots and time windows.
//!
//! The exam calendar is the ordered set of (date, start time) slots at which
//! an exam may begin. Slots are kept in canonical order: chronological by
//! date, then by time of day. The decoder scans them in this order.
//!
//! # Time Model
//! Within a day, times are minutes since midnight. Occupancy windows are
//! half-open `[start, end)`, so back-to-back exams do not overlap.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A time interval `[start_min, end_min)` within one day.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (minutes since midnight, inclusive).
    pub start_min: i64,
    /// Interval end (minutes since midnight, exclusive).
    pub end_min: i64,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start_min: i64, end_min: i64) -> Self {
        Self { start_min, end_min }
    }

    /// Duration of this window (minutes).
    #[inline]
    pub fn duration_min(&self) -> i64 {
        self.end_min - self.start_min
    }

    /// Whether two windows overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }
}

/// A calendar slot: a date and a start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarSlot {
    /// Slot date.
    pub date: NaiveDate,
    /// Slot start time.
    pub start: NaiveTime,
}

impl CalendarSlot {
    /// Creates a slot.
    pub fn new(date: NaiveDate, start: NaiveTime) -> Self {
        Self { date, start }
    }

    /// Start as minutes since midnight.
    #[inline]
    pub fn start_minute(&self) -> i64 {
        i64::from(self.start.num_seconds_from_midnight() / 60)
    }
}

/// The ordered set of slots at which exams may start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CalendarSlot>", into = "Vec<CalendarSlot>")]
pub struct ExamCalendar {
    slots: Vec<CalendarSlot>,
}

impl From<Vec<CalendarSlot>> for ExamCalendar {
    fn from(slots: Vec<CalendarSlot>) -> Self {
        Self::new(slots)
    }
}

impl From<ExamCalendar> for Vec<CalendarSlot> {
    fn from(calendar: ExamCalendar) -> Self {
        calendar.slots
    }
}

impl ExamCalendar {
    /// Creates a calendar, sorting slots into canonical order.
    ///
    /// Duplicates are kept so that validation can report them.
    pub fn new(mut slots: Vec<CalendarSlot>) -> Self {
        slots.sort();
        Self { slots }
    }

    /// Builder: adds one day with the given start times.
    pub fn with_day(mut self, date: NaiveDate, starts: &[NaiveTime]) -> Self {
        self.slots
            .extend(starts.iter().map(|&start| CalendarSlot::new(date, start)));
        self.slots.sort();
        self
    }

    /// Slots in canonical order.
    #[inline]
    pub fn slots(&self) -> &[CalendarSlot] {
        &self.slots
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the calendar has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Distinct dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.slots.iter().map(|s| s.date).collect();
        dates.dedup();
        dates
    }

    /// Whether `count` consecutive slots starting at `index` lie on the same date.
    pub fn span_fits(&self, index: usize, count: u32) -> bool {
        let count = count.max(1) as usize;
        let Some(first) = self.slots.get(index) else {
            return false;
        };
        match self.slots.get(index + count - 1) {
            Some(last) => last.date == first.date,
            None => false,
        }
    }

    /// Whether the calendar contains this exact slot.
    pub fn contains(&self, slot: &CalendarSlot) -> bool {
        self.slots.binary_search(slot).is_ok()
    }
}
