//! Greedy first-fit decoder.
//!
//! # Algorithm
//!
//! 1. Record every pre-fixed exam at its fixed slot.
//! 2. Walk the chromosome; skip fixed exams.
//! 3. For each free exam, scan calendar slots in canonical order and take
//!    the first slot where
//!    - `slot_count` consecutive slots exist on that date from there,
//!    - the occupied window overlaps no exam already placed that date,
//!    - every attached hard rule admits the placement.
//! 4. Exams with no such slot are recorded as unplaced, as are registry
//!    exams the order never mentions.
//!
//! Decoding is deterministic and never mutates the problem.
//!
//! # Complexity
//! O(n * s * n) where n=exams, s=calendar slots.
//!
//! # Reference
//! Burke & Petrovic (2002), "Recent research directions in automated
//! timetabling", §3: sequential construction heuristics

use crate::models::{Assignment, Exam, ExamId, ExamProblem, Schedule};

/// Chromosome-order greedy decoder.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use u_timetable::models::{Exam, ExamCalendar, ExamId, ExamProblem};
/// use u_timetable::scheduler::GreedyDecoder;
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
/// let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// let calendar = ExamCalendar::default().with_day(day, &[nine]);
/// let problem = ExamProblem::new(vec![Exam::new(1, 120), Exam::new(2, 60)], calendar, vec![])
///     .unwrap();
///
/// let schedule = GreedyDecoder::new(&problem).decode(&[ExamId(2), ExamId(1)]);
/// assert!(schedule.is_placed(ExamId(2)));
/// assert_eq!(schedule.unplaced, vec![ExamId(1)]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GreedyDecoder<'a> {
    problem: &'a ExamProblem,
}

impl<'a> GreedyDecoder<'a> {
    /// Creates a decoder over a configured problem.
    pub fn new(problem: &'a ExamProblem) -> Self {
        Self { problem }
    }

    /// Decodes a placement order into a schedule.
    pub fn decode(&self, order: &[ExamId]) -> Schedule {
        let mut schedule = Schedule::new();

        // Fixed exams occupy their time regardless of chromosome position
        for exam in self.problem.exams() {
            if let Some(slot) = exam.fixed {
                schedule.place(Assignment::new(exam.id, slot, exam.window_at(&slot)).as_fixed());
            }
        }

        for &exam_id in order {
            let Some(exam) = self.problem.exam(exam_id) else {
                continue;
            };
            if exam.is_fixed() || schedule.is_placed(exam_id) {
                continue;
            }
            match self.first_fit(exam, &schedule) {
                Some(assignment) => schedule.place(assignment),
                None => {
                    tracing::trace!(exam = %exam_id, label = %exam.label(), "no admissible slot");
                    schedule.mark_unplaced(exam_id);
                }
            }
        }

        for exam in self.problem.exams() {
            if !schedule.is_placed(exam.id) && !schedule.unplaced.contains(&exam.id) {
                tracing::trace!(exam = %exam.id, "exam missing from placement order");
                schedule.mark_unplaced(exam.id);
            }
        }

        schedule
    }

    /// First admissible placement for `exam`, in canonical slot order.
    fn first_fit(&self, exam: &Exam, schedule: &Schedule) -> Option<Assignment> {
        let calendar = self.problem.calendar();
        calendar
            .slots()
            .iter()
            .enumerate()
            .filter(|&(index, _)| calendar.span_fits(index, exam.slot_count))
            .map(|(_, slot)| Assignment::new(exam.id, *slot, exam.window_at(slot)))
            .find(|candidate| {
                !schedule
                    .assignments
                    .values()
                    .any(|placed| placed.collides_with(candidate))
                    && exam
                        .hard_rules
                        .iter()
                        .all(|rule| rule.admits(candidate, schedule))
            })
    }
}
