//! Exam timetabling domain models.
//!
//! Provides the data types describing a timetabling problem and its
//! decoded solutions.
//!
//! # Domain Mappings
//!
//! | u-timetable | University | Certification | Conference |
//! |-------------|------------|---------------|------------|
//! | Exam | Course exam | Test sitting | Talk |
//! | CalendarSlot | Exam period start | Session | Time slot |
//! | ExamCalendar | Exam session | Test window | Program grid |
//! | Schedule | Timetable | Roster | Agenda |

mod calendar;
mod exam;
mod problem;
mod schedule;

pub use calendar::{CalendarSlot, ExamCalendar, TimeWindow};
pub use exam::{Exam, ExamId};
pub use problem::{ExamProblem, ProblemDefinition};
pub use schedule::{Assignment, Schedule};
