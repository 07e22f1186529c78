//! Chromosome decoding and KPI evaluation.
//!
//! Turns a placement order into a concrete timetable and reports on its
//! quality.
//!
//! # Algorithm
//!
//! `GreedyDecoder` places exams in chromosome order, each on the earliest
//! admissible calendar slot. It is not optimal on its own; the GA searches
//! over orders to find good decodings.
//!
//! # KPI
//!
//! `ScheduleKpi` computes timetable metrics: placement rate, daily load,
//! imbalance, and constraint penalty totals.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Carter, Laporte & Lee (1996), "Examination timetabling"

mod decoder;
mod kpi;

pub use decoder::GreedyDecoder;
pub use kpi::ScheduleKpi;
