//! Timetable quality metrics (KPIs).
//!
//! Computes reporting indicators from a decoded schedule and the problem
//! it was decoded from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placed / Unplaced | Exams with / without a sitting |
//! | Placement Rate | placed / total exams |
//! | Minutes by Date | Occupied minutes per calendar date |
//! | Busiest Date | Date with the most occupied minutes |
//! | Imbalance | Σ \|load − mean\| over calendar dates (minutes) |
//! | Hard Violations | Violated hard or hardified constraints |
//! | Weak Penalty | Weighted weak constraint penalty |
//! | Fitness | Scalar cost (lower is better) |
//!
//! # Reference
//! Carter, Laporte & Lee (1996), "Examination timetabling: algorithmic
//! strategies and applications"

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::constraints::imbalance_minutes;
use crate::models::{ExamProblem, Schedule};

/// Timetable performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Exams with a sitting.
    pub placed: usize,
    /// Exams without a sitting.
    pub unplaced: usize,
    /// Fraction of exams placed (0.0..1.0).
    pub placement_rate: f64,
    /// Occupied minutes per calendar date (zero for empty dates).
    pub minutes_by_date: BTreeMap<NaiveDate, i64>,
    /// Date with the highest load, if any exam is placed.
    pub busiest_date: Option<NaiveDate>,
    /// Sum of absolute deviations from the mean daily load (minutes).
    pub imbalance_minutes: f64,
    /// Violated hard or hardified constraints.
    pub hard_violations: u32,
    /// Weighted weak penalty.
    pub weak_penalty: f64,
    /// Scalar cost.
    pub fitness: f64,
}

impl ScheduleKpi {
    /// Computes KPIs for a schedule decoded from `problem`.
    pub fn calculate(schedule: &Schedule, problem: &ExamProblem) -> Self {
        let mut minutes_by_date = schedule.minutes_by_date();
        for date in problem.dates() {
            minutes_by_date.entry(*date).or_insert(0);
        }

        // Ties resolve to the earliest date
        let busiest_date = minutes_by_date
            .iter()
            .filter(|(_, &m)| m > 0)
            .fold(None, |best: Option<(NaiveDate, i64)>, (&date, &m)| match best {
                Some((_, top)) if top >= m => best,
                _ => Some((date, m)),
            })
            .map(|(date, _)| date);

        let total = problem.exam_count();
        let placement_rate = if total == 0 {
            1.0
        } else {
            schedule.placed_count() as f64 / total as f64
        };

        let counter = problem.count(schedule);

        Self {
            placed: schedule.placed_count(),
            unplaced: schedule.unplaced_count(),
            placement_rate,
            minutes_by_date,
            busiest_date,
            imbalance_minutes: imbalance_minutes(schedule, problem.dates()),
            hard_violations: counter.hard_violations(),
            weak_penalty: counter.weak_penalty(),
            fitness: counter.fitness(),
        }
    }

    /// Whether every exam is placed and no hard constraint is violated.
    pub fn is_feasible(&self) -> bool {
        self.unplaced == 0 && self.hard_violations == 0
    }
}
