//! Constraint variants and their evaluation.
//!
//! # Classes
//!
//! | Class | Evaluated as | Decoder enforcement |
//! |-------|--------------|---------------------|
//! | `Weak` | graded penalty | none |
//! | `Hard` | boolean | none (post-hoc count) |
//! | `Hardified` | boolean | attached `HardRule`s reject violating slots |
//!
//! A hardifiable weak constraint moves `Weak → Hardified` at most once,
//! before any evaluation happens.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::counter::ConstraintCounter;
use super::hard_rule::HardRule;
use crate::error::ConfigError;
use crate::models::{ExamId, Schedule};

/// Position of a constraint in its problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintId(pub usize);

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a constraint checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// `exam` must sit on a date within `[start, end]`.
    DayInterval {
        exam: ExamId,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// `exam` must not sit on `date`.
    DayBanned { exam: ExamId, date: NaiveDate },
    /// `first` must finish before `second` starts.
    Order { first: ExamId, second: ExamId },
    /// Minutes of exams per calendar date should be even.
    UnbalancedDays,
    /// Every exam should be placed, and no two sittings may overlap.
    Unplaced,
}

impl ConstraintKind {
    /// Short code used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            ConstraintKind::DayInterval { .. } => "DI",
            ConstraintKind::DayBanned { .. } => "DB",
            ConstraintKind::Order { .. } => "OE",
            ConstraintKind::UnbalancedDays => "UDP",
            ConstraintKind::Unplaced => "UE",
        }
    }

    /// Whether this kind may be promoted to hard.
    pub fn is_hardifiable(&self) -> bool {
        matches!(
            self,
            ConstraintKind::DayInterval { .. }
                | ConstraintKind::DayBanned { .. }
                | ConstraintKind::Order { .. }
        )
    }

    /// Class a fresh constraint of this kind starts in.
    pub fn initial_class(&self) -> ConstraintClass {
        match self {
            ConstraintKind::Unplaced => ConstraintClass::Hard,
            _ => ConstraintClass::Weak,
        }
    }

    /// Exams referenced by this constraint.
    pub fn exams(&self) -> Vec<ExamId> {
        match self {
            ConstraintKind::DayInterval { exam, .. } | ConstraintKind::DayBanned { exam, .. } => {
                vec![*exam]
            }
            ConstraintKind::Order { first, second } => vec![*first, *second],
            ConstraintKind::UnbalancedDays | ConstraintKind::Unplaced => Vec::new(),
        }
    }
}

/// Evaluation class of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintClass {
    /// Always mandatory.
    Hard,
    /// Penalized when violated.
    Weak,
    /// Weak constraint promoted to mandatory.
    Hardified,
}

impl ConstraintClass {
    /// Whether violations count as hard violations.
    #[inline]
    pub fn is_hard(self) -> bool {
        !matches!(self, ConstraintClass::Weak)
    }
}

/// Input form of a constraint: its kind and whether to hardify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDef {
    #[serde(flatten)]
    pub kind: ConstraintKind,
    /// Promote to hard when the problem is built.
    #[serde(default)]
    pub hardify: bool,
}

impl ConstraintDef {
    /// A weak definition.
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            hardify: false,
        }
    }

    /// Requests hardification.
    pub fn hardified(mut self) -> Self {
        self.hardify = true;
        self
    }

    /// Day interval restriction.
    pub fn day_interval(exam: impl Into<ExamId>, start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(ConstraintKind::DayInterval {
            exam: exam.into(),
            start,
            end,
        })
    }

    /// Banned day restriction.
    pub fn day_banned(exam: impl Into<ExamId>, date: NaiveDate) -> Self {
        Self::new(ConstraintKind::DayBanned {
            exam: exam.into(),
            date,
        })
    }

    /// Ordering restriction: `first` before `second`.
    pub fn order(first: impl Into<ExamId>, second: impl Into<ExamId>) -> Self {
        Self::new(ConstraintKind::Order {
            first: first.into(),
            second: second.into(),
        })
    }

    /// Day load balancing penalty.
    pub fn unbalanced_days() -> Self {
        Self::new(ConstraintKind::UnbalancedDays)
    }
}

/// Graded amounts at or below this count as fulfilled.
const FULFILLED_TOLERANCE: f64 = 1e-9;

/// Result of evaluating one constraint against one schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// Whether the constraint holds.
    pub fulfilled: bool,
    /// Graded amount: violations, unplaced exams, or imbalance minutes.
    pub amount: f64,
}

impl Outcome {
    #[inline]
    fn holds() -> Self {
        Self {
            fulfilled: true,
            amount: 0.0,
        }
    }

    #[inline]
    fn violated_by(amount: f64) -> Self {
        Self {
            fulfilled: amount <= FULFILLED_TOLERANCE,
            amount,
        }
    }

    #[inline]
    fn check(ok: bool) -> Self {
        if ok {
            Self::holds()
        } else {
            Self::violated_by(1.0)
        }
    }
}

/// A constraint registered in a problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    id: ConstraintId,
    kind: ConstraintKind,
    class: ConstraintClass,
}

impl Constraint {
    /// Creates a constraint in its initial class.
    pub fn new(id: ConstraintId, kind: ConstraintKind) -> Self {
        let class = kind.initial_class();
        Self { id, kind, class }
    }

    /// Constraint id.
    #[inline]
    pub fn id(&self) -> ConstraintId {
        self.id
    }

    /// Constraint kind.
    #[inline]
    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    /// Current class.
    #[inline]
    pub fn class(&self) -> ConstraintClass {
        self.class
    }

    /// Short code of the kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Promotes a weak constraint to hard.
    ///
    /// Returns the rules to attach to exams so that the decoder rejects
    /// violating placements.
    pub fn hardify(&mut self) -> Result<Vec<(ExamId, HardRule)>, ConfigError> {
        if !self.kind.is_hardifiable() {
            return Err(ConfigError::NotHardifiable {
                id: self.id,
                code: self.code(),
            });
        }
        if self.class.is_hard() {
            return Err(ConfigError::AlreadyHard(self.id));
        }
        self.class = ConstraintClass::Hardified;

        let rules = match self.kind {
            ConstraintKind::DayInterval { exam, start, end } => {
                vec![(exam, HardRule::WithinDays { start, end })]
            }
            ConstraintKind::DayBanned { exam, date } => vec![(exam, HardRule::NotOnDay { date })],
            ConstraintKind::Order { first, second } => vec![
                (first, HardRule::Before { other: second }),
                (second, HardRule::After { other: first }),
            ],
            ConstraintKind::UnbalancedDays | ConstraintKind::Unplaced => Vec::new(),
        };
        Ok(rules)
    }

    /// Evaluates against a schedule.
    ///
    /// `dates` are the calendar dates, used to spread load for the
    /// balancing penalty. Per-exam constraints hold vacuously while their
    /// exams are unplaced; the `Unplaced` constraint penalizes those.
    pub fn evaluate(&self, schedule: &Schedule, dates: &[NaiveDate]) -> Outcome {
        match &self.kind {
            ConstraintKind::DayInterval { exam, start, end } => match schedule.assignment(*exam) {
                Some(a) => Outcome::check(a.date >= *start && a.date <= *end),
                None => Outcome::holds(),
            },
            ConstraintKind::DayBanned { exam, date } => match schedule.assignment(*exam) {
                Some(a) => Outcome::check(a.date != *date),
                None => Outcome::holds(),
            },
            ConstraintKind::Order { first, second } => {
                match (schedule.assignment(*first), schedule.assignment(*second)) {
                    (Some(a), Some(b)) => Outcome::check(a.finishes_before(b)),
                    _ => Outcome::holds(),
                }
            }
            ConstraintKind::UnbalancedDays => Outcome::violated_by(imbalance_minutes(schedule, dates)),
            ConstraintKind::Unplaced => Outcome::violated_by(
                (schedule.unplaced_count() + schedule.collision_count()) as f64,
            ),
        }
    }

    /// Whether the constraint holds for the schedule.
    pub fn is_fulfilled(&self, schedule: &Schedule, dates: &[NaiveDate]) -> bool {
        self.evaluate(schedule, dates).fulfilled
    }

    /// Evaluates and reports the outcome to `counter`.
    pub fn count_me(
        &self,
        schedule: &Schedule,
        dates: &[NaiveDate],
        counter: &mut ConstraintCounter,
    ) -> Outcome {
        let outcome = self.evaluate(schedule, dates);
        counter.count(self, &outcome);
        outcome
    }
}

/// Sum of absolute deviations of per-date minutes from the mean.
///
/// Dates without sittings count as zero load. Dates of sittings outside
/// `dates` are included as well.
pub fn imbalance_minutes(schedule: &Schedule, dates: &[NaiveDate]) -> f64 {
    let mut load = schedule.minutes_by_date();
    for date in dates {
        load.entry(*date).or_insert(0);
    }
    if load.is_empty() {
        return 0.0;
    }
    let total: i64 = load.values().sum();
    let mean = total as f64 / load.len() as f64;
    load.values().map(|&m| (m as f64 - mean).abs()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::PenaltyWeights;
    use crate::models::{Assignment, CalendarSlot, TimeWindow};
    use chrono::NaiveTime;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn at(id: u32, day: u32, h: u32, minutes: i64) -> Assignment {
        let slot = CalendarSlot::new(d(day), NaiveTime::from_hms_opt(h, 0, 0).unwrap());
        let start = slot.start_minute();
        Assignment::new(ExamId(id), slot, TimeWindow::new(start, start + minutes))
    }

    #[test]
    fn test_codes_and_classes() {
        let c = Constraint::new(ConstraintId(0), ConstraintKind::Unplaced);
        assert_eq!(c.code(), "UE");
        assert_eq!(c.class(), ConstraintClass::Hard);

        let c = Constraint::new(ConstraintId(1), ConstraintKind::UnbalancedDays);
        assert_eq!(c.code(), "UDP");
        assert_eq!(c.class(), ConstraintClass::Weak);
        assert!(!c.kind().is_hardifiable());
    }

    #[test]
    fn test_day_interval() {
        let c = Constraint::new(
            ConstraintId(0),
            ConstraintDef::day_interval(1, d(3), d(5)).kind,
        );
        let mut s = Schedule::new();
        assert!(c.is_fulfilled(&s, &[])); // unplaced holds vacuously
        s.place(at(1, 5, 9, 60));
        assert!(c.is_fulfilled(&s, &[]));
        s.place(at(1, 6, 9, 60));
        let o = c.evaluate(&s, &[]);
        assert!(!o.fulfilled);
        assert_eq!(o.amount, 1.0);
    }

    #[test]
    fn test_day_banned() {
        let c = Constraint::new(ConstraintId(0), ConstraintDef::day_banned(1, d(4)).kind);
        let mut s = Schedule::new();
        s.place(at(1, 4, 9, 60));
        assert!(!c.is_fulfilled(&s, &[]));
        s.place(at(1, 3, 9, 60));
        assert!(c.is_fulfilled(&s, &[]));
    }

    #[test]
    fn test_order() {
        let c = Constraint::new(ConstraintId(0), ConstraintDef::order(1, 2).kind);
        let mut s = Schedule::new();
        s.place(at(2, 3, 9, 60));
        assert!(c.is_fulfilled(&s, &[])); // exam 1 unplaced
        s.place(at(1, 3, 12, 60));
        assert!(!c.is_fulfilled(&s, &[]));
        s.place(at(1, 2, 12, 60));
        assert!(c.is_fulfilled(&s, &[]));
    }

    #[test]
    fn test_imbalance_counts_empty_dates() {
        let mut s = Schedule::new();
        s.place(at(1, 2, 9, 120));
        s.place(at(2, 2, 12, 60));
        // Loads: day 2 = 180, day 3 = 0 → mean 90 → deviations 90 + 90
        assert_eq!(imbalance_minutes(&s, &[d(2), d(3)]), 180.0);

        s.place(at(3, 3, 9, 180));
        assert_eq!(imbalance_minutes(&s, &[d(2), d(3)]), 0.0);
        let c = Constraint::new(ConstraintId(0), ConstraintKind::UnbalancedDays);
        assert!(c.is_fulfilled(&s, &[d(2), d(3)]));
    }

    #[test]
    fn test_unplaced_amount() {
        let c = Constraint::new(ConstraintId(0), ConstraintKind::Unplaced);
        let mut s = Schedule::new();
        assert!(c.is_fulfilled(&s, &[]));
        s.mark_unplaced(ExamId(1));
        s.mark_unplaced(ExamId(2));
        let o = c.evaluate(&s, &[]);
        assert!(!o.fulfilled);
        assert_eq!(o.amount, 2.0);
    }

    #[test]
    fn test_overlapping_sittings_count_as_collisions() {
        let c = Constraint::new(ConstraintId(0), ConstraintKind::Unplaced);
        let mut s = Schedule::new();
        s.place(at(1, 3, 9, 120).as_fixed());
        s.place(at(2, 3, 9, 120).as_fixed());
        s.place(at(3, 3, 11, 60));

        let o = c.evaluate(&s, &[d(3)]);
        assert!(!o.fulfilled);
        assert_eq!(o.amount, 1.0);

        let mut counter = ConstraintCounter::new(PenaltyWeights::default());
        c.count_me(&s, &[d(3)], &mut counter);
        assert_eq!(counter.collisions(), 1);
        assert!(!counter.is_feasible());
    }

    #[test]
    fn test_hardify_order_attaches_both_sides() {
        let mut c = Constraint::new(ConstraintId(3), ConstraintDef::order(1, 2).kind);
        let rules = c.hardify().unwrap();
        assert_eq!(c.class(), ConstraintClass::Hardified);
        assert_eq!(
            rules,
            vec![
                (ExamId(1), HardRule::Before { other: ExamId(2) }),
                (ExamId(2), HardRule::After { other: ExamId(1) }),
            ]
        );
    }

    #[test]
    fn test_hardify_only_once() {
        let mut c = Constraint::new(ConstraintId(0), ConstraintDef::day_banned(1, d(4)).kind);
        assert!(c.hardify().is_ok());
        assert!(matches!(c.hardify(), Err(ConfigError::AlreadyHard(ConstraintId(0)))));
    }

    #[test]
    fn test_hardify_rejects_fully_weak() {
        let mut c = Constraint::new(ConstraintId(5), ConstraintKind::UnbalancedDays);
        assert!(matches!(
            c.hardify(),
            Err(ConfigError::NotHardifiable { code: "UDP", .. })
        ));
        assert_eq!(c.class(), ConstraintClass::Weak);
    }

    #[test]
    fn test_def_json() {
        let json = r#"{"type": "day_banned", "exam": 3, "date": "2024-06-04", "hardify": true}"#;
        let def: ConstraintDef = serde_json::from_str(json).unwrap();
        assert!(def.hardify);
        assert_eq!(def.kind, ConstraintKind::DayBanned { exam: ExamId(3), date: d(4) });

        let def: ConstraintDef = serde_json::from_str(r#"{"type": "unbalanced_days"}"#).unwrap();
        assert!(!def.hardify);
    }
}
