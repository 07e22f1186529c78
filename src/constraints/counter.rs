//! Violation counting and fitness aggregation.
//!
//! A [`ConstraintCounter`] is built fresh for every evaluation. Constraints
//! report their outcomes to it; it folds them into three tallies:
//!
//! - **collisions**: exams that could not be placed, plus overlapping
//!   sitting pairs
//! - **hard violations**: hard or hardified constraints that do not hold
//! - **weak penalty**: weighted sum of graded weak violations
//!
//! The scalar cost is `collisions * w_c + hard * w_h + weak`. A feasible
//! schedule beats an infeasible one only while its weak penalty stays
//! below `min(w_c, w_h)`; see [`PenaltyWeights`].

use serde::{Deserialize, Serialize};

use super::constraint::{Constraint, ConstraintClass, ConstraintId, ConstraintKind, Outcome};
use crate::error::ConfigError;

/// Weights folding tallies into a scalar cost.
///
/// The fold is a plain weighted sum, so the collision and hard weights only
/// dominate while the weak penalty stays below `min(collision,
/// hard_violation)`. With the defaults that is 1e6: about a thousand weak
/// order violations, or a million minutes of day imbalance, outweigh one
/// unplaced exam. Raise `collision` and `hard_violation` for instances that
/// can accumulate weak penalties of that size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Cost per unplaced exam or overlapping sitting pair.
    pub collision: f64,
    /// Cost per violated hard or hardified constraint.
    pub hard_violation: f64,
    /// Cost per weak day-interval violation.
    pub day_interval: f64,
    /// Cost per weak banned-day violation.
    pub day_banned: f64,
    /// Cost per weak ordering violation.
    pub order: f64,
    /// Cost per minute of day-load deviation.
    pub imbalance_per_minute: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            collision: 1_000_000.0,
            hard_violation: 1_000_000.0,
            day_interval: 1_000.0,
            day_banned: 1_000.0,
            order: 1_000.0,
            imbalance_per_minute: 1.0,
        }
    }
}

impl PenaltyWeights {
    /// Parses weights from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let weights: Self = serde_json::from_str(json)?;
        weights.validate()?;
        Ok(weights)
    }

    /// Rejects negative or non-finite weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("collision", self.collision),
            ("hard_violation", self.hard_violation),
            ("day_interval", self.day_interval),
            ("day_banned", self.day_banned),
            ("order", self.order),
            ("imbalance_per_minute", self.imbalance_per_minute),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid_parameter(
                    name,
                    format!("weight must be finite and non-negative, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Weight applied to one unit of a weak violation of `kind`.
    pub fn weak_weight(&self, kind: &ConstraintKind) -> f64 {
        match kind {
            ConstraintKind::DayInterval { .. } => self.day_interval,
            ConstraintKind::DayBanned { .. } => self.day_banned,
            ConstraintKind::Order { .. } => self.order,
            ConstraintKind::UnbalancedDays => self.imbalance_per_minute,
            ConstraintKind::Unplaced => self.collision,
        }
    }
}

/// Per-evaluation violation accumulator.
#[derive(Debug, Clone)]
pub struct ConstraintCounter {
    weights: PenaltyWeights,
    collisions: u32,
    hard_violations: u32,
    weak_penalty: f64,
}

impl ConstraintCounter {
    /// Creates an empty counter.
    pub fn new(weights: PenaltyWeights) -> Self {
        Self {
            weights,
            collisions: 0,
            hard_violations: 0,
            weak_penalty: 0.0,
        }
    }

    /// Records one constraint outcome.
    pub fn count(&mut self, constraint: &Constraint, outcome: &Outcome) {
        if outcome.fulfilled {
            return;
        }
        match (constraint.kind(), constraint.class()) {
            (ConstraintKind::Unplaced, _) => self.collisions += outcome.amount.round() as u32,
            (_, ConstraintClass::Hard | ConstraintClass::Hardified) => self.hard_violations += 1,
            (kind, ConstraintClass::Weak) => {
                self.weak_penalty += outcome.amount * self.weights.weak_weight(kind)
            }
        }
    }

    /// Unplaced exams plus overlapping sitting pairs.
    #[inline]
    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    /// Violated hard constraints.
    #[inline]
    pub fn hard_violations(&self) -> u32 {
        self.hard_violations
    }

    /// Weighted weak penalty.
    #[inline]
    pub fn weak_penalty(&self) -> f64 {
        self.weak_penalty
    }

    /// Whether no collision or hard violation was counted.
    pub fn is_feasible(&self) -> bool {
        self.collisions == 0 && self.hard_violations == 0
    }

    /// Scalar cost (lower is better).
    pub fn fitness(&self) -> f64 {
        f64::from(self.collisions) * self.weights.collision
            + f64::from(self.hard_violations) * self.weights.hard_violation
            + self.weak_penalty
    }
}

/// Outcome of one constraint, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintOutcome {
    pub id: ConstraintId,
    pub code: &'static str,
    pub class: ConstraintClass,
    pub fulfilled: bool,
    pub amount: f64,
}

/// Full evaluation of a schedule: tallies plus per-constraint outcomes.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub counter: ConstraintCounter,
    pub outcomes: Vec<ConstraintOutcome>,
}

impl EvaluationReport {
    /// Scalar cost of the evaluated schedule.
    pub fn fitness(&self) -> f64 {
        self.counter.fitness()
    }

    /// Outcomes of constraints that do not hold.
    pub fn violated(&self) -> impl Iterator<Item = &ConstraintOutcome> {
        self.outcomes.iter().filter(|o| !o.fulfilled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintDef;
    use chrono::NaiveDate;

    fn violated(amount: f64) -> Outcome {
        Outcome {
            fulfilled: false,
            amount,
        }
    }

    #[test]
    fn test_weighted_fold() {
        let weights = PenaltyWeights::default();
        let mut counter = ConstraintCounter::new(weights);

        let unplaced = Constraint::new(ConstraintId(0), ConstraintKind::Unplaced);
        let order = Constraint::new(ConstraintId(1), ConstraintDef::order(1, 2).kind);
        let balance = Constraint::new(ConstraintId(2), ConstraintKind::UnbalancedDays);

        counter.count(&unplaced, &violated(2.0));
        counter.count(&order, &violated(1.0));
        counter.count(&balance, &violated(45.0));

        assert_eq!(counter.collisions(), 2);
        assert_eq!(counter.hard_violations(), 0);
        assert_eq!(counter.weak_penalty(), 1_045.0);
        assert_eq!(counter.fitness(), 2_000_000.0 + 1_045.0);
        assert!(!counter.is_feasible());
    }

    #[test]
    fn test_hardified_counts_as_hard() {
        let mut counter = ConstraintCounter::new(PenaltyWeights::default());
        let date = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let mut banned = Constraint::new(ConstraintId(0), ConstraintDef::day_banned(1, date).kind);
        banned.hardify().unwrap();

        counter.count(&banned, &violated(1.0));
        assert_eq!(counter.hard_violations(), 1);
        assert_eq!(counter.weak_penalty(), 0.0);
        assert_eq!(counter.fitness(), 1_000_000.0);
    }

    #[test]
    fn test_fulfilled_outcomes_ignored() {
        let mut counter = ConstraintCounter::new(PenaltyWeights::default());
        let c = Constraint::new(ConstraintId(0), ConstraintKind::UnbalancedDays);
        counter.count(
            &c,
            &Outcome {
                fulfilled: true,
                amount: 0.0,
            },
        );
        assert_eq!(counter.fitness(), 0.0);
        assert!(counter.is_feasible());
    }

    #[test]
    fn test_weak_penalty_dominates_past_collision_weight() {
        let weights = PenaltyWeights::default();
        let unplaced = Constraint::new(ConstraintId(0), ConstraintKind::Unplaced);
        let order = Constraint::new(ConstraintId(1), ConstraintDef::order(1, 2).kind);

        let mut infeasible = ConstraintCounter::new(weights);
        infeasible.count(&unplaced, &violated(1.0));

        let mut below = ConstraintCounter::new(weights);
        for _ in 0..999 {
            below.count(&order, &violated(1.0));
        }
        assert!(below.is_feasible());
        assert!(below.fitness() < infeasible.fitness());

        let mut above = ConstraintCounter::new(weights);
        for _ in 0..1001 {
            above.count(&order, &violated(1.0));
        }
        assert!(above.is_feasible());
        assert!(above.fitness() > infeasible.fitness());
    }

    #[test]
    fn test_weights_from_json_partial() {
        let w = PenaltyWeights::from_json(r#"{"order": 50.0}"#).unwrap();
        assert_eq!(w.order, 50.0);
        assert_eq!(w.collision, 1_000_000.0);
    }

    #[test]
    fn test_weights_reject_negative() {
        let err = PenaltyWeights::from_json(r#"{"day_banned": -1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "day_banned", .. }));
    }
}
