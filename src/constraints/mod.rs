//! Constraint system.
//!
//! Constraints form a closed set of variants ([`ConstraintKind`]), each in
//! one of three classes ([`ConstraintClass`]). Every constraint evaluates
//! itself against a decoded [`Schedule`](crate::models::Schedule) and
//! reports to a [`ConstraintCounter`], which folds the outcomes into the
//! scalar cost used as fitness.
//!
//! Hardified constraints also install [`HardRule`]s on their exams so the
//! decoder refuses violating placements up front.

mod constraint;
mod counter;
mod hard_rule;

pub use constraint::{
    imbalance_minutes, Constraint, ConstraintClass, ConstraintDef, ConstraintId, ConstraintKind,
    Outcome,
};
pub use counter::{ConstraintCounter, ConstraintOutcome, EvaluationReport, PenaltyWeights};
pub use hard_rule::HardRule;
