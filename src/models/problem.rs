//! Exam timetabling problem registry.
//!
//! [`ExamProblem`] owns everything a run reads: exams, calendar, the
//! registered constraints and the penalty weights. It is configured
//! (validated, hardified) up front and then only borrowed immutably, so
//! fitness evaluation can run in parallel.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::ExamCalendar;
use super::exam::{Exam, ExamId};
use super::schedule::Schedule;
use crate::constraints::{
    Constraint, ConstraintCounter, ConstraintDef, ConstraintId, ConstraintKind, ConstraintOutcome,
    EvaluationReport, PenaltyWeights,
};
use crate::error::ConfigError;
use crate::ga::Chromosome;
use crate::scheduler::GreedyDecoder;
use crate::validation::validate_problem;

/// Serializable shape of a problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDefinition {
    /// Exams to place.
    pub exams: Vec<Exam>,
    /// Slots at which exams may start.
    pub calendar: ExamCalendar,
    /// Constraint definitions, in registration order.
    #[serde(default)]
    pub constraints: Vec<ConstraintDef>,
    /// Penalty weights.
    #[serde(default)]
    pub weights: PenaltyWeights,
}

/// A validated exam timetabling problem.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use u_timetable::constraints::ConstraintDef;
/// use u_timetable::models::{Exam, ExamCalendar, ExamProblem};
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
/// let calendar = ExamCalendar::default().with_day(
///     day,
///     &[NaiveTime::from_hms_opt(9, 0, 0).unwrap(), NaiveTime::from_hms_opt(14, 0, 0).unwrap()],
/// );
/// let exams = vec![Exam::new(1, 120), Exam::new(2, 90)];
/// let problem = ExamProblem::new(exams, calendar, vec![ConstraintDef::order(1, 2)]).unwrap();
///
/// let schedule = problem.decode(&problem.initial_chromosome());
/// assert!(schedule.is_complete());
/// assert_eq!(problem.evaluate(&schedule).counter.hard_violations(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ExamProblem {
    exams: Vec<Exam>,
    index: HashMap<ExamId, usize>,
    calendar: ExamCalendar,
    dates: Vec<NaiveDate>,
    constraints: Vec<Constraint>,
    weights: PenaltyWeights,
}

impl ExamProblem {
    /// Builds a problem with default penalty weights.
    ///
    /// Validates the input, registers the constraints in order (ids are
    /// their positions), appends the unplaced-exam catch-all, and hardifies
    /// every definition flagged `hardify`.
    pub fn new(
        exams: Vec<Exam>,
        calendar: ExamCalendar,
        defs: Vec<ConstraintDef>,
    ) -> Result<Self, ConfigError> {
        validate_problem(&exams, &calendar, &defs).map_err(ConfigError::Validation)?;

        let index = exams
            .iter()
            .enumerate()
            .map(|(i, exam)| (exam.id, i))
            .collect();
        let dates = calendar.dates();

        let mut constraints: Vec<Constraint> = defs
            .iter()
            .enumerate()
            .map(|(i, def)| Constraint::new(ConstraintId(i), def.kind.clone()))
            .collect();
        if !constraints
            .iter()
            .any(|c| matches!(c.kind(), ConstraintKind::Unplaced))
        {
            constraints.push(Constraint::new(
                ConstraintId(constraints.len()),
                ConstraintKind::Unplaced,
            ));
        }

        let mut problem = Self {
            exams,
            index,
            calendar,
            dates,
            constraints,
            weights: PenaltyWeights::default(),
        };

        for (i, def) in defs.iter().enumerate() {
            if def.hardify {
                problem.hardify(ConstraintId(i))?;
            }
        }

        tracing::info!(
            exams = problem.exams.len(),
            slots = problem.calendar.len(),
            constraints = problem.constraints.len(),
            "exam problem configured"
        );
        Ok(problem)
    }

    /// Builds a problem from its serializable definition.
    pub fn from_definition(definition: ProblemDefinition) -> Result<Self, ConfigError> {
        let ProblemDefinition {
            exams,
            calendar,
            constraints,
            weights,
        } = definition;
        Self::new(exams, calendar, constraints)?.with_weights(weights)
    }

    /// Parses and builds a problem from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let definition: ProblemDefinition = serde_json::from_str(json)?;
        Self::from_definition(definition)
    }

    /// Replaces the penalty weights.
    pub fn with_weights(mut self, weights: PenaltyWeights) -> Result<Self, ConfigError> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    /// Promotes a weak constraint to hard and attaches its rules to the
    /// affected exams.
    ///
    /// Must happen before the run starts; a constraint is promoted at most
    /// once.
    pub fn hardify(&mut self, id: ConstraintId) -> Result<(), ConfigError> {
        let constraint = self
            .constraints
            .get_mut(id.0)
            .ok_or(ConfigError::UnknownConstraint(id))?;
        let code = constraint.code();
        let rules = constraint.hardify()?;

        for (exam_id, rule) in rules {
            if let Some(&i) = self.index.get(&exam_id) {
                self.exams[i].hard_rules.push(rule);
            }
        }
        tracing::info!(constraint = %id, code, "constraint hardified");
        Ok(())
    }

    /// Exams in registry order.
    #[inline]
    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    /// Looks up an exam by id.
    pub fn exam(&self, id: ExamId) -> Option<&Exam> {
        self.index.get(&id).map(|&i| &self.exams[i])
    }

    /// Number of exams.
    pub fn exam_count(&self) -> usize {
        self.exams.len()
    }

    /// The calendar.
    #[inline]
    pub fn calendar(&self) -> &ExamCalendar {
        &self.calendar
    }

    /// Distinct calendar dates, ascending.
    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Registered constraints, including the unplaced catch-all.
    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Looks up a constraint by id.
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id.0)
    }

    /// Penalty weights.
    #[inline]
    pub fn weights(&self) -> &PenaltyWeights {
        &self.weights
    }

    /// The prime chromosome: every exam in registry order.
    pub fn initial_chromosome(&self) -> Chromosome {
        Chromosome::new(self.exams.iter().map(|e| e.id).collect())
    }

    /// Decodes a chromosome into a schedule (greedy first-fit).
    pub fn decode(&self, chromosome: &Chromosome) -> Schedule {
        GreedyDecoder::new(self).decode(chromosome.genes())
    }

    /// Runs every constraint against `schedule` through a fresh counter.
    pub fn count(&self, schedule: &Schedule) -> ConstraintCounter {
        let mut counter = ConstraintCounter::new(self.weights);
        for constraint in &self.constraints {
            constraint.count_me(schedule, &self.dates, &mut counter);
        }
        counter
    }

    /// Counts like [`count`](Self::count), keeping the per-constraint outcomes.
    pub fn evaluate(&self, schedule: &Schedule) -> EvaluationReport {
        let mut counter = ConstraintCounter::new(self.weights);
        let outcomes = self
            .constraints
            .iter()
            .map(|constraint| {
                let outcome = constraint.count_me(schedule, &self.dates, &mut counter);
                ConstraintOutcome {
                    id: constraint.id(),
                    code: constraint.code(),
                    class: constraint.class(),
                    fulfilled: outcome.fulfilled,
                    amount: outcome.amount,
                }
            })
            .collect();
        EvaluationReport { counter, outcomes }
    }
}
