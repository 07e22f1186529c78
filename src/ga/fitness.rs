//! Fitness evaluation.
//!
//! Fitness is a scalar cost, lower is better: decode the chromosome, run
//! every constraint through a fresh counter, fold the tallies with the
//! problem's penalty weights.

use super::chromosome::Chromosome;
use crate::models::ExamProblem;

/// Scores a chromosome. Lower is better.
///
/// Must be deterministic: the same chromosome always yields the same value.
pub trait FitnessFunction {
    /// Scalar cost of `chromosome`.
    fn evaluate(&self, chromosome: &Chromosome) -> f64;

    /// The gene set every evaluated chromosome must be a permutation of,
    /// when the function knows it.
    fn expected_genes(&self) -> Option<Chromosome> {
        None
    }
}

/// Decode-and-count fitness over an [`ExamProblem`].
#[derive(Debug, Clone, Copy)]
pub struct ExamFitness<'a> {
    problem: &'a ExamProblem,
}

impl<'a> ExamFitness<'a> {
    /// Creates a fitness function over a configured problem.
    pub fn new(problem: &'a ExamProblem) -> Self {
        Self { problem }
    }

    /// The underlying problem.
    pub fn problem(&self) -> &'a ExamProblem {
        self.problem
    }
}

impl FitnessFunction for ExamFitness<'_> {
    fn evaluate(&self, chromosome: &Chromosome) -> f64 {
        let schedule = self.problem.decode(chromosome);
        self.problem.count(&schedule).fitness()
    }

    fn expected_genes(&self) -> Option<Chromosome> {
        Some(self.problem.initial_chromosome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintDef;
    use crate::models::{Exam, ExamCalendar, ExamId};
    use chrono::{NaiveDate, NaiveTime};

    fn problem() -> ExamProblem {
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let two = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        let calendar = ExamCalendar::default()
            .with_day(day(3), &[nine, two])
            .with_day(day(4), &[nine]);
        let exams = vec![Exam::new(1, 120), Exam::new(2, 90), Exam::new(3, 60)];
        let defs = vec![ConstraintDef::order(3, 1), ConstraintDef::unbalanced_days()];
        ExamProblem::new(exams, calendar, defs).unwrap()
    }

    #[test]
    fn test_fitness_deterministic() {
        let p = problem();
        let f = ExamFitness::new(&p);
        let c = p.initial_chromosome();
        assert_eq!(f.evaluate(&c), f.evaluate(&c));
    }

    #[test]
    fn test_better_order_scores_lower() {
        let p = problem();
        let f = ExamFitness::new(&p);
        let registry = p.initial_chromosome(); // 1, 2, 3 → order(3, 1) violated
        let respectful = Chromosome::new(vec![ExamId(3), ExamId(1), ExamId(2)]);
        assert!(f.evaluate(&respectful) < f.evaluate(&registry));
    }

    #[test]
    fn test_expected_genes_are_registry_order() {
        let p = problem();
        let f = ExamFitness::new(&p);
        assert_eq!(f.expected_genes(), Some(p.initial_chromosome()));
    }

    #[test]
    fn test_partial_order_scores_missing_exams() {
        let p = problem();
        let f = ExamFitness::new(&p);
        let partial = Chromosome::new(vec![ExamId(3)]);
        assert!(f.evaluate(&partial) >= 2.0 * p.weights().collision);
    }

    #[test]
    fn test_matches_report() {
        let p = problem();
        let f = ExamFitness::new(&p);
        let c = p.initial_chromosome();
        assert_eq!(f.evaluate(&c), p.evaluate(&p.decode(&c)).fitness());
    }
}
