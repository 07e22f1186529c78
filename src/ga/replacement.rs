//! Generational replacement.
//!
//! # Elitist Replacement
//!
//! 1. Merge the previous population with the children.
//! 2. Stable-sort ascending by fitness (parents stay ahead of children on
//!    ties) and keep the best `|previous|`.
//! 3. Re-insert any of the previous generation's top `elite_count` that
//!    fell out, overwriting the worst survivors that are not elites.
//! 4. Sort ascending again.
//!
//! The best fitness therefore never worsens from one generation to the
//! next while `elite_count >= 1`.

use super::chromosome::{Chromosome, Individual};
use super::fitness::FitnessFunction;

/// Builds the next generation.
pub trait Replacement {
    /// Returns a population of exactly `previous.len()` individuals,
    /// sorted ascending by fitness.
    fn replace<F: FitnessFunction + ?Sized>(
        &self,
        previous: Vec<Individual>,
        children: Vec<Individual>,
        fitness: &F,
    ) -> Vec<Individual>;
}

/// Truncation replacement with guaranteed elite carry-over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElitistReplacement {
    elite_count: usize,
}

impl Default for ElitistReplacement {
    fn default() -> Self {
        Self { elite_count: 5 }
    }
}

impl ElitistReplacement {
    /// Creates a replacement keeping `elite_count` elites.
    pub fn new(elite_count: usize) -> Self {
        Self { elite_count }
    }

    /// Number of guaranteed elites.
    pub fn elite_count(&self) -> usize {
        self.elite_count
    }
}

impl Replacement for ElitistReplacement {
    fn replace<F: FitnessFunction + ?Sized>(
        &self,
        previous: Vec<Individual>,
        children: Vec<Individual>,
        fitness: &F,
    ) -> Vec<Individual> {
        let size = previous.len();

        let mut merged = previous;
        for individual in merged.iter_mut() {
            individual.score(fitness);
        }
        merged.sort_by(Individual::by_fitness);
        let elites: Vec<Individual> = merged[..self.elite_count.min(size)].to_vec();

        merged.reserve(children.len());
        for mut child in children {
            child.score(fitness);
            merged.push(child);
        }
        merged.sort_by(Individual::by_fitness);
        merged.truncate(size);

        let is_elite = |c: &Chromosome| elites.iter().any(|e| e.chromosome() == c);
        let missing: Vec<Individual> = elites
            .iter()
            .filter(|e| !merged.iter().any(|m| m.chromosome() == e.chromosome()))
            .cloned()
            .collect();

        let mut slot = merged.len();
        for elite in missing {
            while slot > 0 {
                slot -= 1;
                if !is_elite(merged[slot].chromosome()) {
                    merged[slot] = elite;
                    break;
                }
            }
        }

        merged.sort_by(Individual::by_fitness);
        merged
    }
}
