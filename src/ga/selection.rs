//! Parent selection.
//!
//! # Roulette Wheel
//!
//! Each individual is drawn with probability proportional to
//! `1 / max(fitness, MIN_FITNESS)`, so lower-cost individuals are favored.
//! The cumulative weight array is built once per generation in
//! [`Selection::reset`]; each draw is then a binary search.
//!
//! # Reference
//! Goldberg (1989), "Genetic Algorithms in Search, Optimization, and
//! Machine Learning", Ch. 1: reproduction by roulette wheel

use rand::Rng;

use super::chromosome::Individual;

/// Floor applied to fitness before inversion.
pub const MIN_FITNESS: f64 = 1e-9;

/// Draws parent pairs from a population.
pub trait Selection {
    /// Prepares for a new generation.
    fn reset(&mut self, population: &[Individual]);

    /// Draws one parent pair, as indices into `population`.
    ///
    /// Draws are independent, so both indices may coincide.
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> (usize, usize);

    /// Number of parent pairs to draw per generation.
    fn max_pairs(&self, population_size: usize) -> usize;
}

/// Fitness-proportionate selection on inverted cost.
#[derive(Debug, Clone, Default)]
pub struct RouletteSelection {
    cumulative: Vec<f64>,
    uniform: bool,
    pairs: Option<usize>,
}

impl RouletteSelection {
    /// Creates a roulette drawing `population / 2` pairs per generation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of pairs drawn per generation.
    pub fn with_max_pairs(mut self, pairs: usize) -> Self {
        self.pairs = Some(pairs);
        self
    }

    /// Whether the last reset fell back to uniform sampling.
    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    fn draw<R: Rng>(&self, len: usize, rng: &mut R) -> usize {
        if self.uniform || self.cumulative.len() != len {
            return rng.random_range(0..len);
        }
        let total = self.cumulative[len - 1];
        let r = rng.random::<f64>() * total;
        self.cumulative
            .partition_point(|&c| c <= r)
            .min(len - 1)
    }
}

impl Selection for RouletteSelection {
    fn reset(&mut self, population: &[Individual]) {
        self.cumulative.clear();
        let mut total = 0.0;
        for individual in population {
            let weight = match individual.fitness() {
                Some(f) => 1.0 / f.max(MIN_FITNESS),
                None => 0.0,
            };
            total += weight;
            self.cumulative.push(total);
        }

        self.uniform = !(total.is_finite() && total > 0.0);
        if self.uniform && !population.is_empty() {
            tracing::warn!(
                total,
                population = population.len(),
                "roulette weights degenerate, falling back to uniform selection"
            );
        }
    }

    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> (usize, usize) {
        assert!(!population.is_empty(), "cannot select from an empty population");
        let n = population.len();
        (self.draw(n, rng), self.draw(n, rng))
    }

    fn max_pairs(&self, population_size: usize) -> usize {
        self.pairs.unwrap_or(population_size / 2)
    }
}
