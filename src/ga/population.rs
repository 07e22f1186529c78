//! Initial population.

use rand::Rng;
use rand::seq::SliceRandom;

use super::chromosome::{Chromosome, Individual};

/// Builds `size` individuals: the prime chromosome followed by
/// `size - 1` independently shuffled copies of it.
pub fn initial_population<R: Rng>(prime: &Chromosome, size: usize, rng: &mut R) -> Vec<Individual> {
    let mut population = Vec::with_capacity(size);
    if size == 0 {
        return population;
    }
    population.push(Individual::new(prime.clone()));
    for _ in 1..size {
        let mut genes = prime.genes().to_vec();
        genes.shuffle(rng);
        population.push(Individual::new(Chromosome::new(genes)));
    }
    population
}
