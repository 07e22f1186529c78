//! Permutation chromosome and evaluated individual.
//!
//! # Encoding
//!
//! A chromosome is a permutation of all exam ids. It encodes the order in
//! which the greedy decoder places exams; the decoder alone turns it into
//! dates and times.
//!
//! # Reference
//! Burke, Newall & Weare (1998), "Initialization strategies and diversity
//! in evolutionary timetabling"

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::fitness::FitnessFunction;
use crate::models::ExamId;

/// Placement order over all exams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chromosome(Vec<ExamId>);

impl Chromosome {
    /// Wraps a gene sequence.
    pub fn new(genes: Vec<ExamId>) -> Self {
        Self(genes)
    }

    /// Genes in order.
    #[inline]
    pub fn genes(&self) -> &[ExamId] {
        &self.0
    }

    /// Number of genes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chromosome has no genes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether both chromosomes hold the same ids, each exactly once.
    pub fn is_permutation_of(&self, other: &Chromosome) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut a = self.0.clone();
        let mut b = other.0.clone();
        a.sort_unstable();
        b.sort_unstable();
        a.windows(2).all(|w| w[0] != w[1]) && a == b
    }
}

impl From<Vec<ExamId>> for Chromosome {
    fn from(genes: Vec<ExamId>) -> Self {
        Self(genes)
    }
}

/// A chromosome with its memoized fitness.
///
/// Every method that changes the genes clears the cached value.
///
/// Lower fitness = better individual (minimization convention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    chromosome: Chromosome,
    #[serde(skip)]
    fitness: Option<f64>,
}

impl Individual {
    /// Creates an unevaluated individual.
    pub fn new(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            fitness: None,
        }
    }

    /// Creates an individual with a known fitness.
    pub fn evaluated(chromosome: Chromosome, fitness: f64) -> Self {
        Self {
            chromosome,
            fitness: Some(fitness),
        }
    }

    /// The chromosome.
    #[inline]
    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    /// Consumes the individual, returning its chromosome.
    pub fn into_chromosome(self) -> Chromosome {
        self.chromosome
    }

    /// Cached fitness, if evaluated.
    #[inline]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Whether a fitness value is cached.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Fitness for ranking; unevaluated individuals rank last.
    #[inline]
    pub fn rank_key(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    /// Returns the cached fitness, evaluating and caching it on first use.
    pub fn score<F: FitnessFunction + ?Sized>(&mut self, fitness: &F) -> f64 {
        match self.fitness {
            Some(value) => value,
            None => {
                let value = fitness.evaluate(&self.chromosome);
                self.fitness = Some(value);
                value
            }
        }
    }

    /// Mutable genes. Clears the cached fitness.
    pub fn genes_mut(&mut self) -> &mut Vec<ExamId> {
        self.fitness = None;
        &mut self.chromosome.0
    }

    /// Exchanges two genes. Clears the cached fitness.
    pub fn swap_genes(&mut self, i: usize, j: usize) {
        self.genes_mut().swap(i, j);
    }

    /// Ascending fitness order, unevaluated last.
    pub fn by_fitness(a: &Individual, b: &Individual) -> Ordering {
        a.rank_key().total_cmp(&b.rank_key())
    }
}
