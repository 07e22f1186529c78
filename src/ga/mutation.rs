//! Permutation mutation operators.
//!
//! Runtime-selectable via [`MutationType`]. Every variant moves genes
//! around without adding or dropping any, so the permutation invariant is
//! preserved, and every variant clears the individual's cached fitness.
//!
//! # Usage
//!
//! ```
//! use u_timetable::ga::MutationType;
//!
//! assert_eq!(MutationType::default(), MutationType::Swap);
//! ```

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use super::chromosome::Individual;

/// Perturbs an individual in place.
pub trait Mutation {
    /// Applies the mutation once.
    fn mutate<R: Rng>(&self, individual: &mut Individual, rng: &mut R);
}

/// Mutation strategy for placement-order chromosomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Swap two distinct random positions.
    #[default]
    Swap,
    /// Remove a gene and reinsert it at another position.
    Insert,
    /// Reverse a random segment.
    Invert,
}

impl Mutation for MutationType {
    fn mutate<R: Rng>(&self, individual: &mut Individual, rng: &mut R) {
        let len = individual.chromosome().len();
        if len < 2 {
            return;
        }
        let picks = index::sample(rng, len, 2);
        let (i, j) = (picks.index(0), picks.index(1));

        match self {
            MutationType::Swap => individual.swap_genes(i, j),
            MutationType::Insert => {
                let genes = individual.genes_mut();
                let gene = genes.remove(i);
                genes.insert(j, gene);
            }
            MutationType::Invert => {
                let (lo, hi) = (i.min(j), i.max(j));
                individual.genes_mut()[lo..=hi].reverse();
            }
        }
    }
}
