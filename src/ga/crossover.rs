//! Permutation crossover.
//!
//! # Order Crossover (OX)
//!
//! Two distinct cut points `start < end` are drawn from `0..=len`. Child 1
//! keeps the father's genes in `[start, end)` at their positions; every
//! other position is filled left to right with the mother's genes in her
//! relative order, skipping genes already copied. Child 2 swaps the roles.
//! Both children are permutations whenever the parents are.
//!
//! # Reference
//! Davis (1985), "Applying adaptive algorithms to epistatic domains"

use std::collections::HashSet;

use rand::Rng;
use rand::seq::index;

use super::chromosome::{Chromosome, Individual};
use crate::models::ExamId;

/// Recombines two parents into two children.
pub trait Crossover {
    /// Produces exactly two children, unevaluated.
    fn crossover<R: Rng>(
        &self,
        father: &Individual,
        mother: &Individual,
        rng: &mut R,
    ) -> (Individual, Individual);
}

/// Order crossover (OX).
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderCrossover;

impl Crossover for OrderCrossover {
    fn crossover<R: Rng>(
        &self,
        father: &Individual,
        mother: &Individual,
        rng: &mut R,
    ) -> (Individual, Individual) {
        let f = father.chromosome().genes();
        let m = mother.chromosome().genes();
        let len = f.len();

        if len < 2 {
            return (
                Individual::new(father.chromosome().clone()),
                Individual::new(mother.chromosome().clone()),
            );
        }

        let cuts = index::sample(rng, len + 1, 2);
        let (a, b) = (cuts.index(0), cuts.index(1));
        let (start, end) = (a.min(b), a.max(b));

        let child1 = ox_build_child(f, m, start, end);
        let child2 = ox_build_child(m, f, start, end);
        (
            Individual::new(Chromosome::new(child1)),
            Individual::new(Chromosome::new(child2)),
        )
    }
}

fn ox_build_child(template: &[ExamId], donor: &[ExamId], start: usize, end: usize) -> Vec<ExamId> {
    let kept: HashSet<ExamId> = template[start..end].iter().copied().collect();
    let mut donor_iter = donor.iter().copied().filter(|g| !kept.contains(g));

    let mut child = Vec::with_capacity(template.len());
    for (i, &gene) in template.iter().enumerate() {
        if (start..end).contains(&i) {
            child.push(gene);
        } else if let Some(g) = donor_iter.next() {
            child.push(g);
        }
    }
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;

    fn genes(raw: &[u32]) -> Vec<ExamId> {
        raw.iter().map(|&i| ExamId(i)).collect()
    }

    fn individual(raw: &[u32]) -> Individual {
        Individual::new(Chromosome::new(genes(raw)))
    }

    #[test]
    fn test_build_child_known_cuts() {
        let father = genes(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mother = genes(&[8, 6, 4, 2, 7, 5, 3, 1]);

        // Keep father[2..5] = 3, 4, 5; fill with mother order minus {3, 4, 5}
        assert_eq!(
            ox_build_child(&father, &mother, 2, 5),
            genes(&[8, 6, 3, 4, 5, 2, 7, 1])
        );
        assert_eq!(
            ox_build_child(&mother, &father, 2, 5),
            genes(&[1, 3, 4, 2, 7, 5, 6, 8])
        );
    }

    #[test]
    fn test_children_are_permutations() {
        let mut rng = SmallRng::seed_from_u64(42);
        let base: Vec<ExamId> = (1..=20).map(ExamId).collect();

        for _ in 0..200 {
            let mut f = base.clone();
            let mut m = base.clone();
            f.shuffle(&mut rng);
            m.shuffle(&mut rng);
            let father = Individual::new(Chromosome::new(f));
            let mother = Individual::new(Chromosome::new(m));

            let (c1, c2) = OrderCrossover.crossover(&father, &mother, &mut rng);
            assert!(c1.chromosome().is_permutation_of(father.chromosome()));
            assert!(c2.chromosome().is_permutation_of(father.chromosome()));
            assert!(!c1.is_evaluated());
            assert!(!c2.is_evaluated());
        }
    }

    #[test]
    fn test_identical_parents_reproduce() {
        let mut rng = SmallRng::seed_from_u64(7);
        let p = individual(&[4, 2, 3, 1]);
        let (c1, c2) = OrderCrossover.crossover(&p, &p, &mut rng);
        assert_eq!(c1.chromosome(), p.chromosome());
        assert_eq!(c2.chromosome(), p.chromosome());
    }

    #[test]
    fn test_short_chromosomes_cloned() {
        let mut rng = SmallRng::seed_from_u64(7);
        let f = Individual::evaluated(Chromosome::new(genes(&[1])), 3.0);
        let (c1, c2) = OrderCrossover.crossover(&f, &f, &mut rng);
        assert_eq!(c1.chromosome(), f.chromosome());
        assert_eq!(c2.chromosome(), f.chromosome());
        assert!(!c1.is_evaluated());
    }
}
