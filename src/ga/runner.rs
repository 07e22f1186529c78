//! Generational evolution loop.
//!
//! # Algorithm
//!
//! 1. Seed one `StdRng` from the config; build the initial population
//!    (prime chromosome plus shuffled copies) and evaluate it.
//! 2. Per generation:
//!    - reset the selection on the current population,
//!    - draw `max_pairs` parent pairs; each pair yields two children via
//!      crossover, each child is mutated with probability `p`,
//!    - evaluate the children (in parallel when enabled),
//!    - replace: merge, truncate, re-insert elites.
//! 3. Stop after `max_generations` or when the monitor asks to.
//!
//! The initial chromosome is checked against the fitness function's gene
//! set, and every child against the initial chromosome; anything else is
//! a caller or operator bug and panics.
//!
//! # Reference
//! Goldberg (1989), "Genetic Algorithms in Search, Optimization, and
//! Machine Learning"

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use super::chromosome::{Chromosome, Individual};
use super::config::GaConfig;
use super::crossover::{Crossover, OrderCrossover};
use super::fitness::FitnessFunction;
use super::mutation::{Mutation, MutationType};
use super::population::initial_population;
use super::replacement::{ElitistReplacement, Replacement};
use super::selection::{RouletteSelection, Selection};
use crate::error::ConfigError;

/// Per-generation summary handed to monitors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Completed generations (1-based).
    pub generation: usize,
    /// Lowest fitness in the population.
    pub best_fitness: f64,
    /// Mean fitness of the population.
    pub average_fitness: f64,
}

impl GenerationStats {
    fn of(generation: usize, population: &[Individual]) -> Self {
        let best_fitness = population
            .iter()
            .map(Individual::rank_key)
            .fold(f64::INFINITY, f64::min);
        let average_fitness = if population.is_empty() {
            f64::INFINITY
        } else {
            population.iter().map(Individual::rank_key).sum::<f64>() / population.len() as f64
        };
        Self {
            generation,
            best_fitness,
            average_fitness,
        }
    }
}

/// Observes a run. Purely observational apart from the termination request.
pub trait GenerationMonitor {
    fn name(&self) -> &str;

    fn on_start(&mut self, _config: &GaConfig) {}
    fn on_generation(&mut self, stats: &GenerationStats);
    fn on_end(&mut self, _best_fitness: f64) {}

    /// Checked after every generation.
    fn should_terminate(&self) -> bool {
        false
    }
}

/// Monitor that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl GenerationMonitor for NoopMonitor {
    fn name(&self) -> &str {
        "NoopMonitor"
    }

    fn on_generation(&mut self, _stats: &GenerationStats) {}
}

/// Progress reporting through `tracing`.
///
/// Logs every improvement of the best fitness, plus a heartbeat every
/// `interval` generations.
#[derive(Debug, Clone)]
pub struct TracingMonitor {
    interval: usize,
    best: f64,
}

impl TracingMonitor {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            best: f64::INFINITY,
        }
    }
}

impl Default for TracingMonitor {
    fn default() -> Self {
        Self::new(10)
    }
}

impl GenerationMonitor for TracingMonitor {
    fn name(&self) -> &str {
        "TracingMonitor"
    }

    fn on_start(&mut self, config: &GaConfig) {
        self.best = f64::INFINITY;
        tracing::info!(
            population = config.population_size,
            generations = config.max_generations,
            "evolution started"
        );
    }

    fn on_generation(&mut self, stats: &GenerationStats) {
        if stats.best_fitness < self.best {
            self.best = stats.best_fitness;
            tracing::info!(
                generation = stats.generation,
                best = stats.best_fitness,
                "new best fitness"
            );
        } else if stats.generation % self.interval == 0 {
            tracing::info!(
                generation = stats.generation,
                best = stats.best_fitness,
                average = stats.average_fitness,
                "generation progress"
            );
        }
    }

    fn on_end(&mut self, best_fitness: f64) {
        tracing::info!(best = best_fitness, "evolution finished");
    }
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Best individual of the final population.
    pub best: Individual,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generations completed.
    pub generations: usize,
    /// Stats of every completed generation.
    pub history: Vec<GenerationStats>,
    /// Final population, ascending by fitness.
    pub population: Vec<Individual>,
    /// Whether a monitor stopped the run before the budget.
    pub terminated_early: bool,
}

impl GaResult {
    /// Up to `n` individuals with pairwise different chromosomes, best first.
    pub fn distinct_best(&self, n: usize) -> Vec<&Individual> {
        let mut seen: HashSet<&Chromosome> = HashSet::new();
        self.population
            .iter()
            .filter(|ind| seen.insert(ind.chromosome()))
            .take(n)
            .collect()
    }
}

/// GA driver, generic over its operators.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use u_timetable::constraints::ConstraintDef;
/// use u_timetable::ga::{ExamFitness, GaConfig, GaRunner};
/// use u_timetable::models::{Exam, ExamCalendar, ExamProblem};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
/// let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// let calendar = ExamCalendar::default()
///     .with_day(day(3), &[nine])
///     .with_day(day(4), &[nine]);
/// let exams = vec![Exam::new(1, 120), Exam::new(2, 120)];
/// let problem =
///     ExamProblem::new(exams, calendar, vec![ConstraintDef::order(2, 1)]).unwrap();
///
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_max_generations(5);
/// let mut runner = GaRunner::new(config).unwrap();
/// let result = runner.run(&problem.initial_chromosome(), &ExamFitness::new(&problem));
///
/// let schedule = problem.decode(result.best.chromosome());
/// assert!(schedule.is_complete());
/// assert_eq!(result.best_fitness, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct GaRunner<
    S = RouletteSelection,
    C = OrderCrossover,
    M = MutationType,
    R = ElitistReplacement,
> {
    config: GaConfig,
    selection: S,
    crossover: C,
    mutation: M,
    replacement: R,
}

impl GaRunner {
    /// Creates a runner with the default operators and the configured
    /// elite count.
    pub fn new(config: GaConfig) -> Result<Self, ConfigError> {
        let replacement = ElitistReplacement::new(config.elite_count);
        Self::with_operators(
            config,
            RouletteSelection::new(),
            OrderCrossover,
            MutationType::default(),
            replacement,
        )
    }
}

impl<S, C, M, R> GaRunner<S, C, M, R>
where
    S: Selection,
    C: Crossover,
    M: Mutation,
    R: Replacement,
{
    /// Creates a runner with explicit operators.
    pub fn with_operators(
        config: GaConfig,
        selection: S,
        crossover: C,
        mutation: M,
        replacement: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            selection,
            crossover,
            mutation,
            replacement,
        })
    }

    /// Run parameters.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Runs the full generation budget.
    pub fn run<F>(&mut self, initial: &Chromosome, fitness: &F) -> GaResult
    where
        F: FitnessFunction + Sync + ?Sized,
    {
        self.run_with_monitor(initial, fitness, &mut NoopMonitor)
    }

    /// Runs, reporting each generation to `monitor`.
    pub fn run_with_monitor<F, Mon>(
        &mut self,
        initial: &Chromosome,
        fitness: &F,
        monitor: &mut Mon,
    ) -> GaResult
    where
        F: FitnessFunction + Sync + ?Sized,
        Mon: GenerationMonitor + ?Sized,
    {
        if let Some(expected) = fitness.expected_genes() {
            assert!(
                initial.is_permutation_of(&expected),
                "initial chromosome is not a permutation of the problem's genes: {:?}",
                initial
            );
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        tracing::info!(
            genes = initial.len(),
            population = self.config.population_size,
            generations = self.config.max_generations,
            seed = self.config.seed,
            "starting GA run"
        );
        monitor.on_start(&self.config);

        let mut population = initial_population(initial, self.config.population_size, &mut rng);
        self.evaluate(&mut population, fitness);
        population.sort_by(Individual::by_fitness);

        let mut history = Vec::with_capacity(self.config.max_generations);
        let mut terminated_early = false;

        for generation in 1..=self.config.max_generations {
            self.selection.reset(&population);
            let mut children = self.breed(&population, &mut rng);
            for child in &children {
                assert!(
                    child.chromosome().is_permutation_of(initial),
                    "genetic operator produced a non-permutation: {:?}",
                    child.chromosome()
                );
            }

            self.evaluate(&mut children, fitness);
            population = self.replacement.replace(population, children, fitness);

            let stats = GenerationStats::of(generation, &population);
            tracing::debug!(
                generation,
                best = stats.best_fitness,
                average = stats.average_fitness,
                "generation complete"
            );
            monitor.on_generation(&stats);
            history.push(stats);

            if monitor.should_terminate() {
                tracing::warn!(generation, monitor = monitor.name(), "run stopped by monitor");
                terminated_early = true;
                break;
            }
        }

        let best = population[0].clone();
        let best_fitness = best.rank_key();
        monitor.on_end(best_fitness);
        tracing::info!(
            generations = history.len(),
            best = best_fitness,
            "GA run finished"
        );

        GaResult {
            best,
            best_fitness,
            generations: history.len(),
            history,
            population,
            terminated_early,
        }
    }

    /// Draws parent pairs and produces (possibly mutated) children.
    pub(crate) fn breed<Rn: Rng>(&self, population: &[Individual], rng: &mut Rn) -> Vec<Individual> {
        let pairs = self.selection.max_pairs(population.len());
        let mut children = Vec::with_capacity(pairs * 2);

        for _ in 0..pairs {
            let (father, mother) = self.selection.select(population, rng);
            let (mut c1, mut c2) =
                self.crossover
                    .crossover(&population[father], &population[mother], rng);

            for child in [&mut c1, &mut c2] {
                if rng.random_bool(self.config.mutation_probability) {
                    self.mutation.mutate(child, rng);
                }
            }
            children.push(c1);
            children.push(c2);
        }
        children
    }

    fn evaluate<F>(&self, individuals: &mut [Individual], fitness: &F)
    where
        F: FitnessFunction + Sync + ?Sized,
    {
        if self.config.parallel {
            individuals.par_iter_mut().for_each(|ind| {
                ind.score(fitness);
            });
        } else {
            for ind in individuals.iter_mut() {
                ind.score(fitness);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintDef;
    use crate::ga::ExamFitness;
    use crate::models::{Exam, ExamCalendar, ExamId, ExamProblem};
    use chrono::{NaiveDate, NaiveTime};

    fn problem() -> ExamProblem {
        let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let calendar = ExamCalendar::default()
            .with_day(d(3), &[t(9), t(14)])
            .with_day(d(4), &[t(9), t(14)])
            .with_day(d(5), &[t(9), t(14)]);
        let exams = (1..=6u32)
            .map(|i| Exam::new(i, 60 + 30 * i64::from(i % 3)))
            .collect();
        let defs = vec![
            ConstraintDef::order(6, 1),
            ConstraintDef::order(5, 2),
            ConstraintDef::day_banned(3, d(3)),
            ConstraintDef::unbalanced_days(),
        ];
        ExamProblem::new(exams, calendar, defs).unwrap()
    }

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(30)
            .with_max_generations(40)
            .with_mutation_probability(0.3)
            .with_seed(11)
    }

    /// Stops after a fixed number of generations.
    struct StopAfter {
        limit: usize,
        seen: Vec<GenerationStats>,
    }

    impl GenerationMonitor for StopAfter {
        fn name(&self) -> &str {
            "StopAfter"
        }

        fn on_generation(&mut self, stats: &GenerationStats) {
            self.seen.push(*stats);
        }

        fn should_terminate(&self) -> bool {
            self.seen.len() >= self.limit
        }
    }

    #[test]
    fn test_best_never_worsens() {
        let p = problem();
        let fitness = ExamFitness::new(&p);
        let result = GaRunner::new(config())
            .unwrap()
            .run(&p.initial_chromosome(), &fitness);

        assert_eq!(result.generations, 40);
        assert_eq!(result.history.len(), 40);
        for pair in result.history.windows(2) {
            assert!(pair[1].best_fitness <= pair[0].best_fitness);
        }
        assert!(result.history.iter().all(|s| s.best_fitness <= s.average_fitness));
        assert_eq!(result.best_fitness, result.history[39].best_fitness);
    }

    #[test]
    fn test_improves_on_prime() {
        let p = problem();
        let fitness = ExamFitness::new(&p);
        let prime = p.initial_chromosome();
        let result = GaRunner::new(config()).unwrap().run(&prime, &fitness);

        assert!(result.best_fitness <= fitness.evaluate(&prime));
        assert_eq!(result.best_fitness, fitness.evaluate(result.best.chromosome()));
        assert!(result.best.chromosome().is_permutation_of(&prime));

        let schedule = p.decode(result.best.chromosome());
        assert!(p.count(&schedule).is_feasible());
    }

    #[test]
    fn test_population_size_constant() {
        let p = problem();
        let result = GaRunner::new(config().with_max_generations(5))
            .unwrap()
            .run(&p.initial_chromosome(), &ExamFitness::new(&p));
        assert_eq!(result.population.len(), 30);
        assert!(result
            .population
            .windows(2)
            .all(|w| w[0].rank_key() <= w[1].rank_key()));
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let p = problem();
        let fitness = ExamFitness::new(&p);
        let prime = p.initial_chromosome();

        let a = GaRunner::new(config()).unwrap().run(&prime, &fitness);
        let b = GaRunner::new(config().with_parallel(false))
            .unwrap()
            .run(&prime, &fitness);
        assert_eq!(a.best, b.best);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_zero_pairs_no_children() {
        let p = problem();
        let fitness = ExamFitness::new(&p);
        let prime = p.initial_chromosome();
        let mut runner = GaRunner::with_operators(
            config().with_max_generations(3),
            RouletteSelection::new().with_max_pairs(0),
            OrderCrossover,
            MutationType::Swap,
            ElitistReplacement::new(1),
        )
        .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let population = initial_population(&prime, 10, &mut rng);
        assert!(runner.breed(&population, &mut rng).is_empty());

        // Without children every generation reports the initial best
        let result = runner.run(&prime, &fitness);
        let first = result.history[0];
        assert!(result.history.iter().all(|s| *s == GenerationStats { generation: s.generation, ..first }));
    }

    #[test]
    fn test_monitor_can_stop_run() {
        let p = problem();
        let mut monitor = StopAfter {
            limit: 3,
            seen: Vec::new(),
        };
        let result = GaRunner::new(config()).unwrap().run_with_monitor(
            &p.initial_chromosome(),
            &ExamFitness::new(&p),
            &mut monitor,
        );

        assert!(result.terminated_early);
        assert_eq!(result.generations, 3);
        assert_eq!(monitor.seen.len(), 3);
        assert_eq!(
            monitor.seen.iter().map(|s| s.generation).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_tracing_monitor_runs() {
        let p = problem();
        let mut monitor = TracingMonitor::new(2);
        let result = GaRunner::new(config().with_max_generations(4))
            .unwrap()
            .run_with_monitor(&p.initial_chromosome(), &ExamFitness::new(&p), &mut monitor);
        assert!(!result.terminated_early);
        assert_eq!(monitor.best, result.best_fitness);
    }

    #[test]
    fn test_distinct_best() {
        let p = problem();
        let result = GaRunner::new(config())
            .unwrap()
            .run(&p.initial_chromosome(), &ExamFitness::new(&p));

        let top = result.distinct_best(5);
        assert!(!top.is_empty() && top.len() <= 5);
        assert_eq!(top[0].chromosome(), result.best.chromosome());
        for (i, a) in top.iter().enumerate() {
            for b in &top[i + 1..] {
                assert_ne!(a.chromosome(), b.chromosome());
            }
        }
        assert!(top.windows(2).all(|w| w[0].rank_key() <= w[1].rank_key()));
    }

    #[test]
    fn test_single_individual_population() {
        let p = problem();
        let prime = p.initial_chromosome();
        let result = GaRunner::new(config().with_population_size(1))
            .unwrap()
            .run(&prime, &ExamFitness::new(&p));
        // One individual means zero pairs: the prime survives untouched
        assert_eq!(result.best.chromosome(), &prime);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(GaRunner::new(GaConfig::default().with_population_size(0)).is_err());
        assert!(GaRunner::new(GaConfig::default().with_mutation_probability(2.0)).is_err());
    }

    struct BrokenCrossover;

    impl Crossover for BrokenCrossover {
        fn crossover<R: Rng>(
            &self,
            father: &Individual,
            _mother: &Individual,
            _rng: &mut R,
        ) -> (Individual, Individual) {
            let mut genes = father.chromosome().genes().to_vec();
            genes[0] = genes[1];
            let child = Individual::new(Chromosome::new(genes));
            (child.clone(), child)
        }
    }

    #[test]
    #[should_panic(expected = "non-permutation")]
    fn test_invalid_child_panics() {
        let p = problem();
        let mut runner = GaRunner::with_operators(
            config().with_max_generations(1),
            RouletteSelection::new(),
            BrokenCrossover,
            MutationType::Swap,
            ElitistReplacement::default(),
        )
        .unwrap();
        runner.run(&p.initial_chromosome(), &ExamFitness::new(&p));
    }

    #[test]
    #[should_panic(expected = "not a permutation of the problem's genes")]
    fn test_partial_initial_chromosome_panics() {
        let p = problem();
        let partial = Chromosome::new(vec![ExamId(1)]);
        GaRunner::new(config().with_max_generations(1))
            .unwrap()
            .run(&partial, &ExamFitness::new(&p));
    }

    #[test]
    fn test_genes_are_exam_ids() {
        let p = problem();
        let result = GaRunner::new(config().with_max_generations(2))
            .unwrap()
            .run(&p.initial_chromosome(), &ExamFitness::new(&p));
        let mut genes = result.best.chromosome().genes().to_vec();
        genes.sort();
        assert_eq!(genes, (1..=6).map(ExamId).collect::<Vec<_>>());
    }
}
