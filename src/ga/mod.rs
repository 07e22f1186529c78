//! Genetic algorithm over exam placement orders.
//!
//! # Encoding
//!
//! A [`Chromosome`] is a permutation of all exam ids. The greedy decoder
//! places exams in that order, so the GA searches over orders while the
//! decoder handles calendar feasibility.
//!
//! # Operators
//!
//! | Stage | Trait | Default |
//! |-------|-------|---------|
//! | Selection | [`Selection`] | [`RouletteSelection`] on `1 / fitness` |
//! | Crossover | [`Crossover`] | [`OrderCrossover`] (OX) |
//! | Mutation | [`Mutation`] | [`MutationType::Swap`] |
//! | Replacement | [`Replacement`] | [`ElitistReplacement`] (5 elites) |
//!
//! [`GaRunner`] drives the generations; all randomness comes from one
//! seeded generator, so runs are reproducible.
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"
//! - Burke, Newall & Weare (1998), "Initialization strategies and diversity in evolutionary timetabling"

mod chromosome;
mod config;
mod crossover;
mod fitness;
mod mutation;
mod population;
mod replacement;
mod runner;
mod selection;

pub use chromosome::{Chromosome, Individual};
pub use config::GaConfig;
pub use crossover::{Crossover, OrderCrossover};
pub use fitness::{ExamFitness, FitnessFunction};
pub use mutation::{Mutation, MutationType};
pub use population::initial_population;
pub use replacement::{ElitistReplacement, Replacement};
pub use runner::{
    GaResult, GaRunner, GenerationMonitor, GenerationStats, NoopMonitor, TracingMonitor,
};
pub use selection::{RouletteSelection, Selection, MIN_FITNESS};
