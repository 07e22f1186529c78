//! Exam timetabling for the U-Engine ecosystem.
//!
//! Places a fixed set of exams onto calendar slots with a permutation
//! genetic algorithm. Chromosomes are placement orders; a greedy decoder
//! turns each order into a timetable, and a constraint counter scores it.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Exam`, `ExamCalendar`, `CalendarSlot`,
//!   `Schedule`, `Assignment`, and the `ExamProblem` registry
//! - **`constraints`**: Constraint variants, hard/weak/hardified classes,
//!   `ConstraintCounter` and penalty weights
//! - **`scheduler`**: `GreedyDecoder` and `ScheduleKpi`
//! - **`ga`**: Chromosome, operators, `GaRunner`
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown
//!   references, intervals, hard ordering cycles)
//! - **`error`**: `ConfigError`
//!
//! # Architecture
//!
//! Problems are configured (validated, hardified) up front and only read
//! during a run. Infeasibility is never an error: unplaced exams and
//! violated constraints are penalties in the fitness.
//!
//! # References
//!
//! - Carter, Laporte & Lee (1996), "Examination timetabling: algorithmic strategies and applications"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"

pub mod constraints;
pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::ConfigError;
