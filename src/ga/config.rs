//! GA run parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters of one GA run.
///
/// # Example
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_max_generations(50)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.mutation_probability, 0.15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Probability that a child is mutated (checked once per child).
    pub mutation_probability: f64,
    /// Generation budget.
    pub max_generations: usize,
    /// Previous-generation elites guaranteed to survive replacement.
    pub elite_count: usize,
    /// Seed of the run's random generator.
    pub seed: u64,
    /// Evaluate fitness on the rayon thread pool.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 10_000,
            mutation_probability: 0.15,
            max_generations: 300,
            elite_count: 5,
            seed: 0,
            parallel: true,
        }
    }
}

impl GaConfig {
    /// Parses a config from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::invalid_parameter(
                "population_size",
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(ConfigError::invalid_parameter(
                "mutation_probability",
                format!("must be within [0, 1], got {}", self.mutation_probability),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = GaConfig::default();
        assert_eq!(c.population_size, 10_000);
        assert_eq!(c.max_generations, 300);
        assert_eq!(c.elite_count, 5);
        assert!(c.parallel);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let c = GaConfig::from_json(r#"{"population_size": 50, "seed": 9}"#).unwrap();
        assert_eq!(c.population_size, 50);
        assert_eq!(c.seed, 9);
        assert_eq!(c.mutation_probability, 0.15);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            GaConfig::default().with_population_size(0).validate(),
            Err(ConfigError::InvalidParameter { name: "population_size", .. })
        ));
        assert!(GaConfig::default()
            .with_mutation_probability(1.5)
            .validate()
            .is_err());
        assert!(GaConfig::default()
            .with_mutation_probability(f64::NAN)
            .validate()
            .is_err());
        assert!(GaConfig::from_json(r#"{"mutation_probability": -0.1}"#).is_err());
    }
}
