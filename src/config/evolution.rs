use super::traits::{check_unit_interval, ConfigSection};
use crate::error::FeatsearchError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Upper bound on evaluated generations.
    pub max_epochs: usize,
    /// Generations without a strictly better best fitness before stopping.
    pub patience: usize,
    /// Stop as soon as the best fitness reaches this value.
    pub max_fitness: f64,
    pub num_elites: usize,
    /// Scales the adaptive crossover probability.
    pub crossover_rate: f64,
    /// Scales the adaptive mutation probability.
    pub mutation_rate: f64,
    /// Bernoulli probability that a randomized gene is active.
    pub activation_probability: f64,
    pub hall_of_fame_size: usize,
    /// Worker threads for fitness evaluation; 0 uses the rayon default.
    pub num_threads: usize,
    pub timeout_secs: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            max_epochs: 30,
            patience: 5,
            max_fitness: 1.0,
            num_elites: 2,
            crossover_rate: 1.0,
            mutation_rate: 0.5,
            activation_probability: 0.5,
            hall_of_fame_size: 5,
            num_threads: 0,
            timeout_secs: None,
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), FeatsearchError> {
        if self.population_size < 2 {
            return Err(FeatsearchError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        if self.num_elites >= self.population_size {
            return Err(FeatsearchError::Configuration(
                "Number of elites must be smaller than the population".to_string(),
            ));
        }
        if self.max_epochs == 0 {
            return Err(FeatsearchError::Configuration(
                "Max epochs must be at least 1".to_string(),
            ));
        }
        if self.patience == 0 {
            return Err(FeatsearchError::Configuration(
                "Patience must be at least 1".to_string(),
            ));
        }
        check_unit_interval("Crossover rate", self.crossover_rate)?;
        check_unit_interval("Mutation rate", self.mutation_rate)?;
        check_unit_interval("Activation probability", self.activation_probability)?;
        Ok(())
    }
}
