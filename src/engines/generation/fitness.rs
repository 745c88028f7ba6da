use crate::engines::evaluation::CrossValidator;
use crate::engines::generation::genotype::Genotype;
use crate::error::Result;
use crate::types::Instance;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Scores a genotype; higher is better. Called concurrently from the
/// evaluation pool, each call with its own seed.
pub trait FitnessFunction: Sync {
    fn evaluate(&self, genotype: &Genotype, seed: u64) -> Result<f64>;
}

/// Pooled macro F1 of the genotype's phenotype under cross-validation.
pub struct CrossValidationFitness {
    instances: Vec<Instance>,
    validator: CrossValidator,
}

impl CrossValidationFitness {
    pub fn new(instances: Vec<Instance>, validator: CrossValidator) -> Self {
        Self {
            instances,
            validator,
        }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }
}

impl FitnessFunction for CrossValidationFitness {
    fn evaluate(&self, genotype: &Genotype, seed: u64) -> Result<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let report = self
            .validator
            .evaluate(&self.instances, |fold_seed| genotype.build(fold_seed), &mut rng)?;
        Ok(report.macro_f1())
    }
}
