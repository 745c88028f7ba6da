use crate::config::{AppConfig, MLConfig};
use crate::engines::generation::chromosome::Chromosome;
use crate::engines::generation::gene::Gene;
use crate::engines::generation::genotype::{BuildSettings, Genotype};
use crate::error::{FeatsearchError, Result};
use crate::features::TemplateRegistry;
use crate::ml::models::{Classifier, Hyperparameter, LogisticRegression};
use std::sync::Arc;

/// Everything a genotype may choose from: one feature gene per template
/// group and one gene per classifier hyperparameter.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    registry: TemplateRegistry,
    hyperparameters: Vec<Hyperparameter>,
    settings: Arc<BuildSettings>,
    activation_probability: f64,
}

impl SearchSpace {
    pub fn new(
        registry: TemplateRegistry,
        hyperparameters: Vec<Hyperparameter>,
        ml: &MLConfig,
        activation_probability: f64,
    ) -> Result<Self> {
        if registry.is_empty() {
            return Err(FeatsearchError::Configuration(
                "Search space needs at least one feature template".to_string(),
            ));
        }
        Ok(Self {
            registry,
            hyperparameters,
            settings: Arc::new(BuildSettings {
                classifier: ml.classifier.clone(),
                include_bias: ml.include_bias,
            }),
            activation_probability,
        })
    }

    /// Standard templates over the configured feature keys, tuning the
    /// logistic regression hyperparameters.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let registry = TemplateRegistry::standard(&config.ml.feature_keys)?;
        let hyperparameters =
            LogisticRegression::from_config(&config.ml.classifier, 0).hyperparameters();
        Self::new(
            registry,
            hyperparameters,
            &config.ml,
            config.evolution.activation_probability,
        )
    }

    /// Genotype with every gene active at its first value; the engine
    /// randomizes copies of it to seed the population.
    pub fn prototype(&self) -> Result<Genotype> {
        let features = self
            .registry
            .groups()
            .iter()
            .map(|group| {
                Gene::new(
                    group.name.clone(),
                    group.alternatives.clone(),
                    self.activation_probability,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let hyperparameters = self
            .hyperparameters
            .iter()
            .map(|h| {
                let values = if h.candidates.is_empty() {
                    vec![h.default]
                } else {
                    h.candidates.clone()
                };
                Gene::new(h.name.clone(), values, self.activation_probability)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Genotype::new(
            Chromosome::new(features),
            Chromosome::new(hyperparameters),
            self.settings.clone(),
        ))
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn hyperparameters(&self) -> &[Hyperparameter] {
        &self.hyperparameters
    }
}
