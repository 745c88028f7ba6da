use crate::config::ClassifierConfig;
use crate::engines::generation::chromosome::Chromosome;
use crate::error::Result;
use crate::features::FeatureEmitter;
use crate::ml::models::{ClassifierModel, LogisticRegression};
use crate::model::Phenotype;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Settings shared by every genotype of a search when building phenotypes.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub classifier: ClassifierConfig,
    pub include_bias: bool,
}

/// Candidate solution: which feature templates to use and how to tune the
/// classifier, plus the fitness once evaluated.
#[derive(Debug, Clone)]
pub struct Genotype {
    pub features: Chromosome<FeatureEmitter>,
    pub hyperparameters: Chromosome<f64>,
    pub fitness: Option<f64>,
    settings: Arc<BuildSettings>,
}

/// Readable description of a genotype for logs and reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenotypeSummary {
    pub fitness: Option<f64>,
    pub features: Vec<String>,
    pub hyperparameters: BTreeMap<String, f64>,
}

impl Genotype {
    pub fn new(
        features: Chromosome<FeatureEmitter>,
        hyperparameters: Chromosome<f64>,
        settings: Arc<BuildSettings>,
    ) -> Self {
        Self {
            features,
            hyperparameters,
            fitness: None,
            settings,
        }
    }

    /// A copy without fitness, to be evaluated again.
    pub fn offspring(&self) -> Self {
        Self {
            fitness: None,
            ..self.clone()
        }
    }

    pub fn fitness_or_min(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Builds an untrained phenotype from the active genes only. Inactive
    /// hyperparameter genes leave the classifier default in place.
    pub fn build(&self, seed: u64) -> Result<Phenotype> {
        let mut emitters = Vec::new();
        if self.settings.include_bias {
            emitters.push(FeatureEmitter::Bias);
        }
        emitters.extend(self.features.active_genes().map(|g| g.value().clone()));

        let classifier = LogisticRegression::from_config(&self.settings.classifier, seed)
            .with_hyperparameters(&self.active_hyperparameters())?;

        Ok(Phenotype::new(
            FeatureEmitter::aggregate(emitters),
            ClassifierModel::Logistic(classifier),
        ))
    }

    pub fn active_hyperparameters(&self) -> BTreeMap<String, f64> {
        self.hyperparameters
            .active_genes()
            .map(|g| (g.name().to_string(), *g.value()))
            .collect()
    }

    /// Canonical description of the active genes. Genotypes that build the
    /// same phenotype share a signature.
    pub fn signature(&self) -> String {
        let features: Vec<String> = self
            .features
            .active_genes()
            .map(|g| format!("{}#{}", g.name(), g.value_index()))
            .collect();
        let hyperparameters: Vec<String> = self
            .active_hyperparameters()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        format!("{}|{}", features.join(","), hyperparameters.join(","))
    }

    pub fn summary(&self) -> GenotypeSummary {
        GenotypeSummary {
            fitness: self.fitness,
            features: self
                .features
                .active_genes()
                .map(|g| format!("{}#{}", g.name(), g.value_index()))
                .collect(),
            hyperparameters: self.active_hyperparameters(),
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }
}
