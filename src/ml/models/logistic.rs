use crate::config::ClassifierConfig;
use crate::error::{FeatsearchError, Result};
use crate::ml::models::classifier::{argmax, Classifier, Dimensions, Hyperparameter};
use crate::types::{SparseInstance, SparseVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EPOCHS: &str = "epochs";
pub const LEARNING_RATE: &str = "learning_rate";
pub const L2: &str = "l2";

/// Multinomial logistic regression trained with seeded SGD and L2 decay.
///
/// With a non-empty validation set the weights from the epoch with the best
/// validation accuracy are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub seed: u64,
    num_features: usize,
    num_labels: usize,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl LogisticRegression {
    pub fn new(seed: u64) -> Self {
        Self::from_config(&ClassifierConfig::default(), seed)
    }

    pub fn from_config(config: &ClassifierConfig, seed: u64) -> Self {
        Self {
            epochs: config.epochs,
            learning_rate: config.learning_rate,
            l2: config.l2,
            seed,
            num_features: 0,
            num_labels: 0,
            weights: Vec::new(),
            bias: Vec::new(),
        }
    }

    /// Overrides tunables by name.
    pub fn with_hyperparameters(mut self, values: &BTreeMap<String, f64>) -> Result<Self> {
        for (name, &value) in values {
            match name.as_str() {
                EPOCHS => self.epochs = value.round().max(1.0) as usize,
                LEARNING_RATE if value > 0.0 => self.learning_rate = value,
                L2 if value >= 0.0 => self.l2 = value,
                _ => {
                    return Err(FeatsearchError::Configuration(format!(
                        "Invalid hyperparameter {} = {}",
                        name, value
                    )))
                }
            }
        }
        Ok(self)
    }

    /// Checks the learned parameters against the vocabulary sizes they are
    /// used with.
    pub fn check_dimensions(&self, dims: Dimensions) -> Result<()> {
        let expected_weights = dims.num_features.checked_mul(dims.num_labels);
        if self.num_features != dims.num_features
            || self.num_labels != dims.num_labels
            || expected_weights != Some(self.weights.len())
            || self.bias.len() != dims.num_labels
        {
            return Err(FeatsearchError::Validation(format!(
                "Logistic model {}x{} with {} weights and {} biases does not fit {}x{}",
                self.num_features,
                self.num_labels,
                self.weights.len(),
                self.bias.len(),
                dims.num_features,
                dims.num_labels
            )));
        }
        Ok(())
    }

    fn logits(&self, vector: &SparseVector) -> Vec<f64> {
        let mut logits = self.bias.clone();
        for (k, logit) in logits.iter_mut().enumerate() {
            let row = &self.weights[k * self.num_features..(k + 1) * self.num_features];
            for (i, v) in vector.iter() {
                if i < self.num_features {
                    *logit += row[i] * v;
                }
            }
        }
        logits
    }

    fn sgd_step(&mut self, instance: &SparseInstance) {
        let probs = softmax(&self.logits(&instance.vector));
        let nf = self.num_features;
        for (k, p) in probs.iter().enumerate() {
            let gradient = p - if k == instance.target { 1.0 } else { 0.0 };
            self.bias[k] -= self.learning_rate * gradient;
            for (i, v) in instance.vector.iter() {
                if i < nf {
                    let w = &mut self.weights[k * nf + i];
                    *w -= self.learning_rate * (gradient * v + self.l2 * *w);
                }
            }
        }
    }

    fn accuracy(&self, instances: &[SparseInstance]) -> f64 {
        let correct = instances
            .iter()
            .filter(|i| self.classify(&i.vector) == i.target)
            .count();
        correct as f64 / instances.len() as f64
    }
}

impl Classifier for LogisticRegression {
    fn train(
        &mut self,
        train: &[SparseInstance],
        valid: &[SparseInstance],
        dims: Dimensions,
    ) -> Result<()> {
        if dims.num_labels == 0 {
            return Err(FeatsearchError::Training(
                "Cannot train without any labels".to_string(),
            ));
        }

        self.num_features = dims.num_features;
        self.num_labels = dims.num_labels;
        self.weights = vec![0.0; dims.num_features * dims.num_labels];
        self.bias = vec![0.0; dims.num_labels];

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut best: Option<(f64, Vec<f64>, Vec<f64>)> = None;

        for epoch in 0..self.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                self.sgd_step(&train[i]);
            }

            if !valid.is_empty() {
                let accuracy = self.accuracy(valid);
                log::trace!("epoch {} validation accuracy {:.4}", epoch, accuracy);
                if best.as_ref().map_or(true, |(b, _, _)| accuracy > *b) {
                    best = Some((accuracy, self.weights.clone(), self.bias.clone()));
                }
            }
        }

        if let Some((_, weights, bias)) = best {
            self.weights = weights;
            self.bias = bias;
        }
        Ok(())
    }

    fn score(&self, vector: &SparseVector) -> Vec<f64> {
        softmax(&self.logits(vector))
    }

    fn classify(&self, vector: &SparseVector) -> usize {
        argmax(&self.logits(vector))
    }

    fn hyperparameters(&self) -> Vec<Hyperparameter> {
        vec![
            Hyperparameter::new(EPOCHS, self.epochs as f64, vec![5.0, 10.0, 20.0, 40.0]),
            Hyperparameter::new(LEARNING_RATE, self.learning_rate, vec![0.01, 0.05, 0.1, 0.5]),
            Hyperparameter::new(L2, self.l2, vec![0.0, 1e-5, 1e-4, 1e-3]),
        ]
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
