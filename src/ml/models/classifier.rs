use crate::error::Result;
use crate::types::{SparseInstance, SparseVector};
use serde::{Deserialize, Serialize};

/// Shape of the encoded training problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub num_features: usize,
    pub num_labels: usize,
}

/// A named tunable with its default and the values a search may try.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameter {
    pub name: String,
    pub default: f64,
    pub candidates: Vec<f64>,
}

impl Hyperparameter {
    pub fn new(name: impl Into<String>, default: f64, candidates: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            default,
            candidates,
        }
    }
}

/// Trainable scorer over sparse vectors. Label indices refer to the label
/// vocabulary the vectors were encoded against.
pub trait Classifier: Send + Sync {
    fn train(
        &mut self,
        train: &[SparseInstance],
        valid: &[SparseInstance],
        dims: Dimensions,
    ) -> Result<()>;

    /// Confidence per label index.
    fn score(&self, vector: &SparseVector) -> Vec<f64>;

    fn classify(&self, vector: &SparseVector) -> usize {
        argmax(&self.score(vector))
    }

    fn hyperparameters(&self) -> Vec<Hyperparameter>;
}

/// Index of the largest score, first one on ties.
pub fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate() {
        if s > scores[best] {
            best = i;
        }
    }
    best
}
