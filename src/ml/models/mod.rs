pub mod classifier;
pub mod constant;
pub mod logistic;

pub use classifier::{argmax, Classifier, Dimensions, Hyperparameter};
pub use constant::ConstantClassifier;
pub use logistic::LogisticRegression;

use crate::error::Result;
use crate::types::{SparseInstance, SparseVector};
use serde::{Deserialize, Serialize};

/// The concrete classifiers a phenotype can carry, tagged for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierModel {
    Logistic(LogisticRegression),
    Constant(ConstantClassifier),
}

impl ClassifierModel {
    /// Rejects parameters that disagree with the vocabulary sizes.
    pub fn check_dimensions(&self, dims: Dimensions) -> Result<()> {
        match self {
            Self::Logistic(m) => m.check_dimensions(dims),
            Self::Constant(m) => m.check_dimensions(dims),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Self::Logistic(m) => m,
            Self::Constant(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            Self::Logistic(m) => m,
            Self::Constant(m) => m,
        }
    }
}

impl Classifier for ClassifierModel {
    fn train(
        &mut self,
        train: &[SparseInstance],
        valid: &[SparseInstance],
        dims: Dimensions,
    ) -> Result<()> {
        self.inner_mut().train(train, valid, dims)
    }

    fn score(&self, vector: &SparseVector) -> Vec<f64> {
        self.inner().score(vector)
    }

    fn classify(&self, vector: &SparseVector) -> usize {
        self.inner().classify(vector)
    }

    fn hyperparameters(&self) -> Vec<Hyperparameter> {
        self.inner().hyperparameters()
    }
}
