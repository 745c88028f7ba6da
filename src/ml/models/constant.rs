use crate::error::{FeatsearchError, Result};
use crate::ml::models::classifier::{Classifier, Dimensions, Hyperparameter};
use crate::types::{SparseInstance, SparseVector};
use serde::{Deserialize, Serialize};

/// Always predicts the majority training label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstantClassifier {
    label: usize,
    num_labels: usize,
}

impl ConstantClassifier {
    pub fn new(label: usize, num_labels: usize) -> Self {
        Self { label, num_labels }
    }

    pub fn label(&self) -> usize {
        self.label
    }

    pub fn check_dimensions(&self, dims: Dimensions) -> Result<()> {
        if self.label >= dims.num_labels || self.num_labels != dims.num_labels {
            return Err(FeatsearchError::Validation(format!(
                "Constant label {} of {} does not fit {} labels",
                self.label, self.num_labels, dims.num_labels
            )));
        }
        Ok(())
    }
}

impl Classifier for ConstantClassifier {
    fn train(
        &mut self,
        train: &[SparseInstance],
        _valid: &[SparseInstance],
        dims: Dimensions,
    ) -> Result<()> {
        let mut counts = vec![0usize; dims.num_labels];
        for instance in train {
            if let Some(c) = counts.get_mut(instance.target) {
                *c += 1;
            }
        }
        // earliest label wins ties
        self.label = counts
            .iter()
            .enumerate()
            .fold((0, 0), |best, (i, &c)| if c > best.1 { (i, c) } else { best })
            .0;
        self.num_labels = dims.num_labels;
        Ok(())
    }

    fn score(&self, _vector: &SparseVector) -> Vec<f64> {
        let mut scores = vec![0.0; self.num_labels.max(self.label + 1)];
        scores[self.label] = 1.0;
        scores
    }

    fn classify(&self, _vector: &SparseVector) -> usize {
        self.label
    }

    fn hyperparameters(&self) -> Vec<Hyperparameter> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicts_majority_label() {
        let train: Vec<SparseInstance> = [1, 0, 1]
            .iter()
            .map(|&t| SparseInstance {
                id: String::new(),
                target: t,
                vector: SparseVector::default(),
            })
            .collect();
        let mut model = ConstantClassifier::default();
        model
            .train(
                &train,
                &[],
                Dimensions {
                    num_features: 0,
                    num_labels: 2,
                },
            )
            .unwrap();

        assert_eq!(model.classify(&SparseVector::default()), 1);
        assert_eq!(model.score(&SparseVector::default()), vec![0.0, 1.0]);
    }
}
