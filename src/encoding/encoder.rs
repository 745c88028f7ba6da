use crate::encoding::vocabulary::Vocabulary;
use crate::error::{FeatsearchError, Result};
use crate::features::emitters::FeatureEmitter;
use crate::types::{Instance, SparseInstance, SparseVector};

/// Sparse training data produced by [`FeatureEncoder::fit`].
#[derive(Debug, Clone)]
pub struct EncodedDataset {
    pub instances: Vec<SparseInstance>,
    pub num_features: usize,
    pub num_labels: usize,
}

impl EncodedDataset {
    /// Fewer than two labels: numeric training is pointless and the caller
    /// should fall back to a constant prediction.
    pub fn is_degenerate(&self) -> bool {
        self.num_labels < 2
    }
}

/// Runs a feature emitter and maps its output onto feature and label vocabularies.
///
/// Unseen feature strings at apply time are dropped from the vector, and
/// repeated features within one instance are encoded once with value 1.0.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    emitter: FeatureEmitter,
    features: Vocabulary,
    labels: Vocabulary,
}

impl FeatureEncoder {
    pub fn new(emitter: FeatureEmitter) -> Self {
        Self {
            emitter,
            features: Vocabulary::new(),
            labels: Vocabulary::new(),
        }
    }

    /// Rebuilds a fitted encoder from persisted parts.
    pub fn from_parts(
        emitter: FeatureEmitter,
        mut features: Vocabulary,
        mut labels: Vocabulary,
    ) -> Self {
        features.freeze();
        labels.freeze();
        Self {
            emitter,
            features,
            labels,
        }
    }

    /// Grows both vocabularies over `instances` in order, then freezes them.
    pub fn fit(&mut self, instances: &[Instance]) -> Result<EncodedDataset> {
        if self.is_fitted() {
            return Err(FeatsearchError::Validation(
                "Feature encoder has already been fitted".to_string(),
            ));
        }

        let mut encoded = Vec::with_capacity(instances.len());
        for instance in instances {
            let indices: Vec<usize> = self
                .emitter
                .emit(&instance.sequence, instance.focus)
                .iter()
                .filter_map(|f| self.features.insert(&f.key()))
                .collect();
            let target = self.labels.insert(&instance.label).ok_or_else(|| {
                FeatsearchError::Validation(format!("Label vocabulary frozen at {}", instance.id))
            })?;

            encoded.push(SparseInstance {
                id: instance.id.clone(),
                target,
                vector: SparseVector::from_indices(indices),
            });
        }

        self.features.freeze();
        self.labels.freeze();
        log::debug!(
            "Encoded {} instances into {} features and {} labels",
            encoded.len(),
            self.features.len(),
            self.labels.len()
        );

        Ok(EncodedDataset {
            instances: encoded,
            num_features: self.features.len(),
            num_labels: self.labels.len(),
        })
    }

    /// Encodes without touching the vocabularies.
    pub fn transform(&self, instance: &Instance) -> SparseVector {
        SparseVector::from_indices(
            self.emitter
                .emit(&instance.sequence, instance.focus)
                .iter()
                .filter_map(|f| self.features.get(&f.key())),
        )
    }

    /// Encodes a labeled instance; `None` when its label was never seen in training.
    pub fn transform_labeled(&self, instance: &Instance) -> Option<SparseInstance> {
        let target = self.labels.get(&instance.label)?;
        Some(SparseInstance {
            id: instance.id.clone(),
            target,
            vector: self.transform(instance),
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.features.is_frozen()
    }

    pub fn emitter(&self) -> &FeatureEmitter {
        &self.emitter
    }

    pub fn features(&self) -> &Vocabulary {
        &self.features
    }

    pub fn labels(&self) -> &Vocabulary {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extractors::ValueExtractor;
    use crate::features::selectors::ContextSelector;
    use crate::types::{Element, Sequence};
    use std::sync::Arc;

    fn instances() -> Vec<Instance> {
        let sequence = Arc::new(Sequence::new(
            ["a", "b", "a", "c"]
                .iter()
                .map(|w| Element::new().with_feature("word", *w))
                .collect(),
        ));
        vec![
            Instance::new("0", sequence.clone(), 0, "X"),
            Instance::new("1", sequence.clone(), 1, "Y"),
            Instance::new("2", sequence.clone(), 2, "X"),
            Instance::new("3", sequence, 3, "Z"),
        ]
    }

    fn encoder() -> FeatureEncoder {
        let emitter = FeatureEmitter::aggregate(vec![
            FeatureEmitter::Bias,
            FeatureEmitter::strings(
                ContextSelector::window(vec![-1, 0, 1]),
                vec![ValueExtractor::key("word")],
            )
            .unwrap(),
        ]);
        FeatureEncoder::new(emitter)
    }

    #[test]
    fn fit_assigns_dense_reproducible_indices() {
        let mut first = encoder();
        let mut second = encoder();
        let a = first.fit(&instances()).unwrap();
        let b = second.fit(&instances()).unwrap();

        assert_eq!(first.features(), second.features());
        assert_eq!(first.labels().entries(), &["X", "Y", "Z"]);
        assert_eq!(a.num_labels, 3);
        let max = a
            .instances
            .iter()
            .flat_map(|i| i.vector.indices().iter().copied())
            .max()
            .unwrap();
        assert_eq!(max + 1, a.num_features);
        assert_eq!(a.instances[1].vector, b.instances[1].vector);
    }

    #[test]
    fn vectors_are_strictly_ascending() {
        let mut encoder = encoder();
        let data = encoder.fit(&instances()).unwrap();
        for instance in &data.instances {
            assert!(instance.vector.indices().windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn transform_drops_unseen_features() {
        let mut encoder = encoder();
        encoder.fit(&instances()[..1]).unwrap();
        let before = encoder.features().len();

        let vector = encoder.transform(&instances()[3]);
        assert_eq!(encoder.features().len(), before);
        // only the bias survives for an unseen context
        assert_eq!(vector.indices(), &[0]);
    }

    #[test]
    fn single_label_is_degenerate() {
        let mut encoder = encoder();
        let data = encoder.fit(&instances()[..1]).unwrap();
        assert!(data.is_degenerate());
        assert!(encoder.fit(&instances()).is_err());
    }
}
