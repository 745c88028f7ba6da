use crate::encoding::FeatureEncoder;
use crate::engines::evaluation::FoldModel;
use crate::error::{FeatsearchError, Result};
use crate::features::FeatureEmitter;
use crate::ml::models::{
    Classifier, ClassifierModel, ConstantClassifier, Dimensions, Hyperparameter,
};
use crate::model::bundle::ModelBundle;
use crate::types::{Instance, SparseInstance};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// A feature pipeline plus classifier, trained and applied on raw instances.
#[derive(Debug, Clone)]
pub struct Phenotype {
    encoder: FeatureEncoder,
    classifier: ClassifierModel,
}

impl Phenotype {
    pub fn new(emitter: FeatureEmitter, classifier: ClassifierModel) -> Self {
        Self {
            encoder: FeatureEncoder::new(emitter),
            classifier,
        }
    }

    pub(crate) fn from_parts(encoder: FeatureEncoder, classifier: ClassifierModel) -> Self {
        Self {
            encoder,
            classifier,
        }
    }

    /// Fits the vocabularies on `train` and trains the classifier. With fewer
    /// than two training labels the classifier is replaced by a constant one.
    /// Validation instances with labels unseen in `train` are skipped.
    pub fn train(&mut self, train: &[Instance], valid: &[Instance]) -> Result<()> {
        if train.is_empty() {
            return Err(FeatsearchError::Training(
                "Cannot train on an empty instance list".to_string(),
            ));
        }

        let data = self.encoder.fit(train)?;
        let valid: Vec<SparseInstance> = valid
            .iter()
            .filter_map(|i| self.encoder.transform_labeled(i))
            .collect();
        let dims = Dimensions {
            num_features: data.num_features,
            num_labels: data.num_labels,
        };

        if data.is_degenerate() {
            log::info!(
                "Only {} label(s) in {} training instances, using a constant classifier",
                data.num_labels,
                data.instances.len()
            );
            self.classifier = ClassifierModel::Constant(ConstantClassifier::default());
        }

        self.classifier.train(&data.instances, &valid, dims)
    }

    pub fn classify(&self, instance: &Instance) -> Result<String> {
        self.ensure_trained()?;
        let index = self.classifier.classify(&self.encoder.transform(instance));
        self.encoder
            .labels()
            .lookup(index)
            .map(str::to_string)
            .ok_or_else(|| {
                FeatsearchError::Validation(format!("Predicted unknown label {}", index))
            })
    }

    /// Confidence per label name.
    pub fn score(&self, instance: &Instance) -> Result<BTreeMap<String, f64>> {
        self.ensure_trained()?;
        let scores = self.classifier.score(&self.encoder.transform(instance));
        Ok(self
            .encoder
            .labels()
            .entries()
            .iter()
            .cloned()
            .zip(scores)
            .collect())
    }

    pub fn hyperparameters(&self) -> Vec<Hyperparameter> {
        self.classifier.hyperparameters()
    }

    pub fn is_trained(&self) -> bool {
        self.encoder.is_fitted()
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn emitter(&self) -> &FeatureEmitter {
        self.encoder.emitter()
    }

    pub fn classifier(&self) -> &ClassifierModel {
        &self.classifier
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        self.ensure_trained()?;
        ModelBundle::from_phenotype(self).save(writer)
    }

    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Ok(ModelBundle::load(reader)?.into_phenotype())
    }

    fn ensure_trained(&self) -> Result<()> {
        if self.is_trained() {
            Ok(())
        } else {
            Err(FeatsearchError::Validation("Model has not been trained".to_string()))
        }
    }
}

impl FoldModel<Instance> for Phenotype {
    fn train(&mut self, train: &[Instance]) -> Result<()> {
        Phenotype::train(self, train, &[])
    }

    fn predict(&self, instance: &Instance) -> Result<String> {
        self.classify(instance)
    }
}
