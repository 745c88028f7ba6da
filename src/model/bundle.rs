use crate::encoding::{FeatureEncoder, Vocabulary};
use crate::error::{FeatsearchError, Result};
use crate::features::FeatureEmitter;
use crate::ml::models::{ClassifierModel, Dimensions};
use crate::model::phenotype::Phenotype;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};

pub const FORMAT_VERSION: u64 = 1;

/// Persisted form of a trained phenotype.
///
/// Emitters and classifiers are tagged enums, so a bundle naming a variant
/// this build does not know is rejected while decoding that part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u64,
    pub created_at: DateTime<Utc>,
    pub emitter: FeatureEmitter,
    pub features: Vocabulary,
    pub labels: Vocabulary,
    pub classifier: ClassifierModel,
}

impl ModelBundle {
    pub fn from_phenotype(phenotype: &Phenotype) -> Self {
        let encoder = phenotype.encoder();
        Self {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            emitter: encoder.emitter().clone(),
            features: encoder.features().clone(),
            labels: encoder.labels().clone(),
            classifier: phenotype.classifier().clone(),
        }
    }

    pub fn into_phenotype(self) -> Phenotype {
        Phenotype::from_parts(
            FeatureEncoder::from_parts(self.emitter, self.features, self.labels),
            self.classifier,
        )
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| FeatsearchError::persistence("writing model bundle", e))
    }

    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let mut value: Value = serde_json::from_reader(reader)
            .map_err(|e| FeatsearchError::persistence("reading model bundle", e))?;

        let version = value
            .get("format_version")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                FeatsearchError::UnsupportedBundle("missing format_version".to_string())
            })?;
        if version != FORMAT_VERSION {
            return Err(FeatsearchError::UnsupportedBundle(format!(
                "format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let bundle = Self {
            format_version: version,
            created_at: take(&mut value, "created_at")?,
            emitter: take(&mut value, "emitter")?,
            features: take(&mut value, "features")?,
            labels: take(&mut value, "labels")?,
            classifier: take(&mut value, "classifier")?,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    /// Checks that the parts agree with each other, so a loaded phenotype
    /// never indexes past its parameters.
    pub fn validate(&self) -> Result<()> {
        let dims = Dimensions {
            num_features: self.features.len(),
            num_labels: self.labels.len(),
        };
        self.emitter
            .validate()
            .and_then(|()| self.classifier.check_dimensions(dims))
            .map_err(|e| FeatsearchError::UnsupportedBundle(e.to_string()))
    }
}

fn take<T: DeserializeOwned>(value: &mut Value, field: &str) -> Result<T> {
    let part = value.get_mut(field).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(part)
        .map_err(|e| FeatsearchError::persistence(format!("decoding {}", field), e))
}
