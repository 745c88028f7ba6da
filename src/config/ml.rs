use super::traits::ConfigSection;
use crate::error::FeatsearchError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MLConfig {
    /// Element feature keys the template registry builds templates over.
    pub feature_keys: Vec<String>,
    /// Always add the bias feature to a phenotype's pipeline.
    pub include_bias: bool,
    pub classifier: ClassifierConfig,
}

/// Defaults for the logistic regression classifier; genes override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: 0.1,
            l2: 1e-4,
        }
    }
}

impl Default for MLConfig {
    fn default() -> Self {
        Self {
            feature_keys: vec!["word".to_string(), "pos".to_string()],
            include_bias: true,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl ConfigSection for MLConfig {
    fn section_name() -> &'static str {
        "ml"
    }

    fn validate(&self) -> Result<(), FeatsearchError> {
        if self.feature_keys.is_empty() {
            return Err(FeatsearchError::Configuration(
                "At least one feature key is required".to_string(),
            ));
        }
        if self.classifier.epochs == 0 {
            return Err(FeatsearchError::Configuration(
                "Classifier epochs must be at least 1".to_string(),
            ));
        }
        if self.classifier.learning_rate <= 0.0 || self.classifier.l2 < 0.0 {
            return Err(FeatsearchError::Configuration(
                "Learning rate must be positive and l2 non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
