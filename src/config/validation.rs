use super::traits::ConfigSection;
use crate::error::FeatsearchError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub method: FoldMethod,
    pub num_folds: usize,
    /// Share of each class drawn into train by stratified resampling.
    pub train_ratio: f64,
    pub parallel_folds: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldMethod {
    KFold,
    Stratified,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            method: FoldMethod::Stratified,
            num_folds: 5,
            train_ratio: 0.8,
            parallel_folds: true,
        }
    }
}

impl ConfigSection for ValidationConfig {
    fn section_name() -> &'static str {
        "validation"
    }

    fn validate(&self) -> Result<(), FeatsearchError> {
        let min_folds = match self.method {
            FoldMethod::KFold => 2,
            FoldMethod::Stratified => 1,
        };
        if self.num_folds < min_folds {
            return Err(FeatsearchError::Configuration(format!(
                "{:?} validation needs at least {} folds",
                self.method, min_folds
            )));
        }
        if self.train_ratio <= 0.0 || self.train_ratio >= 1.0 {
            return Err(FeatsearchError::Configuration(
                "Train ratio must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}
