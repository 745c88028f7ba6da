pub mod base;
pub mod kfold;
pub mod stratified;
pub mod types;

pub use base::FoldSplitter;
pub use kfold::KFoldSplitter;
pub use stratified::StratifiedSplitter;
pub use types::Fold;

use crate::config::{FoldMethod, ValidationConfig};
use crate::error::FeatsearchError;
use crate::types::Labeled;
use rand::Rng;

/// The supported fold-construction modes.
#[derive(Debug, Clone)]
pub enum Splitter {
    KFold(KFoldSplitter),
    Stratified(StratifiedSplitter),
}

impl Splitter {
    pub fn from_config(config: &ValidationConfig) -> Self {
        match config.method {
            FoldMethod::KFold => Self::KFold(KFoldSplitter::new(config.num_folds)),
            FoldMethod::Stratified => {
                Self::Stratified(StratifiedSplitter::new(config.num_folds, config.train_ratio))
            }
        }
    }
}

impl FoldSplitter for Splitter {
    fn split<T, R>(&self, instances: &[T], rng: &mut R) -> Result<Vec<Fold<T>>, FeatsearchError>
    where
        T: Clone + Labeled,
        R: Rng,
    {
        match self {
            Self::KFold(s) => s.split(instances, rng),
            Self::Stratified(s) => s.split(instances, rng),
        }
    }

    fn num_folds(&self) -> usize {
        match self {
            Self::KFold(s) => s.num_folds(),
            Self::Stratified(s) => s.num_folds(),
        }
    }
}
