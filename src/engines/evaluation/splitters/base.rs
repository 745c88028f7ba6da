use super::types::Fold;
use crate::error::FeatsearchError;
use crate::types::Labeled;
use rand::Rng;

pub trait FoldSplitter: Send + Sync {
    /// Split instances into folds, drawing all randomness from `rng`
    fn split<T, R>(&self, instances: &[T], rng: &mut R) -> Result<Vec<Fold<T>>, FeatsearchError>
    where
        T: Clone + Labeled,
        R: Rng;

    fn num_folds(&self) -> usize;
}
