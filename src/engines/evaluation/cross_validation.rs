use crate::config::ValidationConfig;
use crate::engines::evaluation::metrics::Evaluation;
use crate::engines::evaluation::splitters::{Fold, FoldSplitter, Splitter};
use crate::error::Result;
use crate::types::Labeled;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A model that can be trained and queried on raw instances, one per fold.
pub trait FoldModel<T>: Send {
    fn train(&mut self, train: &[T]) -> Result<()>;
    fn predict(&self, instance: &T) -> Result<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidationReport {
    pub folds: Vec<Evaluation>,
    pub pooled: Evaluation,
}

impl CrossValidationReport {
    /// Macro F1 over the pooled confusion counts of all folds.
    pub fn macro_f1(&self) -> f64 {
        self.pooled.macro_f1()
    }
}

/// Evaluates a model factory over folds. Every fold gets a fresh model built
/// from its own seed; no model state is shared between folds.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    splitter: Splitter,
    parallel: bool,
}

impl CrossValidator {
    pub fn new(splitter: Splitter, parallel: bool) -> Self {
        Self { splitter, parallel }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(Splitter::from_config(config), config.parallel_folds)
    }

    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    /// Folds and per-fold seeds are drawn from `rng` before any fold runs, so
    /// results do not depend on scheduling when folds run in parallel.
    pub fn evaluate<T, M, F, R>(
        &self,
        instances: &[T],
        factory: F,
        rng: &mut R,
    ) -> Result<CrossValidationReport>
    where
        T: Clone + Labeled + Send + Sync,
        M: FoldModel<T>,
        F: Fn(u64) -> Result<M> + Sync,
        R: Rng,
    {
        let folds = self.splitter.split(instances, rng)?;
        let seeds: Vec<u64> = folds.iter().map(|_| rng.gen()).collect();

        let evaluations: Vec<Evaluation> = if self.parallel {
            folds
                .par_iter()
                .zip(seeds.par_iter())
                .map(|(fold, &seed)| evaluate_fold(fold, &factory, seed))
                .collect::<Result<Vec<_>>>()?
        } else {
            folds
                .iter()
                .zip(&seeds)
                .map(|(fold, &seed)| evaluate_fold(fold, &factory, seed))
                .collect::<Result<Vec<_>>>()?
        };

        let pooled = Evaluation::pooled(&evaluations);
        log::debug!(
            "Cross-validated {} folds: macro F1 {:.4}, accuracy {:.4}",
            evaluations.len(),
            pooled.macro_f1(),
            pooled.accuracy()
        );

        Ok(CrossValidationReport {
            folds: evaluations,
            pooled,
        })
    }
}

fn evaluate_fold<T, M, F>(fold: &Fold<T>, factory: &F, seed: u64) -> Result<Evaluation>
where
    T: Labeled,
    M: FoldModel<T>,
    F: Fn(u64) -> Result<M>,
{
    let mut model = factory(seed)?;
    model.train(&fold.train)?;

    let mut evaluation = Evaluation::new();
    for instance in &fold.test {
        let predicted = model.predict(instance)?;
        evaluation.add(instance.label(), &predicted);
    }
    Ok(evaluation)
}
