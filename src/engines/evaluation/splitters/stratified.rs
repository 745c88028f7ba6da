use super::base::FoldSplitter;
use super::types::Fold;
use crate::error::FeatsearchError;
use crate::types::Labeled;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Stratified resampling: every fold draws a fresh shuffled train/test split
/// of each label class at `train_ratio`, so test sets may overlap across folds.
#[derive(Debug, Clone)]
pub struct StratifiedSplitter {
    num_folds: usize,
    train_ratio: f64,
}

impl StratifiedSplitter {
    pub fn new(num_folds: usize, train_ratio: f64) -> Self {
        Self {
            num_folds,
            train_ratio,
        }
    }
}

impl FoldSplitter for StratifiedSplitter {
    fn split<T, R>(&self, instances: &[T], rng: &mut R) -> Result<Vec<Fold<T>>, FeatsearchError>
    where
        T: Clone + Labeled,
        R: Rng,
    {
        if self.num_folds == 0 || !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(FeatsearchError::Configuration(format!(
                "Stratified resampling needs folds > 0 and a ratio in (0, 1), got {} and {}",
                self.num_folds, self.train_ratio
            )));
        }

        let mut classes: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, instance) in instances.iter().enumerate() {
            classes.entry(instance.label()).or_default().push(i);
        }

        let mut folds: Vec<Fold<T>> = (0..self.num_folds).map(Fold::new).collect();

        for (label, members) in &classes {
            let mut train_size = (members.len() as f64 * self.train_ratio).round() as usize;
            if train_size >= members.len() {
                log::info!(
                    "Class {} has {} instances, borrowing one from train for testing",
                    label,
                    members.len()
                );
                train_size = members.len() - 1;
            }

            let mut shuffled = members.clone();
            for fold in folds.iter_mut() {
                shuffled.shuffle(rng);
                let (train, test) = shuffled.split_at(train_size);
                fold.train.extend(train.iter().map(|&i| instances[i].clone()));
                fold.test.extend(test.iter().map(|&i| instances[i].clone()));
            }
        }

        Ok(folds)
    }

    fn num_folds(&self) -> usize {
        self.num_folds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(usize, String);

    impl Labeled for Item {
        fn label(&self) -> &str {
            &self.1
        }
    }

    fn items(counts: &[(&str, usize)]) -> Vec<Item> {
        let mut items = Vec::new();
        for (label, n) in counts {
            for _ in 0..*n {
                items.push(Item(items.len(), label.to_string()));
            }
        }
        items
    }

    #[test]
    fn each_fold_keeps_class_proportions() {
        let items = items(&[("a", 10), ("b", 5)]);
        let folds = StratifiedSplitter::new(3, 0.8)
            .split(&items, &mut StdRng::seed_from_u64(5))
            .unwrap();

        assert_eq!(folds.len(), 3);
        for fold in &folds {
            let test_a = fold.test.iter().filter(|i| i.1 == "a").count();
            let test_b = fold.test.iter().filter(|i| i.1 == "b").count();
            assert_eq!((test_a, test_b), (2, 1));
            assert_eq!(fold.train.len(), 12);
            assert!(fold.test.iter().all(|t| !fold.train.contains(t)));
        }
    }

    #[test]
    fn tiny_class_still_gets_a_test_instance() {
        let items = items(&[("a", 10), ("rare", 2)]);
        let folds = StratifiedSplitter::new(2, 0.8)
            .split(&items, &mut StdRng::seed_from_u64(9))
            .unwrap();

        for fold in &folds {
            assert_eq!(fold.test.iter().filter(|i| i.1 == "rare").count(), 1);
            assert_eq!(fold.train.iter().filter(|i| i.1 == "rare").count(), 1);
        }
    }
}
