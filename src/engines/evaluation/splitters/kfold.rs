use super::base::FoldSplitter;
use super::types::Fold;
use crate::error::FeatsearchError;
use crate::types::Labeled;
use rand::seq::SliceRandom;
use rand::Rng;

/// Strict k-fold: a shuffled, disjoint partition into `num_folds` parts.
#[derive(Debug, Clone)]
pub struct KFoldSplitter {
    num_folds: usize,
}

impl KFoldSplitter {
    pub fn new(num_folds: usize) -> Self {
        Self { num_folds }
    }
}

impl FoldSplitter for KFoldSplitter {
    fn split<T, R>(&self, instances: &[T], rng: &mut R) -> Result<Vec<Fold<T>>, FeatsearchError>
    where
        T: Clone + Labeled,
        R: Rng,
    {
        let k = self.num_folds;
        if k < 2 || instances.len() < 2 * k {
            return Err(FeatsearchError::Configuration(format!(
                "Strict {}-fold validation needs at least {} instances, got {}",
                k,
                2 * k,
                instances.len()
            )));
        }

        let mut order: Vec<usize> = (0..instances.len()).collect();
        order.shuffle(rng);

        // the first n % k parts take one extra instance
        let base = instances.len() / k;
        let extra = instances.len() % k;
        let mut bounds = Vec::with_capacity(k + 1);
        bounds.push(0);
        for part in 0..k {
            let size = base + usize::from(part < extra);
            bounds.push(bounds[part] + size);
        }

        let folds = (0..k)
            .map(|fold_num| {
                let (start, end) = (bounds[fold_num], bounds[fold_num + 1]);
                let mut fold = Fold::new(fold_num);
                for (position, &i) in order.iter().enumerate() {
                    if (start..end).contains(&position) {
                        fold.test.push(instances[i].clone());
                    } else {
                        fold.train.push(instances[i].clone());
                    }
                }
                fold
            })
            .collect();

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
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(usize);

    impl Labeled for Item {
        fn label(&self) -> &str {
            "x"
        }
    }

    #[test]
    fn folds_form_a_true_partition() {
        let items: Vec<Item> = (0..23).map(Item).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let folds = KFoldSplitter::new(5).split(&items, &mut rng).unwrap();

        assert_eq!(folds.len(), 5);
        let mut seen = Vec::new();
        for fold in &folds {
            let test: HashSet<usize> = fold.test.iter().map(|i| i.0).collect();
            assert!(fold.train.iter().all(|i| !test.contains(&i.0)));
            assert_eq!(fold.train.len() + fold.test.len(), items.len());
            assert!(fold.test.len() == 4 || fold.test.len() == 5);
            seen.extend(test);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_folds() {
        let items: Vec<Item> = (0..10).map(Item).collect();
        let a = KFoldSplitter::new(2)
            .split(&items, &mut StdRng::seed_from_u64(1))
            .unwrap();
        let b = KFoldSplitter::new(2)
            .split(&items, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(a[0].test, b[0].test);
    }

    #[test]
    fn too_few_instances_is_a_configuration_error() {
        let items: Vec<Item> = (0..9).map(Item).collect();
        let result = KFoldSplitter::new(5).split(&items, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(FeatsearchError::Configuration(_))));
    }
}
