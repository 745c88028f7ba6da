use featsearch::engines::evaluation::{
    CrossValidator, Evaluation, FoldSplitter, KFoldSplitter, LabelCounts, Splitter,
    StratifiedSplitter,
};
use featsearch::features::{ContextSelector, FeatureEmitter, ValueExtractor};
use featsearch::ml::models::{ClassifierModel, LogisticRegression};
use featsearch::{Element, Instance, Phenotype, Sequence};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

/// Words whose label is fully determined by the word itself.
fn corpus(n: usize) -> Vec<Instance> {
    let words: Vec<(&str, &str)> = (0..n)
        .map(|i| match i % 3 {
            0 => ("run", "VERB"),
            1 => ("dog", "NOUN"),
            _ => ("red", "ADJ"),
        })
        .collect();
    let sequence = Arc::new(Sequence::new(
        words.iter().map(|(w, _)| Element::new().with_feature("word", *w)).collect(),
    ));
    words
        .iter()
        .enumerate()
        .map(|(i, (_, label))| Instance::new(i.to_string(), sequence.clone(), i, *label))
        .collect()
}

#[test]
fn strict_kfold_is_a_disjoint_partition() {
    let data = corpus(23);
    let folds = KFoldSplitter::new(5)
        .split(&data, &mut StdRng::seed_from_u64(9))
        .unwrap();
    assert_eq!(folds.len(), 5);

    let mut tested = HashSet::new();
    for fold in &folds {
        let train: HashSet<&str> = fold.train.iter().map(|i| i.id.as_str()).collect();
        for instance in &fold.test {
            assert!(!train.contains(instance.id.as_str()));
            assert!(tested.insert(instance.id.clone()));
        }
        assert_eq!(fold.train.len() + fold.test.len(), data.len());
    }
    assert_eq!(tested.len(), data.len());
}

#[test]
fn too_few_instances_for_strict_kfold_fail() {
    let data = corpus(7);
    assert!(KFoldSplitter::new(4).split(&data, &mut StdRng::seed_from_u64(0)).is_err());
}

#[test]
fn stratified_folds_keep_every_class_in_train() {
    let data = corpus(30);
    let folds = StratifiedSplitter::new(3, 0.8)
        .split(&data, &mut StdRng::seed_from_u64(4))
        .unwrap();
    for fold in &folds {
        let labels: HashSet<&str> = fold.train.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels.len(), 3);
        assert!(!fold.test.is_empty());
    }
}

#[test]
fn f1_matches_hand_computed_example() {
    let mut evaluation = Evaluation::new();
    evaluation.insert_counts(
        "NOUN",
        LabelCounts {
            correct: 8,
            predicted: 10,
            gold: 12,
        },
    );

    assert!((evaluation.precision("NOUN") - 0.8).abs() < 1e-9);
    assert!((evaluation.recall("NOUN") - 0.6667).abs() < 1e-3);
    assert!((evaluation.f1("NOUN") - 0.7273).abs() < 1e-3);
}

#[test]
fn phenotype_cross_validation_learns_a_lexical_task() {
    let data = corpus(30);
    let validator = CrossValidator::new(Splitter::KFold(KFoldSplitter::new(3)), true);
    let emitter = FeatureEmitter::aggregate(vec![
        FeatureEmitter::Bias,
        FeatureEmitter::strings(ContextSelector::focus(), vec![ValueExtractor::key("word")])
            .unwrap(),
    ]);

    let report = validator
        .evaluate(
            &data,
            |seed| {
                let mut classifier = LogisticRegression::new(seed);
                classifier.epochs = 30;
                Ok(Phenotype::new(emitter.clone(), ClassifierModel::Logistic(classifier)))
            },
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();

    assert_eq!(report.folds.len(), 3);
    assert_eq!(report.pooled.total(), data.len());
    assert!(report.macro_f1() > 0.9, "macro F1 was {}", report.macro_f1());
}

#[test]
fn seeded_cross_validation_is_reproducible() {
    let data = corpus(24);
    let validator = CrossValidator::new(Splitter::KFold(KFoldSplitter::new(4)), true);
    let previous_word = vec![ValueExtractor::key("word")];
    let emitter =
        FeatureEmitter::strings(ContextSelector::window(vec![-1]), previous_word).unwrap();
    let run = || {
        validator
            .evaluate(
                &data,
                |seed| {
                    Ok(Phenotype::new(
                        emitter.clone(),
                        ClassifierModel::Logistic(LogisticRegression::new(seed)),
                    ))
                },
                &mut StdRng::seed_from_u64(77),
            )
            .unwrap()
            .macro_f1()
    };
    assert_eq!(run(), run());
}
