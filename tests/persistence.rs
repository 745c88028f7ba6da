use featsearch::config::AppConfig;
use featsearch::engines::generation::SearchSpace;
use featsearch::ml::models::ClassifierModel;
use featsearch::model::FORMAT_VERSION;
use featsearch::{Element, FeatsearchError, Instance, ModelBundle, Phenotype, Sequence};
use std::sync::Arc;

fn instances() -> Vec<Instance> {
    let words = ["I", "saw", "her", "duck", "and", "she", "saw", "me"];
    let tags = ["PRON", "VERB", "PRON", "NOUN", "CONJ", "PRON", "VERB", "PRON"];
    let sequence = Arc::new(Sequence::new(
        words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let element = Element::new()
                    .with_feature("word", *w)
                    .with_feature("pos", tags[i]);
                if i == 1 {
                    element
                } else {
                    element.with_head(1, "dep")
                }
            })
            .collect(),
    ));
    tags.iter()
        .enumerate()
        .map(|(i, tag)| Instance::new(i.to_string(), sequence.clone(), i, *tag))
        .collect()
}

fn untrained() -> Phenotype {
    SearchSpace::from_config(&AppConfig::default())
        .unwrap()
        .prototype()
        .unwrap()
        .build(21)
        .unwrap()
}

fn trained() -> Phenotype {
    let mut phenotype = untrained();
    phenotype.train(&instances(), &[]).unwrap();
    phenotype
}

#[test]
fn saved_phenotype_predicts_identically_after_load() {
    let phenotype = trained();
    let mut buffer = Vec::new();
    phenotype.save(&mut buffer).unwrap();

    let loaded = Phenotype::load(buffer.as_slice()).unwrap();
    assert_eq!(loaded.encoder().features(), phenotype.encoder().features());
    assert_eq!(loaded.encoder().labels(), phenotype.encoder().labels());
    assert_eq!(loaded.emitter(), phenotype.emitter());
    for instance in instances() {
        assert_eq!(loaded.classify(&instance).unwrap(), phenotype.classify(&instance).unwrap());
        let before = phenotype.score(&instance).unwrap();
        let after = loaded.score(&instance).unwrap();
        assert_eq!(before.keys().collect::<Vec<_>>(), after.keys().collect::<Vec<_>>());
        for (label, score) in &before {
            assert!((score - after[label]).abs() < 1e-9);
        }
    }
}

#[test]
fn loaded_vocabularies_stay_frozen() {
    let mut buffer = Vec::new();
    trained().save(&mut buffer).unwrap();
    let loaded = Phenotype::load(buffer.as_slice()).unwrap();

    assert!(loaded.encoder().features().is_frozen());
    assert!(loaded.encoder().labels().is_frozen());
}

#[test]
fn bundle_records_version_and_classifier_tag() {
    let mut buffer = Vec::new();
    trained().save(&mut buffer).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    assert_eq!(json["format_version"], FORMAT_VERSION);
    assert_eq!(json["classifier"]["type"], "logistic");
    assert!(json["created_at"].is_string());

    let bundle = ModelBundle::load(buffer.as_slice()).unwrap();
    assert!(matches!(bundle.classifier, ClassifierModel::Logistic(_)));
}

#[test]
fn single_label_model_round_trips_as_constant() {
    let mut data = instances();
    for instance in &mut data {
        instance.label = "X".to_string();
    }
    let mut phenotype = untrained();
    phenotype.train(&data, &[]).unwrap();

    let mut buffer = Vec::new();
    phenotype.save(&mut buffer).unwrap();
    let loaded = Phenotype::load(buffer.as_slice()).unwrap();
    assert!(matches!(loaded.classifier(), ClassifierModel::Constant(_)));
    assert_eq!(loaded.classify(&instances()[3]).unwrap(), "X");
}

#[test]
fn untrained_phenotype_cannot_be_saved() {
    let err = untrained().save(Vec::new()).unwrap_err();
    assert!(matches!(err, FeatsearchError::Validation(_)));
}

fn saved_json() -> serde_json::Value {
    let mut buffer = Vec::new();
    trained().save(&mut buffer).unwrap();
    serde_json::from_slice(&buffer).unwrap()
}

fn load_error(json: &serde_json::Value) -> FeatsearchError {
    let bytes = serde_json::to_vec(json).unwrap();
    Phenotype::load(bytes.as_slice()).unwrap_err()
}

#[test]
fn classifier_shape_must_match_vocabularies() {
    let mut json = saved_json();
    json["classifier"]["num_features"] = serde_json::json!(1);
    json["classifier"]["num_labels"] = serde_json::json!(2);
    json["classifier"]["weights"] = serde_json::json!([0.5]);
    assert!(matches!(load_error(&json), FeatsearchError::UnsupportedBundle(_)));

    let mut json = saved_json();
    json["features"].as_array_mut().unwrap().push("extra=1".into());
    assert!(matches!(load_error(&json), FeatsearchError::UnsupportedBundle(_)));

    let mut json = saved_json();
    json["classifier"]["bias"].as_array_mut().unwrap().pop();
    assert!(matches!(load_error(&json), FeatsearchError::UnsupportedBundle(_)));
}

#[test]
fn constant_label_must_exist() {
    let mut json = saved_json();
    json["classifier"] = serde_json::json!({"type": "constant", "label": 9, "num_labels": 9});
    assert!(matches!(load_error(&json), FeatsearchError::UnsupportedBundle(_)));
}

#[test]
fn repeated_vocabulary_entries_are_rejected() {
    let mut json = saved_json();
    let labels = json["labels"].as_array_mut().unwrap();
    let first = labels[0].clone();
    labels.push(first);
    let err = load_error(&json);
    assert!(err.to_string().contains("Duplicate vocabulary entry"), "{}", err);
}

#[test]
fn emitter_without_extractors_is_rejected() {
    let mut json = saved_json();
    json["emitter"] = serde_json::json!({
        "type": "aggregate",
        "emitters": [{"type": "strings", "selector": {"type": "sequence"}, "extractors": []}]
    });
    assert!(matches!(load_error(&json), FeatsearchError::UnsupportedBundle(_)));
}
