use crate::error::{FeatsearchError, Result};
use crate::features::extractors::{ListExtractor, ValueExtractor};
use crate::features::selectors::ContextSelector;
use crate::types::{CategoricalFeature, Sequence, CONTEXT_DELIM, CROSS_DELIM, KEY_DELIM};
use serde::{Deserialize, Serialize};

pub const BIAS_ID: &str = "bias";

/// Feature functions turning one focus position into categorical features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureEmitter {
    Strings {
        selector: ContextSelector,
        extractors: Vec<ValueExtractor>,
    },
    MultiStrings {
        selector: ContextSelector,
        extractors: Vec<ListExtractor>,
    },
    /// Pairwise conjunction of two emitters.
    Cross {
        left: Box<FeatureEmitter>,
        right: Box<FeatureEmitter>,
    },
    Aggregate { emitters: Vec<FeatureEmitter> },
    Bias,
}

impl FeatureEmitter {
    pub fn strings(selector: ContextSelector, extractors: Vec<ValueExtractor>) -> Result<Self> {
        let emitter = Self::Strings {
            selector,
            extractors,
        };
        emitter.validate()?;
        Ok(emitter)
    }

    pub fn multi_strings(
        selector: ContextSelector,
        extractors: Vec<ListExtractor>,
    ) -> Result<Self> {
        let emitter = Self::MultiStrings {
            selector,
            extractors,
        };
        emitter.validate()?;
        Ok(emitter)
    }

    pub fn cross(left: FeatureEmitter, right: FeatureEmitter) -> Self {
        Self::Cross {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn aggregate(emitters: Vec<FeatureEmitter>) -> Self {
        Self::Aggregate { emitters }
    }

    /// Checks a tree built without the constructors, e.g. one decoded from
    /// a model bundle.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Strings { extractors, .. } if extractors.is_empty() => {
                Err(FeatsearchError::Configuration(
                    "String feature emitter needs at least one extractor".to_string(),
                ))
            }
            Self::MultiStrings { extractors, .. } if extractors.is_empty() => {
                Err(FeatsearchError::Configuration(
                    "Multi-string feature emitter needs at least one extractor".to_string(),
                ))
            }
            Self::Strings { .. } | Self::MultiStrings { .. } | Self::Bias => Ok(()),
            Self::Cross { left, right } => {
                left.validate()?;
                right.validate()
            }
            Self::Aggregate { emitters } => emitters.iter().try_for_each(Self::validate),
        }
    }

    pub fn emit(&self, sequence: &Sequence, focus: usize) -> Vec<CategoricalFeature> {
        match self {
            Self::Strings {
                selector,
                extractors,
            } => {
                let mut features = Vec::new();
                for selection in selector.select(sequence, focus) {
                    for extractor in extractors {
                        let value = selection
                            .elements
                            .iter()
                            .map(|e| extractor.extract(e))
                            .collect::<Vec<_>>()
                            .join(CONTEXT_DELIM);
                        features.push(CategoricalFeature::new(
                            format!("{}{}{}", selection.id, KEY_DELIM, extractor.id()),
                            value,
                        ));
                    }
                }
                features
            }
            Self::MultiStrings {
                selector,
                extractors,
            } => {
                let mut features = Vec::new();
                for selection in selector.select(sequence, focus) {
                    if selection.elements.len() > 1 {
                        log::warn!(
                            "Multi-valued extraction over {} elements of selection {}",
                            selection.elements.len(),
                            selection.id
                        );
                    }
                    for extractor in extractors {
                        let id = format!("{}{}{}", selection.id, KEY_DELIM, extractor.id());
                        for element in &selection.elements {
                            for value in extractor.extract(element) {
                                features.push(CategoricalFeature::new(id.clone(), value));
                            }
                        }
                    }
                }
                features
            }
            Self::Cross { left, right } => {
                let left = left.emit(sequence, focus);
                let right = right.emit(sequence, focus);
                let mut features = Vec::with_capacity(left.len() * right.len());
                for l in &left {
                    for r in &right {
                        if l == r {
                            continue;
                        }
                        features.push(CategoricalFeature::new(
                            format!("{}{}{}", l.id, CROSS_DELIM, r.id),
                            format!("{}{}{}", l.value, CROSS_DELIM, r.value),
                        ));
                    }
                }
                features
            }
            Self::Aggregate { emitters } => emitters
                .iter()
                .flat_map(|e| e.emit(sequence, focus))
                .collect(),
            Self::Bias => vec![CategoricalFeature::new(BIAS_ID, "1")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Element;

    fn sequence() -> Sequence {
        Sequence::new(
            ["the", "quick", "fox"]
                .iter()
                .map(|w| {
                    Element::new()
                        .with_feature("word", *w)
                        .with_list_feature("tags", ["x", "y"])
                })
                .collect(),
        )
    }

    #[test]
    fn zero_extractors_is_a_configuration_error() {
        assert!(FeatureEmitter::strings(ContextSelector::focus(), vec![]).is_err());
        assert!(FeatureEmitter::multi_strings(ContextSelector::focus(), vec![]).is_err());
    }

    #[test]
    fn decoded_trees_are_validated_recursively() {
        let json = r#"{"type": "aggregate", "emitters": [
            {"type": "bias"},
            {"type": "cross", "left": {"type": "bias"}, "right": {
                "type": "strings",
                "selector": {"type": "window", "offsets": [0]},
                "extractors": []
            }}
        ]}"#;
        let emitter: FeatureEmitter = serde_json::from_str(json).unwrap();
        assert!(matches!(emitter.validate(), Err(FeatsearchError::Configuration(_))));
        assert!(FeatureEmitter::Bias.validate().is_ok());
    }

    #[test]
    fn string_emitter_composes_ids() {
        let emitter = FeatureEmitter::strings(
            ContextSelector::window(vec![0, 1]),
            vec![ValueExtractor::key("word")],
        )
        .unwrap();
        let features = emitter.emit(&sequence(), 1);

        assert_eq!(
            features,
            vec![
                CategoricalFeature::new("w[0]::word", "quick"),
                CategoricalFeature::new("w[1]::word", "fox"),
            ]
        );
    }

    #[test]
    fn multi_element_selection_joins_values() {
        let emitter = FeatureEmitter::strings(
            ContextSelector::concatenated_window(vec![-1, 0]),
            vec![ValueExtractor::key("word")],
        )
        .unwrap();
        let features = emitter.emit(&sequence(), 1);

        assert_eq!(features, vec![CategoricalFeature::new("cat[-1,0]::word", "the quick")]);
    }

    #[test]
    fn multi_strings_fan_out() {
        let tags = vec![ListExtractor::lookup(["tags"])];
        let emitter = FeatureEmitter::multi_strings(ContextSelector::focus(), tags).unwrap();
        let features = emitter.emit(&sequence(), 0);

        assert_eq!(features.len(), 2);
        assert!(features.iter().all(|f| f.id == "w[0]::list(tags)"));
    }

    #[test]
    fn cross_skips_identical_pairs() {
        let word =
            FeatureEmitter::strings(ContextSelector::focus(), vec![ValueExtractor::key("word")])
                .unwrap();
        let same = FeatureEmitter::cross(word.clone(), word.clone());
        assert!(same.emit(&sequence(), 0).is_empty());

        let crossed = FeatureEmitter::cross(FeatureEmitter::Bias, word);
        assert_eq!(
            crossed.emit(&sequence(), 0),
            vec![CategoricalFeature::new("bias&w[0]::word", "1&the")]
        );
    }

    #[test]
    fn aggregate_preserves_order() {
        let word =
            FeatureEmitter::strings(ContextSelector::focus(), vec![ValueExtractor::key("word")])
                .unwrap();
        let emitter = FeatureEmitter::aggregate(vec![FeatureEmitter::Bias, word]);
        let features = emitter.emit(&sequence(), 2);

        assert_eq!(features[0].id, BIAS_ID);
        assert_eq!(features[1].value, "fox");
    }
}
