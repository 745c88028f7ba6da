use crate::error::{FeatsearchError, Result};
use crate::features::emitters::FeatureEmitter;
use crate::features::extractors::{StringFunction, ValueExtractor};
use crate::features::selectors::{ContextSelector, LabelFilter};

/// A named feature template and the interchangeable emitters it may take.
#[derive(Debug, Clone)]
pub struct TemplateGroup {
    pub name: String,
    pub alternatives: Vec<FeatureEmitter>,
}

/// Ordered catalog of feature templates. Each group becomes one feature gene
/// whose possible values are the group's alternatives.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    groups: Vec<TemplateGroup>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of window, n-gram, affix, head, relation and path templates
    /// over each feature key, plus a focus conjunction of the first two keys.
    pub fn standard<S: AsRef<str>>(keys: &[S]) -> Result<Self> {
        if keys.is_empty() {
            return Err(FeatsearchError::Configuration(
                "Template registry needs at least one feature key".to_string(),
            ));
        }

        let mut registry = Self::new();
        for key in keys {
            registry.register_key_templates(key.as_ref())?;
        }

        if let [first, second, ..] = keys {
            let focus = |k: &str| {
                FeatureEmitter::strings(ContextSelector::focus(), vec![ValueExtractor::key(k)])
            };
            let pair = FeatureEmitter::cross(focus(first.as_ref())?, focus(second.as_ref())?);
            let previous = FeatureEmitter::cross(
                FeatureEmitter::strings(
                    ContextSelector::window(vec![-1]),
                    vec![ValueExtractor::key(second.as_ref())],
                )?,
                focus(first.as_ref())?,
            );
            registry.register(
                format!("{}x{}.cross", first.as_ref(), second.as_ref()),
                vec![pair, previous],
            )?;
        }

        Ok(registry)
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        alternatives: Vec<FeatureEmitter>,
    ) -> Result<()> {
        let name = name.into();
        if alternatives.is_empty() {
            return Err(FeatsearchError::Configuration(format!(
                "Template group '{}' has no alternatives",
                name
            )));
        }
        if self.get(&name).is_some() {
            return Err(FeatsearchError::Configuration(format!(
                "Template group '{}' registered twice",
                name
            )));
        }
        self.groups.push(TemplateGroup { name, alternatives });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TemplateGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn groups(&self) -> &[TemplateGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn register_key_templates(&mut self, key: &str) -> Result<()> {
        let value = || vec![ValueExtractor::key(key)];
        let strings = |selector: ContextSelector| FeatureEmitter::strings(selector, value());

        self.register(
            format!("{}.window", key),
            vec![
                strings(ContextSelector::window(vec![0]))?,
                strings(ContextSelector::window(vec![-1, 0, 1]))?,
                strings(ContextSelector::window(vec![-2, -1, 0, 1, 2]))?,
            ],
        )?;

        self.register(
            format!("{}.ngram", key),
            vec![
                strings(ContextSelector::concatenated_window(vec![-1, 0]))?,
                strings(ContextSelector::concatenated_window(vec![0, 1]))?,
                strings(ContextSelector::concatenated_window(vec![-1, 0, 1]))?,
            ],
        )?;

        let affix = |f: StringFunction| {
            FeatureEmitter::strings(
                ContextSelector::focus(),
                vec![ValueExtractor::transform(
                    ValueExtractor::key(key),
                    vec![StringFunction::Lowercase, f],
                )],
            )
        };
        self.register(
            format!("{}.affix", key),
            vec![
                affix(StringFunction::Prefix(3))?,
                affix(StringFunction::Suffix(2))?,
                affix(StringFunction::Suffix(3))?,
            ],
        )?;

        self.register(
            format!("{}.head", key),
            vec![
                strings(ContextSelector::head(1))?,
                strings(ContextSelector::head(2))?,
                strings(ContextSelector::nested(
                    ContextSelector::head(1),
                    ContextSelector::relations(LabelFilter::allow_all(), 0),
                ))?,
            ],
        )?;

        self.register(
            format!("{}.relations", key),
            vec![
                strings(ContextSelector::relations(LabelFilter::allow_all(), 0))?,
                strings(ContextSelector::relations(LabelFilter::allow_all(), 1))?,
            ],
        )?;

        self.register(
            format!("{}.path", key),
            vec![
                strings(ContextSelector::AncestorPath { max_depth: Some(2) })?,
                strings(ContextSelector::AncestorPath { max_depth: None })?,
            ],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_groups_per_key() {
        let registry = TemplateRegistry::standard(&["word", "pos"]).unwrap();

        assert_eq!(registry.len(), 6 * 2 + 1);
        assert!(registry.get("word.window").is_some());
        assert!(registry.get("wordxpos.cross").is_some());
        assert!(registry.groups().iter().all(|g| !g.alternatives.is_empty()));
    }

    #[test]
    fn duplicate_and_empty_groups_are_rejected() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.register("bias", vec![]).is_err());
        registry.register("bias", vec![FeatureEmitter::Bias]).unwrap();
        assert!(registry.register("bias", vec![FeatureEmitter::Bias]).is_err());
    }

    #[test]
    fn empty_key_list_is_rejected() {
        assert!(TemplateRegistry::standard::<&str>(&[]).is_err());
    }
}
