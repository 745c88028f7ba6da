use crate::error::{FeatsearchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Joins a selection identifier and an extractor identifier.
pub const KEY_DELIM: &str = "::";
/// Joins per-element values of a multi-element selection.
pub const CONTEXT_DELIM: &str = " ";
/// Joins the two halves of a conjoined feature.
pub const CROSS_DELIM: &str = "&";
/// Returned by extractors when no value is available.
pub const NONE_VALUE: &str = "<NONE>";

/// One annotated element of a sequence.
///
/// Elements live in a [`Sequence`] arena; the parent link is an index into
/// that arena, never an owning pointer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub features: BTreeMap<String, String>,
    #[serde(default)]
    pub list_features: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub head: Option<usize>,
    #[serde(default)]
    pub relation: Option<String>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.features.insert(key.into(), value.into());
        self
    }

    pub fn with_list_feature<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_features
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_head(mut self, head: usize, relation: impl Into<String>) -> Self {
        self.head = Some(head);
        self.relation = Some(relation.into());
        self
    }

    pub fn feature(&self, key: &str) -> Option<&str> {
        self.features.get(key).map(String::as_str)
    }

    pub fn list_feature(&self, key: &str) -> Option<&[String]> {
        self.list_features.get(key).map(Vec::as_slice)
    }
}

/// Arena of elements with index-based parent/child links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SequenceRepr", into = "SequenceRepr")]
pub struct Sequence {
    elements: Vec<Element>,
    children: Vec<Vec<usize>>,
}

#[derive(Serialize, Deserialize)]
struct SequenceRepr {
    elements: Vec<Element>,
}

impl From<SequenceRepr> for Sequence {
    fn from(repr: SequenceRepr) -> Self {
        Sequence::new(repr.elements)
    }
}

impl From<Sequence> for SequenceRepr {
    fn from(sequence: Sequence) -> Self {
        SequenceRepr {
            elements: sequence.elements,
        }
    }
}

impl Sequence {
    /// Builds the arena, renumbering positional indices and deriving child lists.
    /// Parent links pointing outside the arena are dropped.
    pub fn new(mut elements: Vec<Element>) -> Self {
        let len = elements.len();
        let mut children = vec![Vec::new(); len];

        for (i, element) in elements.iter_mut().enumerate() {
            element.index = i;
            match element.head {
                Some(head) if head < len && head != i => children[head].push(i),
                Some(_) => element.head = None,
                None => {}
            }
        }

        Self { elements, children }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Element at `index + offset`, or `None` when that falls outside the sequence.
    pub fn at_offset(&self, index: usize, offset: i64) -> Option<&Element> {
        let target = i64::try_from(index).ok()?.checked_add(offset)?;
        let target = usize::try_from(target).ok()?;
        self.elements.get(target)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn parent(&self, index: usize) -> Option<&Element> {
        self.elements
            .get(index)
            .and_then(|e| e.head)
            .and_then(|h| self.elements.get(h))
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = &Element> {
        self.children
            .get(index)
            .into_iter()
            .flatten()
            .filter_map(move |&c| self.elements.get(c))
    }
}

/// Anything carrying a gold label, used by fold construction.
pub trait Labeled {
    fn label(&self) -> &str;
}

/// A classification target: a focus position inside a shared sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub sequence: Arc<Sequence>,
    pub focus: usize,
    pub label: String,
}

impl Instance {
    pub fn new(
        id: impl Into<String>,
        sequence: Arc<Sequence>,
        focus: usize,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sequence,
            focus,
            label: label.into(),
        }
    }
}

impl Labeled for Instance {
    fn label(&self) -> &str {
        &self.label
    }
}

/// A categorical (identifier, value) feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoricalFeature {
    pub id: String,
    pub value: String,
}

impl CategoricalFeature {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// Vocabulary key for this feature.
    pub fn key(&self) -> String {
        format!("{}={}", self.id, self.value)
    }
}

/// Sparse vector with strictly ascending, unique indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Binary presence vector; duplicate indices collapse to a single entry.
    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        let values = vec![1.0; indices.len()];
        Self { indices, values }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseInstance {
    pub id: String,
    pub target: usize,
    pub vector: SparseVector,
}

/// Corpus record: a sequence with one gold label per element. Every
/// element becomes one instance focused on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSequence {
    #[serde(default)]
    pub id: Option<String>,
    pub elements: Vec<Element>,
    pub labels: Vec<String>,
}

impl LabeledSequence {
    /// Instance ids are `{id}:{position}`, with the record position as the
    /// fallback id.
    pub fn into_instances(self, position: usize) -> Result<Vec<Instance>> {
        if self.elements.len() != self.labels.len() {
            return Err(FeatsearchError::Validation(format!(
                "Sequence {} has {} elements but {} labels",
                self.id.as_deref().unwrap_or("?"),
                self.elements.len(),
                self.labels.len()
            )));
        }
        let id = self.id.unwrap_or_else(|| position.to_string());
        let sequence = Arc::new(Sequence::new(self.elements));
        Ok(self
            .labels
            .into_iter()
            .enumerate()
            .map(|(focus, label)| {
                Instance::new(format!("{}:{}", id, focus), sequence.clone(), focus, label)
            })
            .collect())
    }
}

/// Flattens corpus records into instances sharing their sequences.
pub fn instances_from_corpus(records: Vec<LabeledSequence>) -> Result<Vec<Instance>> {
    let mut instances = Vec::new();
    for (position, record) in records.into_iter().enumerate() {
        instances.extend(record.into_instances(position)?);
    }
    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_derives_children_and_drops_bad_heads() {
        let sequence = Sequence::new(vec![
            Element::new().with_head(1, "nsubj"),
            Element::new(),
            Element::new().with_head(1, "obj"),
            Element::new().with_head(42, "dangling"),
        ]);

        let children: Vec<usize> = sequence.children(1).map(|e| e.index).collect();
        assert_eq!(children, vec![0, 2]);
        assert_eq!(sequence.parent(0).map(|e| e.index), Some(1));
        assert!(sequence.get(3).unwrap().head.is_none());
    }

    #[test]
    fn extreme_offsets_fall_outside_the_sequence() {
        let sequence = Sequence::new(vec![Element::new(), Element::new()]);
        assert_eq!(sequence.at_offset(1, -1).map(|e| e.index), Some(0));
        assert!(sequence.at_offset(1, -2).is_none());
        assert!(sequence.at_offset(1, i64::MAX).is_none());
        assert!(sequence.at_offset(0, i64::MIN).is_none());
    }

    #[test]
    fn sparse_vector_is_sorted_and_unique() {
        let vector = SparseVector::from_indices(vec![7, 2, 7, 0, 2]);
        assert_eq!(vector.indices(), &[0, 2, 7]);
        assert_eq!(vector.values(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn corpus_records_become_shared_instances() {
        let json = r#"[{
            "id": "s1",
            "elements": [{"features": {"word": "a"}}, {"features": {"word": "b"}}],
            "labels": ["X", "Y"]
        }]"#;
        let records: Vec<LabeledSequence> = serde_json::from_str(json).unwrap();
        let instances = instances_from_corpus(records).unwrap();

        assert_eq!(instances.len(), 2);
        assert_eq!(instances[1].id, "s1:1");
        assert_eq!(instances[1].label, "Y");
        assert!(Arc::ptr_eq(&instances[0].sequence, &instances[1].sequence));
    }

    #[test]
    fn label_count_must_match() {
        let record = LabeledSequence {
            id: None,
            elements: vec![Element::new()],
            labels: vec![],
        };
        assert!(record.into_instances(0).is_err());
    }
}
