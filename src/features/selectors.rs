use crate::types::{Element, Sequence, NONE_VALUE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Elements picked out around a focus, keyed by a deterministic identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSelection<'a> {
    pub id: String,
    pub elements: Vec<&'a Element>,
}

impl<'a> ContextSelection<'a> {
    pub fn new(id: impl Into<String>, elements: Vec<&'a Element>) -> Self {
        Self {
            id: id.into(),
            elements,
        }
    }
}

/// Include/exclude test on a label. Empty include admits everything,
/// empty exclude rejects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFilter {
    #[serde(default)]
    pub include: BTreeSet<String>,
    #[serde(default)]
    pub exclude: BTreeSet<String>,
}

impl LabelFilter {
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn accepts(&self, label: &str) -> bool {
        (self.include.is_empty() || self.include.contains(label)) && !self.exclude.contains(label)
    }

    fn id(&self) -> String {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(",");
        format!("inc={{{}}};exc={{{}}}", join(&self.include), join(&self.exclude))
    }
}

/// Context selectors, one variant per selection strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextSelector {
    /// Elements at fixed offsets from the focus.
    Window {
        offsets: Vec<i64>,
        #[serde(default)]
        concatenate: bool,
    },
    /// Children of the focus whose relation label passes the filter,
    /// expanded `level` more times to relations of relations.
    Relations {
        #[serde(default)]
        filter: LabelFilter,
        #[serde(default)]
        level: usize,
    },
    /// Parent chain from the focus up to the root.
    AncestorPath {
        #[serde(default)]
        max_depth: Option<usize>,
    },
    /// The ancestor `levels` steps above the focus.
    Head { levels: usize },
    /// Every element of the sequence.
    Sequence,
    Composite { selectors: Vec<ContextSelector> },
    /// Applies `inner` at every element selected by `base`.
    Nested {
        base: Box<ContextSelector>,
        inner: Box<ContextSelector>,
    },
    /// Keeps only elements whose `key` value passes the filter.
    Filtered {
        base: Box<ContextSelector>,
        key: String,
        filter: LabelFilter,
    },
}

impl ContextSelector {
    pub fn window(offsets: impl Into<Vec<i64>>) -> Self {
        Self::Window {
            offsets: offsets.into(),
            concatenate: false,
        }
    }

    pub fn concatenated_window(offsets: impl Into<Vec<i64>>) -> Self {
        Self::Window {
            offsets: offsets.into(),
            concatenate: true,
        }
    }

    pub fn focus() -> Self {
        Self::window(vec![0])
    }

    pub fn relations(filter: LabelFilter, level: usize) -> Self {
        Self::Relations { filter, level }
    }

    pub fn head(levels: usize) -> Self {
        Self::Head { levels }
    }

    pub fn nested(base: ContextSelector, inner: ContextSelector) -> Self {
        Self::Nested {
            base: Box::new(base),
            inner: Box::new(inner),
        }
    }

    pub fn filtered(base: ContextSelector, key: impl Into<String>, filter: LabelFilter) -> Self {
        Self::Filtered {
            base: Box::new(base),
            key: key.into(),
            filter,
        }
    }

    /// Selects context around `focus`. Same input and configuration always
    /// produce the same selections in the same order.
    pub fn select<'a>(&self, sequence: &'a Sequence, focus: usize) -> Vec<ContextSelection<'a>> {
        if focus >= sequence.len() {
            return Vec::new();
        }

        match self {
            Self::Window {
                offsets,
                concatenate,
            } => select_window(sequence, focus, offsets, *concatenate),
            Self::Relations { filter, level } => select_relations(sequence, focus, filter, *level)
                .into_iter()
                .collect(),
            Self::AncestorPath { max_depth } => select_ancestors(sequence, focus, *max_depth)
                .into_iter()
                .collect(),
            Self::Head { levels } => select_head(sequence, focus, *levels).into_iter().collect(),
            Self::Sequence => vec![ContextSelection::new(
                "seq",
                sequence.elements().iter().collect(),
            )],
            Self::Composite { selectors } => selectors
                .iter()
                .flat_map(|s| s.select(sequence, focus))
                .collect(),
            Self::Nested { base, inner } => {
                let mut selections = Vec::new();
                for outer in base.select(sequence, focus) {
                    for element in &outer.elements {
                        for sel in inner.select(sequence, element.index) {
                            selections.push(ContextSelection::new(
                                format!("{}/{}", outer.id, sel.id),
                                sel.elements,
                            ));
                        }
                    }
                }
                selections
            }
            Self::Filtered { base, key, filter } => base
                .select(sequence, focus)
                .into_iter()
                .filter_map(|sel| {
                    let elements: Vec<&Element> = sel
                        .elements
                        .into_iter()
                        .filter(|e| filter.accepts(e.feature(key).unwrap_or(NONE_VALUE)))
                        .collect();
                    if elements.is_empty() {
                        None
                    } else {
                        Some(ContextSelection::new(
                            format!("{}|{}[{}]", sel.id, key, filter.id()),
                            elements,
                        ))
                    }
                })
                .collect(),
        }
    }
}

fn select_window<'a>(
    sequence: &'a Sequence,
    focus: usize,
    offsets: &[i64],
    concatenate: bool,
) -> Vec<ContextSelection<'a>> {
    if concatenate {
        let elements: Vec<&Element> = offsets
            .iter()
            .filter_map(|&o| sequence.at_offset(focus, o))
            .collect();
        if elements.is_empty() {
            return Vec::new();
        }
        let joined = offsets
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<_>>()
            .join(",");
        return vec![ContextSelection::new(format!("cat[{}]", joined), elements)];
    }

    offsets
        .iter()
        .filter_map(|&offset| {
            sequence
                .at_offset(focus, offset)
                .map(|e| ContextSelection::new(format!("w[{}]", offset), vec![e]))
        })
        .collect()
}

fn select_relations<'a>(
    sequence: &'a Sequence,
    focus: usize,
    filter: &LabelFilter,
    level: usize,
) -> Option<ContextSelection<'a>> {
    let mut visited: HashSet<usize> = HashSet::from([focus]);
    let mut frontier = vec![focus];
    let mut selected: Vec<&Element> = Vec::new();

    for _ in 0..=level {
        let mut next = Vec::new();
        for &index in &frontier {
            for child in sequence.children(index) {
                let label = child.relation.as_deref().unwrap_or(NONE_VALUE);
                if filter.accepts(label) && visited.insert(child.index) {
                    selected.push(child);
                    next.push(child.index);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    if selected.is_empty() {
        return None;
    }
    Some(ContextSelection::new(
        format!("rel[lvl={};{}]", level, filter.id()),
        selected,
    ))
}

fn select_ancestors(
    sequence: &Sequence,
    focus: usize,
    max_depth: Option<usize>,
) -> Option<ContextSelection<'_>> {
    let mut visited: HashSet<usize> = HashSet::from([focus]);
    let mut path = Vec::new();
    let mut current = focus;

    while let Some(parent) = sequence.get(current).and_then(|e| e.head) {
        if max_depth.is_some_and(|max| path.len() >= max) {
            break;
        }
        if !visited.insert(parent) {
            log::warn!(
                "Cycle in parent links at element {} (focus {}), truncating ancestor path",
                parent,
                focus
            );
            break;
        }
        match sequence.get(parent) {
            Some(element) => path.push(element),
            None => break,
        }
        current = parent;
    }

    if path.is_empty() {
        return None;
    }
    let id = match max_depth {
        Some(max) => format!("path[{}]", max),
        None => "path".to_string(),
    };
    Some(ContextSelection::new(id, path))
}

fn select_head(sequence: &Sequence, focus: usize, levels: usize) -> Option<ContextSelection<'_>> {
    let mut visited: HashSet<usize> = HashSet::from([focus]);
    let mut current = focus;

    for _ in 0..levels {
        let parent = sequence.get(current)?.head?;
        if !visited.insert(parent) {
            log::warn!("Cycle in parent links at element {} (focus {})", parent, focus);
            return None;
        }
        current = parent;
    }

    sequence
        .get(current)
        .map(|e| ContextSelection::new(format!("head[{}]", levels), vec![e]))
}
