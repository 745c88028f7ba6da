use crate::error::{FeatsearchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Insertion-ordered bijection between strings and dense indices.
///
/// Indices are handed out densely from 0 in first-seen order and are never
/// reassigned. Once frozen, lookups of unseen strings return `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    entries: Vec<String>,
    index: HashMap<String, usize>,
    frozen: bool,
}

/// Restores a frozen vocabulary. A repeated entry would shift every later
/// index, so it is rejected.
impl TryFrom<Vec<String>> for Vocabulary {
    type Error = FeatsearchError;

    fn try_from(entries: Vec<String>) -> Result<Self> {
        let mut vocabulary = Self::new();
        for entry in entries {
            if vocabulary.get(&entry).is_some() {
                return Err(FeatsearchError::Validation(format!(
                    "Duplicate vocabulary entry '{}'",
                    entry
                )));
            }
            vocabulary.insert(&entry);
        }
        vocabulary.freeze();
        Ok(vocabulary)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.entries
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `entry`, assigning the next one if unseen and not frozen.
    pub fn insert(&mut self, entry: &str) -> Option<usize> {
        if let Some(&i) = self.index.get(entry) {
            return Some(i);
        }
        if self.frozen {
            return None;
        }
        let i = self.entries.len();
        self.entries.push(entry.to_string());
        self.index.insert(entry.to_string(), i);
        Some(i)
    }

    pub fn get(&self, entry: &str) -> Option<usize> {
        self.index.get(entry).copied()
    }

    pub fn lookup(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
