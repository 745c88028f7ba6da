use crate::types::{Element, NONE_VALUE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pure string transforms applied by [`ValueExtractor::Transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fn", content = "n", rename_all = "snake_case")]
pub enum StringFunction {
    Lowercase,
    Uppercase,
    Trim,
    Prefix(usize),
    Suffix(usize),
}

impl StringFunction {
    pub fn apply(&self, value: &str) -> String {
        match self {
            Self::Lowercase => value.to_lowercase(),
            Self::Uppercase => value.to_uppercase(),
            Self::Trim => value.trim().to_string(),
            Self::Prefix(n) => value.chars().take(*n).collect(),
            Self::Suffix(n) => {
                let count = value.chars().count();
                value.chars().skip(count.saturating_sub(*n)).collect()
            }
        }
    }

    fn id(&self) -> String {
        match self {
            Self::Lowercase => "lc".to_string(),
            Self::Uppercase => "uc".to_string(),
            Self::Trim => "trim".to_string(),
            Self::Prefix(n) => format!("pre{}", n),
            Self::Suffix(n) => format!("suf{}", n),
        }
    }
}

/// Single-valued extractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueExtractor {
    /// First present value among `keys`, else the fallback, else `<NONE>`.
    Lookup {
        keys: Vec<String>,
        #[serde(default)]
        fallback: Option<Box<ValueExtractor>>,
    },
    Transform {
        base: Box<ValueExtractor>,
        functions: Vec<StringFunction>,
    },
    Concat {
        parts: Vec<ValueExtractor>,
        delimiter: String,
    },
    /// Rewrites the base value through `table`; unmapped values pass through.
    Mapping {
        name: String,
        base: Box<ValueExtractor>,
        table: BTreeMap<String, String>,
    },
}

impl ValueExtractor {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Lookup {
            keys: vec![key.into()],
            fallback: None,
        }
    }

    pub fn lookup<I, S>(keys: I, fallback: Option<ValueExtractor>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Lookup {
            keys: keys.into_iter().map(Into::into).collect(),
            fallback: fallback.map(Box::new),
        }
    }

    pub fn transform(base: ValueExtractor, functions: Vec<StringFunction>) -> Self {
        Self::Transform {
            base: Box::new(base),
            functions,
        }
    }

    pub fn concat(parts: Vec<ValueExtractor>, delimiter: impl Into<String>) -> Self {
        Self::Concat {
            parts,
            delimiter: delimiter.into(),
        }
    }

    pub fn mapping(
        name: impl Into<String>,
        base: ValueExtractor,
        table: BTreeMap<String, String>,
    ) -> Self {
        Self::Mapping {
            name: name.into(),
            base: Box::new(base),
            table,
        }
    }

    pub fn extract(&self, element: &Element) -> String {
        match self {
            Self::Lookup { keys, fallback } => keys
                .iter()
                .find_map(|k| element.feature(k))
                .map(str::to_string)
                .unwrap_or_else(|| match fallback {
                    Some(f) => f.extract(element),
                    None => NONE_VALUE.to_string(),
                }),
            Self::Transform { base, functions } => functions
                .iter()
                .fold(base.extract(element), |value, f| f.apply(&value)),
            Self::Concat { parts, delimiter } => parts
                .iter()
                .map(|p| p.extract(element))
                .collect::<Vec<_>>()
                .join(delimiter),
            Self::Mapping { base, table, .. } => {
                let value = base.extract(element);
                table.get(&value).cloned().unwrap_or(value)
            }
        }
    }

    pub fn id(&self) -> String {
        match self {
            Self::Lookup { keys, fallback } => {
                let mut id = keys.join("|");
                if let Some(f) = fallback {
                    id.push('|');
                    id.push_str(&f.id());
                }
                id
            }
            Self::Transform { base, functions } => {
                let mut id = base.id();
                for f in functions {
                    id.push(':');
                    id.push_str(&f.id());
                }
                id
            }
            Self::Concat { parts, delimiter } => parts
                .iter()
                .map(ValueExtractor::id)
                .collect::<Vec<_>>()
                .join(delimiter),
            Self::Mapping { name, base, .. } => format!("{}({})", name, base.id()),
        }
    }
}

/// Multi-valued extractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListExtractor {
    /// All list values found across `keys`; scalar values count as
    /// one-element lists.
    Lookup { keys: Vec<String> },
    /// Appends the joined `suffix` values to every base value.
    Concat {
        base: Box<ListExtractor>,
        suffix: Vec<ValueExtractor>,
        delimiter: String,
    },
}

impl ListExtractor {
    pub fn lookup<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Lookup {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn concat(
        base: ListExtractor,
        suffix: Vec<ValueExtractor>,
        delimiter: impl Into<String>,
    ) -> Self {
        Self::Concat {
            base: Box::new(base),
            suffix,
            delimiter: delimiter.into(),
        }
    }

    pub fn extract(&self, element: &Element) -> Vec<String> {
        match self {
            Self::Lookup { keys } => {
                let mut values = Vec::new();
                for key in keys {
                    if let Some(list) = element.list_feature(key) {
                        values.extend(list.iter().cloned());
                    } else if let Some(value) = element.feature(key) {
                        values.push(value.to_string());
                    }
                }
                values
            }
            Self::Concat {
                base,
                suffix,
                delimiter,
            } => {
                let tail = suffix
                    .iter()
                    .map(|s| s.extract(element))
                    .collect::<Vec<_>>()
                    .join(delimiter);
                base.extract(element)
                    .into_iter()
                    .map(|value| format!("{}{}{}", value, delimiter, tail))
                    .collect()
            }
        }
    }

    pub fn id(&self) -> String {
        match self {
            Self::Lookup { keys } => format!("list({})", keys.join("|")),
            Self::Concat {
                base,
                suffix,
                delimiter,
            } => {
                let mut parts = vec![base.id()];
                parts.extend(suffix.iter().map(ValueExtractor::id));
                parts.join(delimiter)
            }
        }
    }
}
