//! Genetic search over feature-extraction templates and classifier
//! hyperparameters for sequence labeling, scored by cross-validated F1.

pub mod config;
pub mod encoding;
pub mod engines;
pub mod error;
pub mod features;
pub mod ml;
pub mod model;
pub mod types;

pub use error::{FeatsearchError, Result};
pub use model::{ModelBundle, Phenotype};
pub use types::{
    instances_from_corpus, CategoricalFeature, Element, Instance, LabeledSequence, Sequence,
    SparseInstance, SparseVector,
};
