pub mod cross_validation;
pub mod metrics;
pub mod splitters;

pub use cross_validation::{CrossValidationReport, CrossValidator, FoldModel};
pub use metrics::{Evaluation, LabelCounts};
pub use splitters::{Fold, FoldSplitter, KFoldSplitter, Splitter, StratifiedSplitter};
