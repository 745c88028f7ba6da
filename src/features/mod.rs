pub mod emitters;
pub mod extractors;
pub mod registry;
pub mod selectors;

pub use emitters::FeatureEmitter;
pub use extractors::{ListExtractor, StringFunction, ValueExtractor};
pub use registry::{TemplateGroup, TemplateRegistry};
pub use selectors::{ContextSelection, ContextSelector, LabelFilter};
