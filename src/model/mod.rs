pub mod bundle;
pub mod phenotype;

pub use bundle::{ModelBundle, FORMAT_VERSION};
pub use phenotype::Phenotype;
