pub mod encoder;
pub mod vocabulary;

pub use encoder::{EncodedDataset, FeatureEncoder};
pub use vocabulary::Vocabulary;
