pub mod traits;
pub mod evolution;
pub mod validation;
pub mod ml;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use validation::{ValidationConfig, FoldMethod};
pub use ml::{MLConfig, ClassifierConfig};
pub use traits::ConfigSection;
