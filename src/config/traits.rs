use crate::error::FeatsearchError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), FeatsearchError>;
}

pub(crate) fn check_unit_interval(name: &str, value: f64) -> Result<(), FeatsearchError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(FeatsearchError::Configuration(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}
