use super::{
    evolution::EvolutionConfig, ml::MLConfig, traits::ConfigSection,
    validation::ValidationConfig,
};
use crate::error::FeatsearchError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Prefix for environment overrides, e.g. `FEATSEARCH__EVOLUTION__POPULATION_SIZE=50`.
pub const ENV_PREFIX: &str = "FEATSEARCH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub validation: ValidationConfig,
    pub ml: MLConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), FeatsearchError> {
        validate_section(&self.evolution)?;
        validate_section(&self.validation)?;
        validate_section(&self.ml)?;
        Ok(())
    }
}

fn validate_section<S: ConfigSection>(section: &S) -> Result<(), FeatsearchError> {
    section.validate().map_err(|e| match e {
        FeatsearchError::Configuration(msg) => {
            FeatsearchError::Configuration(format!("[{}] {}", S::section_name(), msg))
        }
        other => other,
    })
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Loads a TOML or JSON file (format from the extension), layered under
    /// environment overrides, and validates it before replacing the current config.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), FeatsearchError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    /// Defaults overridden by environment variables only.
    pub fn load_from_env(&self) -> Result<(), FeatsearchError> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), FeatsearchError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| FeatsearchError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies `f` to a copy and commits it only if the result validates.
    pub fn update<F>(&self, f: F) -> Result<(), FeatsearchError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = config.clone();
        f(&mut updated);
        updated.validate()?;
        *config = updated;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_update_is_not_committed() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.evolution.population_size = 1);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("[evolution]"));
        assert_eq!(manager.get().evolution.population_size, 20);
    }

    #[test]
    fn save_then_load_round_trips() {
        let name = format!("featsearch-config-{}.toml", std::process::id());
        let path = std::env::temp_dir().join(name);
        let manager = ConfigManager::new();
        manager.update(|c| c.validation.num_folds = 3).unwrap();
        manager.save_to_file(&path).unwrap();

        let loaded = ConfigManager::new();
        loaded.load_from_file(&path).unwrap();
        assert_eq!(loaded.get().validation.num_folds, 3);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let name = format!("featsearch-partial-{}.toml", std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, "[evolution]\npopulation_size = 8\n").unwrap();

        let manager = ConfigManager::new();
        manager.load_from_file(&path).unwrap();
        let config = manager.get();
        assert_eq!(config.evolution.population_size, 8);
        assert_eq!(config.validation.num_folds, 5);

        std::fs::remove_file(path).ok();
    }
}
