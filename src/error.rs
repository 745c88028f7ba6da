use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatsearchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Failed while {context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported model bundle: {0}")]
    UnsupportedBundle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),
}

impl FeatsearchError {
    pub fn persistence(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Persistence {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeatsearchError>;
