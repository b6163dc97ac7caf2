use thiserror::Error;

/// Result type for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Errors raised while building an assistant.
///
/// Resolving a message never fails; these only surface while loading or validating configuration.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error while reading a config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for the expected shape
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AssistantError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
