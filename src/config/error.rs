use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("unknown environment adapter: {0}")]
    UnknownEnvironmentAdapter(String),

    #[error("no such member: {0}")]
    NoSuchMember(String),

    #[error("key '{key}' is already declared in namespace '{namespace}'")]
    DuplicateKey { namespace: String, key: String },

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("invalid lookup path: {0}")]
    InvalidPath(String),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl ConfigError {
    /// Wraps an error raised inside a setting body so it can leave the body via `?`.
    pub fn custom(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Custom(error.into())
    }
}
