//! Error types for Fedcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FedcastError>;

#[derive(Error, Debug)]
pub enum FedcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown author: no account with id {0}")]
    UnknownAuthor(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FedcastError {
    /// Returns the appropriate exit code for this error
    ///
    /// Unknown authors get a distinct code because they indicate a
    /// data-integrity problem upstream, not a transient store failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            FedcastError::InvalidInput(_) => 3,
            FedcastError::UnknownAuthor(_) => 2,
            FedcastError::Config(_) => 1,
            FedcastError::Store(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Failures of the underlying account/relationship/status store.
///
/// Any of these aborts an in-flight resolution: a partial delivery plan is
/// worse than an explicit failure, so the resolver never absorbs them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store query failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
