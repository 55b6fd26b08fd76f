//! Error types for Wordcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WordcastError>;

#[derive(Error, Debug)]
pub enum WordcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("History store error: {0}")]
    Store(#[from] StoreError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl WordcastError {
    /// Returns the appropriate exit code for this error
    ///
    /// Only configuration problems make a run fail; everything else is
    /// converted into a logged run outcome before it reaches `main`.
    pub fn exit_code(&self) -> i32 {
        match self {
            WordcastError::Config(ConfigError::MissingField(_)) => 2,
            WordcastError::Config(_) => 1,
            WordcastError::Store(_) => 1,
            WordcastError::Generator(_) => 1,
            WordcastError::Platform(_) => 1,
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

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed history content: {0}")]
    Malformed(String),

    #[error("Remote store request failed: {0}")]
    Remote(String),

    #[error("Remote store rejected the update ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Failures talking to the generative-text service
///
/// Every variant is transient from the generator's point of view: it is
/// logged, the retry delay is applied and the next attempt proceeds.
#[derive(Error, Debug, Clone)]
pub enum GeneratorError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}
