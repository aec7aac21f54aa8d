use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Failed to find list path..., list_path: {path}")]
    ListNotFound { path: String },

    #[error("Malformed list entry at line {line}: {content:?} (expected `vendor|product`)")]
    MalformedLine { line: usize, content: String },

    #[error("Failed to Connection..., url: {url}, err: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to Read Response..., url: {url}, err: {source}")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to GET request..., url: {url}, err: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Max retries exceeded for {url} (last status: {status}, attempts: {attempts})")]
    RetriesExhausted {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("Response from {url} is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value:?} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Comparison task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

/// Coarse grouping used to decide how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Connectivity,
    Timeout,
    Transport,
}

impl HarnessError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HarnessError::ListNotFound { .. }
            | HarnessError::MalformedLine { .. }
            | HarnessError::IoError(_)
            | HarnessError::ConfigError { .. }
            | HarnessError::InvalidConfigValueError { .. }
            | HarnessError::TomlError(_) => ErrorCategory::Configuration,
            HarnessError::Connection { .. } => ErrorCategory::Connectivity,
            HarnessError::Timeout { .. } => ErrorCategory::Timeout,
            HarnessError::Request { .. }
            | HarnessError::RetriesExhausted { .. }
            | HarnessError::InvalidJson { .. }
            | HarnessError::SerializationError(_)
            | HarnessError::TaskError(_) => ErrorCategory::Transport,
        }
    }

    /// A timeout only skips the affected item; everything else ends the run.
    pub fn is_fatal(&self) -> bool {
        self.category() != ErrorCategory::Timeout
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            1
        } else {
            0
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
