use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },

    #[error("source-control authentication failed: {0}")]
    Auth(String),

    #[error("repository not found: {0}")]
    RepoNotFound(String),

    #[error("stack '{stack}' has no output '{key}'")]
    MissingOutput { stack: String, key: String },

    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    #[error("failed to delete stack '{stack}'")]
    DeleteFailed {
        stack: String,
        #[source]
        source: Box<SweepError>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl SweepError {
    pub fn service(operation: &'static str, message: impl Into<String>) -> Self {
        SweepError::Service {
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
