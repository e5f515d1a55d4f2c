//! Error types
//!
//! - **ServiceError**: failures talking to the weather and routing providers
//! - **RepositoryError**: failures reading or writing persisted records
//! - **PipelineError**: what a caller of the fire disaster pipeline sees

use thiserror::Error;

use crate::pipeline::PipelineStage;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} API key is not configured")]
    NotConfigured(&'static str),
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream API error: {0}")]
    Upstream(String),
    #[error("no routes found between the specified locations")]
    NoRoute,
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("max retries exceeded after {attempts} attempts: {last}")]
    MaxRetriesExceeded { attempts: u32, last: String },
}

impl ServiceError {
    /// Timeouts and connection failures are worth another attempt; everything
    /// else will fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Timeout | ServiceError::Request(_))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_decode() {
            ServiceError::Decode(err.without_url().to_string())
        } else if let Some(status) = err.status() {
            ServiceError::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            // without_url keeps API keys passed as query parameters out of messages
            ServiceError::Request(err.without_url().to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("invalid value in column {column}: {message}")]
    InvalidValue { column: &'static str, message: String },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Repository(RepositoryError),
    #[error("external service error: {0}")]
    External(#[from] ServiceError),
    #[error("pipeline failed during {stage}: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<PipelineError>,
    },
}

impl From<RepositoryError> for PipelineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                PipelineError::NotFound(format!("{} {}", entity, id))
            }
            other => PipelineError::Repository(other),
        }
    }
}

impl PipelineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Tags an error with the stage it escaped from. Already-tagged errors keep
    /// their original stage.
    pub fn at_stage(self, stage: PipelineStage) -> Self {
        match self {
            PipelineError::Stage { .. } | PipelineError::InvalidInput(_) => self,
            other => PipelineError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Validation failures are the caller's fault (4xx); everything else is ours (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::InvalidInput(_))
    }

    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
