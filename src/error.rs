use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// Returned by [`crate::timeline::Timeline::create`] when no container was supplied.
    #[error("no container provided")]
    MissingContainer,
    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },
    #[error("event '{id}' ends before it starts")]
    InvertedSpan { id: String },
    #[error("duplicate event id '{id}'")]
    DuplicateId { id: String },
    #[error("failed to parse events: {message}")]
    Parse { message: String },
    #[error("granularity table is empty")]
    EmptyGranularities,
    #[error("granularity #{index} is invalid: {reason}")]
    InvalidGranularity { index: usize, reason: String },
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
