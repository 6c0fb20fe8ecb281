//! Error types for timer registration and advancement

/// Error type for timer operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// Period was negative or not a number
    #[error("Invalid timer period: {0}")]
    InvalidPeriod(String),

    /// Repeating timer registered with a zero period
    #[error("Interval period must be greater than zero")]
    ZeroInterval,

    /// Update delta was negative or not a number
    #[error("Invalid update delta: {0}")]
    InvalidDelta(String),
}

/// Result type for timer operations
pub type TimerResult<T> = Result<T, TimerError>;
