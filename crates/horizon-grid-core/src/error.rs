//! Error types for Horizon Grid core primitives.

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("Invalid or disconnected connection ID")]
    InvalidConnection,
}

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The timer handle was superseded by a later request or already fired.
    #[error("Timer handle is stale: it was superseded, cancelled, or already fired")]
    StaleHandle,
}
