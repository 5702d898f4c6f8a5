use thiserror::Error;

/// Centralized error types for the application
///
/// All errors are per-event: handlers log them, answer the user where it
/// makes sense, and the process keeps running. Uses `thiserror` for
/// automatic conversion and display formatting.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad user input: the user is re-prompted with the carried message
    /// and no state changes
    #[error("Validation error: {0}")]
    Validation(String),

    /// A second session for a user who already has one in flight
    #[error("session already active")]
    AlreadyActive,

    /// A free-text answer arrived with no questionnaire in progress
    #[error("no active session")]
    NoActiveSession,

    /// Ledger lookup miss (unknown payload or transaction id)
    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = AppError::TransactionNotFound("tx-123".to_string());
        assert!(err.to_string().contains("tx-123"));

        let err = AppError::Validation("too long".to_string());
        assert!(err.to_string().contains("too long"));
    }
}
