//! # AppError
//!
//! Centralized error handling for the briefing feed.
//! Store failures are carried through untouched; malformed record fields
//! never reach this type because entity decoding degrades to defaults.

use thiserror::Error;

/// The primary error type for all sb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// A request that can never be served (e.g., a page size of zero)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Connectivity or permission failure reported by the document store
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// A specialized Result type for feed logic.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_keeps_source_message() {
        let err: AppError = anyhow::anyhow!("permission denied").into();
        assert_eq!(err.to_string(), "store error: permission denied");
    }

    #[test]
    fn validation_error_display() {
        let err = AppError::ValidationError("limit must be positive".into());
        assert_eq!(err.to_string(), "validation error: limit must be positive");
    }
}
