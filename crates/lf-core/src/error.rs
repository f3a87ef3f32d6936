//! # AppError
//!
//! Centralized error handling for the lost-and-found service.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all lf-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Item, User)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., missing field, undecodable image)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Security/Auth failure (e.g., wrong password)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (e.g., DB down, blob store unreadable)
    #[error("internal service error: {0}")]
    Internal(String),

    /// Resource already exists (e.g., duplicate email)
    #[error("conflict: {0}")]
    Conflict(String),
}

/// A specialized Result type for lost-and-found logic.
pub type Result<T> = std::result::Result<T, AppError>;
