//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
///
/// These are caller mistakes and must never be retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A movement or adjustment quantity was not a positive integer.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A value failed validation (e.g. malformed item code).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found (domain-level).
    #[error("not found: {0}")]
    NotFound(String),

    /// An exit or decrement would drive stock negative. The operation is
    /// fully rejected; no state change.
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    /// An item code collides with an existing item (case-insensitive).
    #[error("duplicate item code: {0}")]
    DuplicateCode(String),

    /// A uniqueness conflict outside item codes (e.g. user email).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn insufficient_stock(available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            available,
            requested,
        }
    }

    pub fn duplicate_code(code: impl Into<String>) -> Self {
        Self::DuplicateCode(code.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
