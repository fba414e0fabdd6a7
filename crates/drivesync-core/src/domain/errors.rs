//! Domain error types
//!
//! This module defines error types specific to domain operations: logical path
//! validation and construction of changes that would violate the
//! reconciliation invariants.
//!
//! Note that classification itself never fails. Unreadable content and
//! malformed remote timestamps are converted into conservative decisions
//! instead of errors.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote path format
    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    /// A change was requested with neither a source nor a destination
    #[error("Change at {0} has neither source nor destination")]
    EmptyChange(String),
}
