//! Ports for external collaborators
//!
//! The ledger core is a pure, synchronous computation over one invoice's
//! in-memory state. Everything stateful lives behind a port: the storage
//! collaborator loads and saves aggregates at operation boundaries, and the
//! clock supplies the current time for timestamp stamping and overdue
//! evaluation. Adapters implement these traits; the core never holds a
//! connection and never blocks on I/O.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// A unified error type all port implementations use, so error handling is
/// consistent regardless of the adapter behind the port.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A concurrent write was detected by the storage collaborator
    ///
    /// Surfaced to the caller for retry; never retried inside the core.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// A validation error occurred at the port boundary
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// An internal adapter error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if this error indicates a concurrent-write conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Clock port supplying the current time
///
/// Injected wherever the domain stamps timestamps or evaluates overdue
/// status, so tests can pin time deterministically.
pub trait Clock: Send + Sync {
    /// Returns the current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock pinned to a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
