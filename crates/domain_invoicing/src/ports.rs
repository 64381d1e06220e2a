//! Ports to external collaborators
//!
//! The storage collaborator is called at operation boundaries only: load the
//! aggregate, mutate it in memory, save it atomically. Each mutating
//! operation must run under an exclusive lock or optimistic-concurrency
//! check scoped to one invoice identity; the adapter signals a concurrent
//! write with `PortError::Conflict`, which the caller retries; the core
//! never retries internally.

use async_trait::async_trait;

use core_kernel::{InvoiceId, PortError};

use crate::invoice::Invoice;

/// Load/save collaborator for invoice aggregates
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Loads an invoice aggregate
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` when no invoice has the given id.
    async fn load(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Persists an invoice aggregate, root record plus the four owned child
    /// collections, atomically
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` when the stored version has moved past the
    /// version the aggregate was loaded at.
    async fn save(&self, invoice: &Invoice) -> Result<(), PortError>;
}
