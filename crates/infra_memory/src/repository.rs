//! Version-checked in-memory invoice store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{InvoiceId, PortError};
use domain_invoicing::{Invoice, InvoiceRepository};

/// In-memory invoice repository with optimistic concurrency
///
/// Saves are accepted only when the incoming aggregate's version is ahead of
/// the stored one; a stale save returns `PortError::Conflict` for the caller
/// to reload and retry. The lock scope is the whole map, which is adequate
/// for a test double; a real adapter scopes exclusion per invoice identity.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceRepository {
    invoices: RwLock<HashMap<InvoiceId, Invoice>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored invoices
    pub async fn len(&self) -> usize {
        self.invoices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.invoices.read().await.is_empty()
    }

    /// Snapshot of all stored invoices, for rollup-style reductions
    pub async fn all(&self) -> Vec<Invoice> {
        self.invoices.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn load(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.invoices
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    async fn save(&self, invoice: &Invoice) -> Result<(), PortError> {
        let mut invoices = self.invoices.write().await;

        if let Some(stored) = invoices.get(&invoice.id()) {
            if stored.version() >= invoice.version() {
                debug!(
                    invoice_id = %invoice.id(),
                    stored_version = stored.version(),
                    incoming_version = invoice.version(),
                    "rejecting stale save"
                );
                return Err(PortError::conflict(format!(
                    "invoice {} at version {}, save carried version {}",
                    invoice.id(),
                    stored.version(),
                    invoice.version()
                )));
            }
        }

        debug!(invoice_id = %invoice.id(), version = invoice.version(), "saving invoice");
        invoices.insert(invoice.id(), invoice.clone());
        Ok(())
    }
}
