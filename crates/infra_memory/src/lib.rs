//! In-memory adapter for the invoice repository port
//!
//! Suitable for tests and single-process deployments. Persistence proper
//! (SQL, documents) is an external concern; this adapter exists so the
//! load/save contract, including optimistic-concurrency conflicts, can be
//! exercised without a database.

pub mod repository;

pub use repository::InMemoryInvoiceRepository;
