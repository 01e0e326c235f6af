//! Record store adapter: generic paginated reads and keyed bulk writes
//! against named collections.
//!
//! The persistence engine itself is an external collaborator; everything
//! here speaks loosely-typed rows (`serde_json::Value`) that the ledgers
//! normalize into typed models immediately after load.

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use backoffice_core::error::AppError;
use serde_json::Value;

/// Collection names as provisioned in the store.
pub mod collections {
    pub const CUSTOMERS: &str = "customers";
    pub const ORDERS: &str = "orders";
    pub const PENDING_DELIVERIES: &str = "pending_deliveries";
    pub const DELIVERIES: &str = "deliveries";
    pub const PAYMENTS: &str = "payments";
}

/// Row filter for deletes.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Column equals value.
    Eq(&'static str, String),
    /// Column is one of the values.
    In(&'static str, Vec<String>),
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self::Eq(column, value.to_string())
    }

    pub fn is_in<I, T>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self::In(column, values.into_iter().map(|v| v.to_string()).collect())
    }
}

/// The four operations the core consumes from the store collaborator.
///
/// Every call is an independently retryable network operation; no retry
/// policy lives here. Failures surface as typed [`AppError`]s and multi-row
/// mutations never partially apply without the error saying so.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every row of a collection, transparently paginated, ordered
    /// ascending by `order_by`. `select` is a comma-separated column list
    /// or `"*"`; a projection naming a column the store does not have
    /// fails with [`AppError::SchemaMismatch`].
    async fn fetch_all(
        &self,
        collection: &str,
        select: &str,
        order_by: &str,
    ) -> Result<Vec<Value>, AppError>;

    /// Plain insert. Uniqueness violations surface as [`AppError::Conflict`].
    async fn insert(&self, collection: &str, rows: Vec<Value>) -> Result<Vec<Value>, AppError>;

    /// Bulk upsert keyed by `conflict_key` (one column or a comma-separated
    /// composite such as `"customer_id,date"`). Existing rows for a key are
    /// overwritten.
    async fn upsert(
        &self,
        collection: &str,
        rows: Vec<Value>,
        conflict_key: &str,
    ) -> Result<Vec<Value>, AppError>;

    /// Delete rows matching all filters; returns how many went away.
    async fn delete(&self, collection: &str, filters: &[Filter]) -> Result<u64, AppError>;
}
