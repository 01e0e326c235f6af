//! In-process record store used by the test suite.
//!
//! Honors the same contract as the remote store: keyed upserts, filtered
//! deletes, ordered reads, and `SchemaMismatch` when an explicit projection
//! names a column the collection does not carry. Tests can also inject a
//! one-shot failure per operation to exercise workflow ordering.

use super::{Filter, RecordStore};
use async_trait::async_trait;
use backoffice_core::error::AppError;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Value>>,
    missing_columns: HashMap<String, HashSet<String>>,
    fail_next: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a store whose `collection` predates a migration: any
    /// explicit projection naming `column` fails with `SchemaMismatch`.
    pub fn mark_column_missing(&self, collection: &str, column: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .missing_columns
            .entry(collection.to_string())
            .or_default()
            .insert(column.to_string());
    }

    /// Fail the next call of the named operation ("fetch_all", "insert",
    /// "upsert" or "delete") with a transient error.
    pub fn fail_next(&self, operation: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_next
            .insert(operation.to_string());
    }

    /// Raw rows currently held for a collection.
    pub fn rows(&self, collection: &str) -> Vec<Value> {
        self.inner
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Seed rows directly, bypassing the ledgers.
    pub fn seed(&self, collection: &str, rows: Vec<Value>) {
        self.inner
            .lock()
            .unwrap()
            .collections
            .entry(collection.to_string())
            .or_default()
            .extend(rows);
    }

    fn take_injected_failure(inner: &mut Inner, operation: &str) -> Result<(), AppError> {
        if inner.fail_next.remove(operation) {
            return Err(AppError::Transient(anyhow::anyhow!(
                "injected {} failure",
                operation
            )));
        }
        Ok(())
    }
}

fn column_as_string(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, value) => column_as_string(row, column) == *value,
        Filter::In(column, values) => values.contains(&column_as_string(row, column)),
    }
}

fn same_key(a: &Value, b: &Value, key_columns: &[&str]) -> bool {
    key_columns
        .iter()
        .all(|col| column_as_string(a, col) == column_as_string(b, col))
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all(
        &self,
        collection: &str,
        select: &str,
        order_by: &str,
    ) -> Result<Vec<Value>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Self::take_injected_failure(&mut inner, "fetch_all")?;

        if select != "*" {
            if let Some(missing) = inner.missing_columns.get(collection) {
                for column in select.split(',').map(str::trim) {
                    if missing.contains(column) {
                        return Err(AppError::SchemaMismatch(anyhow::anyhow!(
                            "column {}.{} does not exist",
                            collection,
                            column
                        )));
                    }
                }
            }
        }

        let mut rows = inner
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();
        rows.sort_by_key(|row| column_as_string(row, order_by));
        Ok(rows)
    }

    async fn insert(&self, collection: &str, rows: Vec<Value>) -> Result<Vec<Value>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Self::take_injected_failure(&mut inner, "insert")?;

        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .extend(rows.clone());
        Ok(rows)
    }

    async fn upsert(
        &self,
        collection: &str,
        rows: Vec<Value>,
        conflict_key: &str,
    ) -> Result<Vec<Value>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Self::take_injected_failure(&mut inner, "upsert")?;

        let key_columns: Vec<&str> = conflict_key.split(',').map(str::trim).collect();
        let stored = inner
            .collections
            .entry(collection.to_string())
            .or_default();

        for row in &rows {
            match stored.iter_mut().find(|r| same_key(r, row, &key_columns)) {
                Some(existing) => *existing = row.clone(),
                None => stored.push(row.clone()),
            }
        }
        Ok(rows)
    }

    async fn delete(&self, collection: &str, filters: &[Filter]) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Self::take_injected_failure(&mut inner, "delete")?;

        let stored = inner
            .collections
            .entry(collection.to_string())
            .or_default();
        let before = stored.len();
        stored.retain(|row| !filters.iter().all(|f| matches_filter(row, f)));
        Ok((before - stored.len()) as u64)
    }
}
