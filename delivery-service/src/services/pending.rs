//! Pending delivery queue operations.

use super::Backoffice;
use crate::models::PendingDelivery;
use crate::store::collections;
use backoffice_core::error::AppError;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{info, instrument};
use uuid::Uuid;

impl Backoffice {
    #[instrument(skip(self))]
    pub async fn refresh_pending(&mut self) -> Result<(), AppError> {
        let rows = self
            .store
            .fetch_all(collections::PENDING_DELIVERIES, "*", "date")
            .await?;
        self.pending = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    /// Submit a date's worth of actuals. Each entry upserts its
    /// (customer, date) key: customers included in the batch overwrite any
    /// prior pending value, customers left out keep theirs. Submissions
    /// are attributed to the acting principal.
    #[instrument(skip(self, entries), fields(date = %date, entry_count = entries.len()))]
    pub async fn submit_batch(
        &mut self,
        date: NaiveDate,
        entries: &[(Uuid, f64)],
    ) -> Result<usize, AppError> {
        let submitted_by = self.actor()?.user_id;

        for (customer_id, quantity) in entries {
            if !quantity.is_finite() || *quantity < 0.0 {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "quantity for customer {} must be non-negative",
                    customer_id
                )));
            }
        }

        if entries.is_empty() {
            return Ok(0);
        }

        let batch: Vec<PendingDelivery> = entries
            .iter()
            .map(|(customer_id, quantity)| {
                PendingDelivery::new(*customer_id, date, *quantity, Some(submitted_by))
            })
            .collect();

        let rows = batch
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.store
            .upsert(collections::PENDING_DELIVERIES, rows, "customer_id,date")
            .await?;

        for entry in batch {
            match self
                .pending
                .iter_mut()
                .find(|p| p.customer_id == entry.customer_id && p.date == entry.date)
            {
                Some(existing) => *existing = entry,
                None => self.pending.push(entry),
            }
        }

        info!(count = entries.len(), "Pending deliveries submitted");
        Ok(entries.len())
    }

    /// Distinct dates awaiting approval, each with its submission count,
    /// oldest first.
    pub fn pending_dates(&self) -> Vec<(NaiveDate, usize)> {
        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for entry in &self.pending {
            *counts.entry(entry.date).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }

    pub fn pending_for_date(&self, date: NaiveDate) -> Vec<&PendingDelivery> {
        self.pending.iter().filter(|p| p.date == date).collect()
    }

    pub fn pending_quantity(&self, customer_id: Uuid, date: NaiveDate) -> Option<f64> {
        self.pending
            .iter()
            .find(|p| p.customer_id == customer_id && p.date == date)
            .map(|p| p.quantity)
    }
}
