//! Approval workflow: batch promotion of a date's pending deliveries into
//! the delivery ledger.

use super::metrics::DELIVERIES_APPROVED;
use super::Backoffice;
use crate::models::{Delivery, PendingDelivery};
use crate::store::{collections, Filter};
use backoffice_core::error::AppError;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{error, info, instrument};
use uuid::Uuid;

impl Backoffice {
    /// Approve everything pending for `date`, all-or-nothing for the queue
    /// contents read at the start of the call.
    ///
    /// The store gives no transaction across collections, so the order is
    /// fixed: the delivery upsert lands first and the pending delete runs
    /// only afterwards. A failure between the two leaves the submission
    /// both approved and queued, which re-running repairs; the reverse
    /// order could silently lose submissions. The delete is scoped to the
    /// exact row ids read here, so a submission landing mid-approval stays
    /// queued for the next run instead of being swept away with the date.
    ///
    /// Returns the number of deliveries approved; a date with nothing
    /// pending is a 0-count no-op.
    #[instrument(skip(self), fields(date = %date))]
    pub async fn approve_date(&mut self, date: NaiveDate) -> Result<usize, AppError> {
        self.actor()?;

        // Fresh read: the mirror may trail other staff sessions.
        let rows = self
            .store
            .fetch_all(collections::PENDING_DELIVERIES, "*", "date")
            .await?;
        let queue: Vec<PendingDelivery> = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;
        let batch: Vec<PendingDelivery> =
            queue.iter().filter(|p| p.date == date).cloned().collect();
        self.pending = queue;

        if batch.is_empty() {
            info!("Nothing pending for date");
            return Ok(0);
        }

        let approved_ids: Vec<Uuid> = batch.iter().map(|p| p.id).collect();
        let deliveries: Vec<Delivery> = batch.iter().map(Delivery::from).collect();
        let delivery_rows = deliveries
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        if let Err(err) = self
            .store
            .upsert(collections::DELIVERIES, delivery_rows, "customer_id,date")
            .await
        {
            DELIVERIES_APPROVED.with_label_values(&["error"]).inc();
            error!(error = %err, "Delivery upsert failed, queue left untouched");
            return Err(err);
        }

        // Deliveries are durable from here on, whatever the delete does.
        for delivery in deliveries {
            self.merge_delivery(delivery);
        }

        let delete_result = self
            .store
            .delete(
                collections::PENDING_DELIVERIES,
                &[Filter::is_in("id", &approved_ids)],
            )
            .await;

        match delete_result {
            Ok(_) => {
                let ids: HashSet<Uuid> = approved_ids.into_iter().collect();
                self.pending.retain(|p| !ids.contains(&p.id));
                DELIVERIES_APPROVED
                    .with_label_values(&["ok"])
                    .inc_by(batch.len() as f64);
                info!(count = batch.len(), "Pending deliveries approved");
                Ok(batch.len())
            }
            Err(err) => {
                DELIVERIES_APPROVED.with_label_values(&["error"]).inc();
                error!(
                    error = %err,
                    "Pending cleanup failed after deliveries were written; re-run approval for this date"
                );
                Err(err)
            }
        }
    }
}
