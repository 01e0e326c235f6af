//! Delivery ledger operations (manual admin entry; the bulk path is the
//! approval workflow).

use super::billing::DateRange;
use super::Backoffice;
use crate::models::Delivery;
use crate::store::{collections, Filter};
use backoffice_core::error::AppError;
use chrono::NaiveDate;
use tracing::{info, instrument};
use uuid::Uuid;

impl Backoffice {
    #[instrument(skip(self))]
    pub async fn refresh_deliveries(&mut self) -> Result<(), AppError> {
        let rows = self
            .store
            .fetch_all(collections::DELIVERIES, "*", "date")
            .await?;
        self.deliveries = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    /// Record a billable delivery directly. Upserts on (customer, date):
    /// a manual correction overwrites whatever was there, approved or not.
    #[instrument(skip(self), fields(customer_id = %customer_id, date = %date))]
    pub async fn record_delivery(
        &mut self,
        customer_id: Uuid,
        date: NaiveDate,
        quantity: f64,
    ) -> Result<Delivery, AppError> {
        self.actor()?;
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "quantity must be non-negative"
            )));
        }
        if self.customer(customer_id).is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "customer {} not found",
                customer_id
            )));
        }

        let delivery = Delivery::new(customer_id, date, quantity);
        self.store
            .upsert(
                collections::DELIVERIES,
                vec![serde_json::to_value(&delivery)?],
                "customer_id,date",
            )
            .await?;
        self.merge_delivery(delivery.clone());

        info!(quantity, "Delivery recorded");
        Ok(delivery)
    }

    #[instrument(skip(self), fields(delivery_id = %id))]
    pub async fn delete_delivery(&mut self, id: Uuid) -> Result<(), AppError> {
        self.actor()?;
        let removed = self
            .store
            .delete(collections::DELIVERIES, &[Filter::eq("id", id)])
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "delivery {} not found",
                id
            )));
        }
        self.deliveries.retain(|d| d.id != id);
        info!("Delivery deleted");
        Ok(())
    }

    pub fn delivery_quantity(&self, customer_id: Uuid, date: NaiveDate) -> Option<f64> {
        self.deliveries
            .iter()
            .find(|d| d.customer_id == customer_id && d.date == date)
            .map(|d| d.quantity)
    }

    pub fn deliveries_in(&self, range: DateRange) -> Vec<&Delivery> {
        self.deliveries
            .iter()
            .filter(|d| range.contains(d.date))
            .collect()
    }

    /// Replace-or-push by (customer, date), the delivery ledger's key.
    pub(crate) fn merge_delivery(&mut self, delivery: Delivery) {
        match self
            .deliveries
            .iter_mut()
            .find(|d| d.customer_id == delivery.customer_id && d.date == delivery.date)
        {
            Some(existing) => *existing = delivery,
            None => self.deliveries.push(delivery),
        }
    }
}
