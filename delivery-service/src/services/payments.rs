//! Payment ledger operations.

use super::billing::DateRange;
use super::Backoffice;
use crate::models::Payment;
use crate::store::{collections, Filter};
use backoffice_core::error::AppError;
use chrono::NaiveDate;
use tracing::{info, instrument};
use uuid::Uuid;

impl Backoffice {
    #[instrument(skip(self))]
    pub async fn refresh_payments(&mut self) -> Result<(), AppError> {
        let rows = self
            .store
            .fetch_all(collections::PAYMENTS, "*", "date")
            .await?;
        self.payments = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    /// Record money received. Plain insert: several payments on one day
    /// are legal.
    #[instrument(skip(self), fields(customer_id = %customer_id, date = %date))]
    pub async fn record_payment(
        &mut self,
        customer_id: Uuid,
        date: NaiveDate,
        amount: f64,
    ) -> Result<Payment, AppError> {
        self.actor()?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "amount must be positive"
            )));
        }
        if self.customer(customer_id).is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "customer {} not found",
                customer_id
            )));
        }

        let payment = Payment::new(customer_id, date, amount);
        self.store
            .insert(collections::PAYMENTS, vec![serde_json::to_value(&payment)?])
            .await?;
        self.payments.push(payment.clone());

        info!(amount, "Payment recorded");
        Ok(payment)
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn delete_payment(&mut self, id: Uuid) -> Result<(), AppError> {
        self.actor()?;
        let removed = self
            .store
            .delete(collections::PAYMENTS, &[Filter::eq("id", id)])
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "payment {} not found",
                id
            )));
        }
        self.payments.retain(|p| p.id != id);
        info!("Payment deleted");
        Ok(())
    }

    pub fn payments_in(&self, range: DateRange) -> Vec<&Payment> {
        self.payments
            .iter()
            .filter(|p| range.contains(p.date))
            .collect()
    }
}
