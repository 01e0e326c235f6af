//! Order ledger operations.

use super::Backoffice;
use crate::models::Order;
use crate::store::collections;
use backoffice_core::error::AppError;
use chrono::NaiveDate;
use tracing::{info, instrument};
use uuid::Uuid;

impl Backoffice {
    #[instrument(skip(self))]
    pub async fn refresh_orders(&mut self) -> Result<(), AppError> {
        let rows = self
            .store
            .fetch_all(collections::ORDERS, "*", "date")
            .await?;
        self.orders = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    /// Planned quantity for a (customer, date), if an order exists.
    pub fn order_quantity(&self, customer_id: Uuid, date: NaiveDate) -> Option<f64> {
        self.orders
            .iter()
            .find(|o| o.customer_id == customer_id && o.date == date)
            .map(|o| o.quantity)
    }

    /// Record the planned quantity for a (customer, date), replacing any
    /// existing order for that key. Orders are advisory only; the approval
    /// workflow never touches them.
    #[instrument(skip(self), fields(customer_id = %customer_id, date = %date))]
    pub async fn upsert_order(
        &mut self,
        customer_id: Uuid,
        date: NaiveDate,
        quantity: f64,
    ) -> Result<Order, AppError> {
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

        let order = Order::new(customer_id, date, quantity);
        self.store
            .upsert(
                collections::ORDERS,
                vec![serde_json::to_value(&order)?],
                "customer_id,date",
            )
            .await?;

        match self
            .orders
            .iter_mut()
            .find(|o| o.customer_id == customer_id && o.date == date)
        {
            Some(existing) => *existing = order.clone(),
            None => self.orders.push(order.clone()),
        }

        info!(quantity, "Order recorded");
        Ok(order)
    }
}
