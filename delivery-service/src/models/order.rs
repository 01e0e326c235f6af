//! Order model: the planned delivery for a customer on a date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription intent for one (customer, date). At most one row per key;
/// purely advisory and never billed directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub date: NaiveDate,
    pub quantity: f64,
}

impl Order {
    pub fn new(customer_id: Uuid, date: NaiveDate, quantity: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            date,
            quantity,
        }
    }
}
