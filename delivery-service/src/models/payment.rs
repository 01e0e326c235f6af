//! Payment model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Money received from a customer on a date. No uniqueness on (customer,
/// date); several collections in one day are legal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub date: NaiveDate,
    pub amount: f64,
}

impl Payment {
    pub fn new(customer_id: Uuid, date: NaiveDate, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            date,
            amount,
        }
    }
}
