//! Pending and approved delivery models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff-submitted actual delivery awaiting admin approval. At most one
/// row per (customer, date); a resubmission upserts over the prior value.
/// Deleted once approved, never left dangling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDelivery {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub date: NaiveDate,
    pub quantity: f64,
    /// Submitting staff principal, kept for audit.
    pub created_by: Option<Uuid>,
}

impl PendingDelivery {
    pub fn new(
        customer_id: Uuid,
        date: NaiveDate,
        quantity: f64,
        created_by: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            date,
            quantity,
            created_by,
        }
    }
}

/// Approved, billable delivery fact. At most one row per (customer, date);
/// the sole input to billing for that day, whether entered manually by an
/// admin or promoted from the pending queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub date: NaiveDate,
    pub quantity: f64,
}

impl Delivery {
    pub fn new(customer_id: Uuid, date: NaiveDate, quantity: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            date,
            quantity,
        }
    }
}

impl From<&PendingDelivery> for Delivery {
    fn from(pending: &PendingDelivery) -> Self {
        Self::new(pending.customer_id, pending.date, pending.quantity)
    }
}
