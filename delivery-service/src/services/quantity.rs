//! Default-quantity resolution for delivery-entry screens.

use super::Backoffice;
use chrono::NaiveDate;
use uuid::Uuid;

/// Quantity to prefill for a (customer, date), strict precedence: an
/// unsaved staff draft, else the pending value, else the order value, else
/// the customer default. Pure lookup; approved deliveries are deliberately
/// not in the chain (delivery-aware screens read the delivery row itself).
pub fn resolve_quantity(
    draft: Option<f64>,
    pending: Option<f64>,
    order: Option<f64>,
    default_quantity: f64,
) -> f64 {
    draft
        .or(pending)
        .or(order)
        .unwrap_or(default_quantity)
}

impl Backoffice {
    /// [`resolve_quantity`] over the session mirrors. `None` when the
    /// customer is unknown.
    pub fn display_quantity(
        &self,
        customer_id: Uuid,
        date: NaiveDate,
        draft: Option<f64>,
    ) -> Option<f64> {
        let customer = self.customer(customer_id)?;
        Some(resolve_quantity(
            draft,
            self.pending_quantity(customer_id, date),
            self.order_quantity(customer_id, date),
            customer.default_quantity,
        ))
    }
}
