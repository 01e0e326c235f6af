//! Back-office session: the store handle, the acting principal and owned
//! in-memory mirrors of the five collections.
//!
//! All writes go through the methods on [`Backoffice`]; presentation code
//! only reads the accessor slices, so the mirrors and the store cannot
//! diverge beyond the documented approval race.

pub mod approval;
pub mod billing;
pub mod customers;
pub mod deliveries;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod pending;
pub mod quantity;

pub use billing::{BillStatus, CustomerBalance, DateRange, PeriodSummary, BALANCE_EPSILON};
pub use customers::ImportReport;

use crate::models::{Customer, Delivery, Order, Payment, PendingDelivery, SchemaMode};
use crate::store::RecordStore;
use backoffice_core::auth::Principal;
use backoffice_core::error::AppError;
use std::sync::Arc;

pub struct Backoffice {
    store: Arc<dyn RecordStore>,
    principal: Option<Principal>,
    customers: Vec<Customer>,
    schema_mode: SchemaMode,
    orders: Vec<Order>,
    pending: Vec<PendingDelivery>,
    deliveries: Vec<Delivery>,
    payments: Vec<Payment>,
}

impl Backoffice {
    pub fn new(store: Arc<dyn RecordStore>, principal: Option<Principal>) -> Self {
        Self {
            store,
            principal,
            customers: Vec::new(),
            schema_mode: SchemaMode::Full,
            orders: Vec::new(),
            pending: Vec::new(),
            deliveries: Vec::new(),
            payments: Vec::new(),
        }
    }

    /// Refresh every mirror from the store.
    pub async fn load_all(&mut self) -> Result<(), AppError> {
        self.refresh_customers().await?;
        self.refresh_orders().await?;
        self.refresh_pending().await?;
        self.refresh_deliveries().await?;
        self.refresh_payments().await?;
        Ok(())
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn set_principal(&mut self, principal: Option<Principal>) {
        self.principal = principal;
    }

    /// The acting principal, or `Unauthorized` when none is resolvable.
    pub(crate) fn actor(&self) -> Result<&Principal, AppError> {
        self.principal
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("not authenticated")))
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn schema_mode(&self) -> SchemaMode {
        self.schema_mode
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn pending(&self) -> &[PendingDelivery] {
        &self.pending
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }
}
