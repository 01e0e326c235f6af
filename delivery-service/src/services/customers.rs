//! Customer ledger operations.

use super::Backoffice;
use crate::models::{
    CreateCustomer, Customer, CustomerImportRow, CustomerStatus, LegacyCustomerRow, SchemaMode,
    UpdateCustomer,
};
use crate::store::{collections, Filter};
use backoffice_core::error::AppError;
use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Full customer projection, including the balance-carry columns added by
/// the migration.
const FULL_COLUMNS: &str =
    "id,name,address,phone,milk_price,default_quantity,status,previous_balance,balance_as_of_date,user_id";

/// Narrow projection accepted by stores that predate the migration.
const LEGACY_COLUMNS: &str = "id,name,address,phone,milk_price,default_quantity,status,user_id";

/// Outcome of a bulk import: additive, row-by-row, with per-row failures
/// reported rather than rolled back.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    /// (zero-based row index, store error) for rows the store rejected.
    pub failures: Vec<(usize, String)>,
}

impl Backoffice {
    /// Reload the customer mirror.
    ///
    /// When the store reports the balance-carry columns missing, retries
    /// with the legacy projection, backfills `previous_balance = 0` /
    /// `balance_as_of_date = None` in memory and flags the session as
    /// legacy for the rest of its lifetime. Any other failure propagates.
    #[instrument(skip(self))]
    pub async fn refresh_customers(&mut self) -> Result<(), AppError> {
        let rows = match self
            .store
            .fetch_all(collections::CUSTOMERS, FULL_COLUMNS, "name")
            .await
        {
            Ok(rows) => rows,
            Err(err)
                if err.is_missing_column("previous_balance")
                    || err.is_missing_column("balance_as_of_date") =>
            {
                warn!(error = %err, "Balance-carry columns missing, entering legacy mode");
                let rows = self
                    .store
                    .fetch_all(collections::CUSTOMERS, LEGACY_COLUMNS, "name")
                    .await?;
                let legacy: Vec<LegacyCustomerRow> = rows
                    .into_iter()
                    .map(serde_json::from_value)
                    .collect::<Result<_, _>>()?;
                self.customers = legacy.into_iter().map(Customer::from).collect();
                self.schema_mode = SchemaMode::Legacy;
                self.sort_customers();
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        self.customers = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;
        self.schema_mode = SchemaMode::Full;
        self.sort_customers();
        Ok(())
    }

    pub fn customer(&self, id: Uuid) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Create a customer. New customers start active with no carried
    /// balance.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_customer(&mut self, input: CreateCustomer) -> Result<Customer, AppError> {
        self.actor()?;
        input.validate()?;

        if let Some(phone) = input.phone.as_deref() {
            self.ensure_phone_free(phone, None)?;
        }

        let customer = Customer {
            id: Uuid::new_v4(),
            name: input.name,
            address: input.address,
            phone: input.phone,
            milk_price: input.milk_price,
            default_quantity: input.default_quantity,
            status: CustomerStatus::Active,
            previous_balance: 0.0,
            balance_as_of_date: None,
            user_id: None,
        };

        let row = self.customer_row(&customer)?;
        self.store
            .insert(collections::CUSTOMERS, vec![row])
            .await?;

        info!(customer_id = %customer.id, "Customer created");
        self.customers.push(customer.clone());
        self.sort_customers();
        Ok(customer)
    }

    /// Apply a partial update. Balance-carry edits are refused in legacy
    /// mode because the store has nowhere to put them.
    #[instrument(skip(self, update), fields(customer_id = %id))]
    pub async fn update_customer(
        &mut self,
        id: Uuid,
        update: UpdateCustomer,
    ) -> Result<Customer, AppError> {
        self.actor()?;

        if self.schema_mode == SchemaMode::Legacy && update.touches_balance_carry() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "balance-carry fields cannot be edited while the store is missing their columns"
            )));
        }

        let mut customer = self
            .customer(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("customer {} not found", id)))?;

        if let Some(name) = update.name {
            if name.is_empty() {
                return Err(AppError::BadRequest(anyhow::anyhow!("name is required")));
            }
            customer.name = name;
        }
        if let Some(address) = update.address {
            if address.is_empty() {
                return Err(AppError::BadRequest(anyhow::anyhow!("address is required")));
            }
            customer.address = address;
        }
        if let Some(phone) = update.phone {
            if let Some(p) = phone.as_deref() {
                self.ensure_phone_free(p, Some(id))?;
            }
            customer.phone = phone;
        }
        if let Some(price) = update.milk_price {
            if price < 0.0 {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "milk_price must be non-negative"
                )));
            }
            customer.milk_price = price;
        }
        if let Some(quantity) = update.default_quantity {
            if quantity < 0.0 {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "default_quantity must be non-negative"
                )));
            }
            customer.default_quantity = quantity;
        }
        if let Some(status) = update.status {
            customer.status = status;
        }
        if let Some(balance) = update.previous_balance {
            customer.previous_balance = balance;
        }
        if let Some(as_of) = update.balance_as_of_date {
            customer.balance_as_of_date = as_of;
        }
        if let Some(user_id) = update.user_id {
            customer.user_id = user_id;
        }

        let row = self.customer_row(&customer)?;
        self.store
            .upsert(collections::CUSTOMERS, vec![row], "id")
            .await?;

        if let Some(slot) = self.customers.iter_mut().find(|c| c.id == id) {
            *slot = customer.clone();
        }
        self.sort_customers();
        info!(customer_id = %id, "Customer updated");
        Ok(customer)
    }

    /// Delete a customer and every row that references it.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn delete_customer(&mut self, id: Uuid) -> Result<(), AppError> {
        self.actor()?;
        if self.customer(id).is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "customer {} not found",
                id
            )));
        }

        let by_customer = [Filter::eq("customer_id", id)];
        let deliveries = self
            .store
            .delete(collections::DELIVERIES, &by_customer)
            .await?;
        let payments = self
            .store
            .delete(collections::PAYMENTS, &by_customer)
            .await?;
        let orders = self.store.delete(collections::ORDERS, &by_customer).await?;
        let pending = self
            .store
            .delete(collections::PENDING_DELIVERIES, &by_customer)
            .await?;
        self.store
            .delete(collections::CUSTOMERS, &[Filter::eq("id", id)])
            .await?;

        self.customers.retain(|c| c.id != id);
        self.deliveries.retain(|d| d.customer_id != id);
        self.payments.retain(|p| p.customer_id != id);
        self.orders.retain(|o| o.customer_id != id);
        self.pending.retain(|p| p.customer_id != id);

        info!(
            customer_id = %id,
            deliveries_removed = deliveries,
            payments_removed = payments,
            orders_removed = orders,
            pending_removed = pending,
            "Customer deleted with cascade"
        );
        Ok(())
    }

    /// Additive bulk import. The whole batch is rejected before any store
    /// call when a row fails shape validation; after that each row is
    /// inserted individually and store rejections are reported per row.
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub async fn import_customers(
        &mut self,
        rows: Vec<CustomerImportRow>,
    ) -> Result<ImportReport, AppError> {
        self.actor()?;

        for (index, row) in rows.iter().enumerate() {
            if let Err(err) = row.validate() {
                warn!(row = index, error = %err, "Import batch rejected");
                return Err(err.into());
            }
        }

        let mut report = ImportReport::default();
        for (index, input) in rows.into_iter().enumerate() {
            let customer = Customer {
                id: Uuid::new_v4(),
                name: input.name,
                address: input.address,
                phone: input.phone,
                milk_price: input.milk_price,
                default_quantity: input.default_quantity,
                status: CustomerStatus::Active,
                previous_balance: 0.0,
                balance_as_of_date: None,
                user_id: None,
            };
            let row = self.customer_row(&customer)?;
            match self.store.insert(collections::CUSTOMERS, vec![row]).await {
                Ok(_) => {
                    self.customers.push(customer);
                    report.imported += 1;
                }
                Err(err) => {
                    warn!(row = index, error = %err, "Import row rejected by store");
                    report.failures.push((index, err.to_string()));
                }
            }
        }

        self.sort_customers();
        info!(
            imported = report.imported,
            failed = report.failures.len(),
            "Customer import finished"
        );
        Ok(report)
    }

    fn ensure_phone_free(&self, phone: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
        let taken = self.customers.iter().any(|c| {
            Some(c.id) != exclude && c.phone.as_deref() == Some(phone)
        });
        if taken {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "phone number {} is already in use",
                phone
            )));
        }
        Ok(())
    }

    /// Serialize a customer for the store, dropping the balance-carry
    /// columns when the store does not have them.
    fn customer_row(&self, customer: &Customer) -> Result<Value, AppError> {
        let mut row = serde_json::to_value(customer)?;
        if self.schema_mode == SchemaMode::Legacy {
            if let Value::Object(map) = &mut row {
                map.remove("previous_balance");
                map.remove("balance_as_of_date");
            }
        }
        Ok(row)
    }

    pub(crate) fn sort_customers(&mut self) {
        self.customers
            .sort_by_key(|c| c.name.to_lowercase());
    }
}
