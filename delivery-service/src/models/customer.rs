//! Customer model, including the legacy-schema row shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Customer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "inactive" => Self::Inactive,
            _ => Self::Active,
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A subscription customer.
///
/// `previous_balance` is a carried-forward amount struck in a prior system
/// as of `balance_as_of_date`. It is displayed alongside computed balances
/// but never folded into outstanding totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    /// Unit price per quantity unit, in the business currency.
    pub milk_price: f64,
    /// Quantity prefilled when no order/pending/delivery exists for a date.
    pub default_quantity: f64,
    pub status: CustomerStatus,
    pub previous_balance: f64,
    pub balance_as_of_date: Option<NaiveDate>,
    /// External auth principal for customer self-service, if linked.
    pub user_id: Option<Uuid>,
}

/// Which customer projection the store accepted this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// All columns present, balance-carry fields editable.
    Full,
    /// Balance-carry columns missing from the store; rows are backfilled
    /// in memory and balance-carry edits are not offered.
    Legacy,
}

/// Customer row as stored before the balance-carry migration. Normalized
/// to [`Customer`] immediately after load so nothing downstream branches
/// on schema version.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyCustomerRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub milk_price: f64,
    pub default_quantity: f64,
    pub status: CustomerStatus,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl From<LegacyCustomerRow> for Customer {
    fn from(row: LegacyCustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            milk_price: row.milk_price,
            default_quantity: row.default_quantity,
            status: row.status,
            previous_balance: 0.0,
            balance_as_of_date: None,
            user_id: row.user_id,
        }
    }
}

/// Input for creating a customer.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    pub phone: Option<String>,
    #[validate(range(min = 0.0, message = "milk_price must be non-negative"))]
    pub milk_price: f64,
    #[validate(range(min = 0.0, message = "default_quantity must be non-negative"))]
    pub default_quantity: f64,
}

/// Partial update for an existing customer. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<Option<String>>,
    pub milk_price: Option<f64>,
    pub default_quantity: Option<f64>,
    pub status: Option<CustomerStatus>,
    pub previous_balance: Option<f64>,
    pub balance_as_of_date: Option<Option<NaiveDate>>,
    pub user_id: Option<Option<Uuid>>,
}

impl UpdateCustomer {
    /// Whether this update touches the balance-carry fields, which legacy
    /// mode cannot persist.
    pub fn touches_balance_carry(&self) -> bool {
        self.previous_balance.is_some() || self.balance_as_of_date.is_some()
    }
}

/// One spreadsheet row for bulk customer import, already split out of the
/// file format by the import collaborator.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerImportRow {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    pub phone: Option<String>,
    #[validate(range(min = 0.0, message = "milk_price must be non-negative"))]
    pub milk_price: f64,
    #[validate(range(min = 0.0, message = "default_quantity must be non-negative"))]
    pub default_quantity: f64,
}
