//! Billing reconciliation: billed/paid/outstanding aggregation over the
//! delivery and payment ledgers.
//!
//! All money math is `f64` with [`BALANCE_EPSILON`] absorbing
//! floating-point residue in zero/equality checks. Billing always prices
//! deliveries at the customer's current `milk_price`; no price history is
//! modeled.

use super::Backoffice;
use crate::models::{Customer, Delivery, Payment};
use backoffice_core::error::AppError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::HashSet;
use uuid::Uuid;

/// Tolerance for treating a float sum as zero/settled.
pub const BALANCE_EPSILON: f64 = 0.001;

/// Payment status of a customer over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    NoBill,
    Pending,
    PartiallyPaid,
    Paid,
    Overpaid,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoBill => "No Bill",
            Self::Pending => "Pending",
            Self::PartiallyPaid => "Partially Paid",
            Self::Paid => "Paid",
            Self::Overpaid => "Overpaid",
        }
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The whole of a calendar month. `None` for an invalid year/month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self::new(start, next.pred_opt()?))
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Reconciled balance for one customer over a range. `previous_balance` /
/// `balance_as_of_date` ride along for display; they are never part of
/// `outstanding`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerBalance {
    pub customer_id: Uuid,
    pub billed: f64,
    pub paid: f64,
    pub outstanding: f64,
    pub status: BillStatus,
    pub previous_balance: f64,
    pub balance_as_of_date: Option<NaiveDate>,
}

/// Aggregate figures for a day or a month.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub billed: f64,
    pub paid: f64,
    pub outstanding: f64,
    pub customers_served: usize,
    pub total_quantity: f64,
}

/// Classify billed-vs-paid for a period.
pub fn classify(billed: f64, paid: f64) -> BillStatus {
    let outstanding = billed - paid;
    if billed <= BALANCE_EPSILON {
        BillStatus::NoBill
    } else if outstanding <= BALANCE_EPSILON && paid > billed {
        BillStatus::Overpaid
    } else if outstanding <= BALANCE_EPSILON {
        BillStatus::Paid
    } else if paid > 0.0 {
        BillStatus::PartiallyPaid
    } else {
        BillStatus::Pending
    }
}

/// Per-customer reconciliation over a range.
pub fn compute_balance(
    customer: &Customer,
    deliveries: &[Delivery],
    payments: &[Payment],
    range: DateRange,
) -> CustomerBalance {
    let billed: f64 = deliveries
        .iter()
        .filter(|d| d.customer_id == customer.id && range.contains(d.date))
        .map(|d| d.quantity * customer.milk_price)
        .sum();
    let paid: f64 = payments
        .iter()
        .filter(|p| p.customer_id == customer.id && range.contains(p.date))
        .map(|p| p.amount)
        .sum();

    CustomerBalance {
        customer_id: customer.id,
        billed,
        paid,
        outstanding: billed - paid,
        status: classify(billed, paid),
        previous_balance: customer.previous_balance,
        balance_as_of_date: customer.balance_as_of_date,
    }
}

/// Global outstanding across all customers and all time. Carried-forward
/// `previous_balance` amounts are deliberately excluded; folding them in
/// would rewrite historical reports.
pub fn total_outstanding(
    customers: &[Customer],
    deliveries: &[Delivery],
    payments: &[Payment],
) -> f64 {
    let price_of: HashMap<Uuid, f64> =
        customers.iter().map(|c| (c.id, c.milk_price)).collect();
    let billed: f64 = deliveries
        .iter()
        .filter_map(|d| price_of.get(&d.customer_id).map(|price| d.quantity * price))
        .sum();
    let paid: f64 = payments.iter().map(|p| p.amount).sum();
    billed - paid
}

/// Aggregate a range: totals plus distinct customers served and quantity
/// delivered.
pub fn summarize_range(
    customers: &[Customer],
    deliveries: &[Delivery],
    payments: &[Payment],
    range: DateRange,
) -> PeriodSummary {
    let price_of: HashMap<Uuid, f64> =
        customers.iter().map(|c| (c.id, c.milk_price)).collect();

    let mut billed = 0.0;
    let mut total_quantity = 0.0;
    let mut served: HashSet<Uuid> = HashSet::new();
    for delivery in deliveries.iter().filter(|d| range.contains(d.date)) {
        if let Some(price) = price_of.get(&delivery.customer_id) {
            billed += delivery.quantity * price;
        }
        total_quantity += delivery.quantity;
        served.insert(delivery.customer_id);
    }

    let paid: f64 = payments
        .iter()
        .filter(|p| range.contains(p.date))
        .map(|p| p.amount)
        .sum();

    PeriodSummary {
        billed,
        paid,
        outstanding: billed - paid,
        customers_served: served.len(),
        total_quantity,
    }
}

impl Backoffice {
    /// Reconcile one customer over a range.
    pub fn customer_balance(
        &self,
        customer_id: Uuid,
        range: DateRange,
    ) -> Result<CustomerBalance, AppError> {
        let customer = self.customer(customer_id).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("customer {} not found", customer_id))
        })?;
        Ok(compute_balance(
            customer,
            &self.deliveries,
            &self.payments,
            range,
        ))
    }

    /// Reconcile one customer over a calendar month.
    pub fn customer_monthly_balance(
        &self,
        customer_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<CustomerBalance, AppError> {
        let range = DateRange::month(year, month)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("invalid month {}-{}", year, month)))?;
        self.customer_balance(customer_id, range)
    }

    /// Global outstanding, all customers, all time.
    pub fn total_outstanding(&self) -> f64 {
        total_outstanding(&self.customers, &self.deliveries, &self.payments)
    }

    pub fn daily_summary(&self, date: NaiveDate) -> PeriodSummary {
        summarize_range(
            &self.customers,
            &self.deliveries,
            &self.payments,
            DateRange::single_day(date),
        )
    }

    pub fn monthly_summary(&self, year: i32, month: u32) -> Result<PeriodSummary, AppError> {
        let range = DateRange::month(year, month)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("invalid month {}-{}", year, month)))?;
        Ok(summarize_range(
            &self.customers,
            &self.deliveries,
            &self.payments,
            range,
        ))
    }
}
