//! Shared harness for delivery-service integration tests.

#![allow(dead_code)]

use backoffice_core::auth::{Principal, Role};
use chrono::NaiveDate;
use delivery_service::models::{CreateCustomer, Customer};
use delivery_service::services::Backoffice;
use delivery_service::store::MemoryStore;
use std::sync::Arc;
use uuid::Uuid;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn admin() -> Principal {
    Principal::new(Uuid::new_v4(), Role::Admin)
}

pub fn staff() -> Principal {
    Principal::new(Uuid::new_v4(), Role::Staff)
}

/// A back office over a fresh in-memory store, acting as an admin.
pub fn spawn_backoffice() -> (Backoffice, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let backoffice = Backoffice::new(store.clone(), Some(admin()));
    (backoffice, store)
}

pub async fn seed_customer(
    backoffice: &mut Backoffice,
    name: &str,
    milk_price: f64,
    default_quantity: f64,
) -> Customer {
    backoffice
        .create_customer(CreateCustomer {
            name: name.to_string(),
            address: "12 Dairy Lane".to_string(),
            phone: None,
            milk_price,
            default_quantity,
        })
        .await
        .expect("seed customer")
}

pub fn assert_close(actual: f64, expected: f64, context: &str) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{}: expected {}, got {}",
        context,
        expected,
        actual
    );
}
