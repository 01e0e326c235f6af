//! Delivery Service - Delivery lifecycle and billing reconciliation for a
//! dairy subscription back office.

pub mod config;
pub mod models;
pub mod services;
pub mod store;
