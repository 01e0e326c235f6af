//! Domain models for delivery-service.

mod customer;
mod delivery;
mod order;
mod payment;

pub use customer::{
    CreateCustomer, Customer, CustomerImportRow, CustomerStatus, LegacyCustomerRow, SchemaMode,
    UpdateCustomer,
};
pub use delivery::{Delivery, PendingDelivery};
pub use order::Order;
pub use payment::Payment;
