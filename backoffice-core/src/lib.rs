//! backoffice-core: Shared infrastructure for the dairy back-office crates.

pub mod auth;
pub mod config;
pub mod error;
pub mod observability;

pub use serde;
pub use serde_json;
pub use tracing;
pub use validator;
