use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    /// The store reported a missing table or column. Only the customer
    /// ledger's legacy fallback may recover from this; everywhere else it
    /// means store-migration tooling has to run.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(anyhow::Error),

    /// Network/connectivity failure talking to the store. Never retried
    /// here; callers decide.
    #[error("Transient store failure: {0}")]
    Transient(anyhow::Error),

    #[error("Store error: {0}")]
    StoreError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this is a schema mismatch that names the given column.
    /// Drives the customer ledger's legacy-projection retry.
    pub fn is_missing_column(&self, column: &str) -> bool {
        match self {
            AppError::SchemaMismatch(err) => err.to_string().contains(column),
            _ => false,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transient(anyhow::Error::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}
