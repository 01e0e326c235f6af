//! PostgREST-style HTTP implementation of the record store adapter.

use super::{Filter, RecordStore};
use crate::config::StoreConfig;
use crate::services::metrics::STORE_REQUEST_DURATION;
use async_trait::async_trait;
use backoffice_core::error::AppError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument};

/// Remote store client. One instance per session; `reqwest::Client` pools
/// connections internally.
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Bad STORE_API_KEY: {}", e)))?;
        headers.insert("apikey", key);
        let bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Bad STORE_API_KEY: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        let schema = HeaderValue::from_str(&config.schema)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Bad STORE_SCHEMA: {}", e)))?;
        headers.insert("Accept-Profile", schema.clone());
        headers.insert("Content-Profile", schema);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to build client: {}", e)))?;

        info!(url = %config.url, page_size = config.page_size, "Record store client ready");

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
        })
    }

    fn endpoint(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    async fn read_rows(&self, response: reqwest::Response) -> Result<Vec<Value>, AppError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_error(status, &body));
        }
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RecordStore for RestStore {
    #[instrument(skip(self))]
    async fn fetch_all(
        &self,
        collection: &str,
        select: &str,
        order_by: &str,
    ) -> Result<Vec<Value>, AppError> {
        let timer = STORE_REQUEST_DURATION
            .with_label_values(&["fetch_all", collection])
            .start_timer();

        let mut rows = Vec::new();
        let mut from = 0usize;
        loop {
            let to = from + self.page_size - 1;
            let order = format!("{}.asc", order_by);
            let response = self
                .client
                .get(self.endpoint(collection))
                .query(&[("select", select), ("order", order.as_str())])
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", from, to))
                .send()
                .await?;

            let page = self.read_rows(response).await?;
            let page_len = page.len();
            rows.extend(page);
            if page_len < self.page_size {
                break;
            }
            from += self.page_size;
        }

        timer.observe_duration();
        Ok(rows)
    }

    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    async fn insert(&self, collection: &str, rows: Vec<Value>) -> Result<Vec<Value>, AppError> {
        let timer = STORE_REQUEST_DURATION
            .with_label_values(&["insert", collection])
            .start_timer();

        let response = self
            .client
            .post(self.endpoint(collection))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;

        let written = self.read_rows(response).await?;
        timer.observe_duration();
        Ok(written)
    }

    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    async fn upsert(
        &self,
        collection: &str,
        rows: Vec<Value>,
        conflict_key: &str,
    ) -> Result<Vec<Value>, AppError> {
        let timer = STORE_REQUEST_DURATION
            .with_label_values(&["upsert", collection])
            .start_timer();

        let response = self
            .client
            .post(self.endpoint(collection))
            .query(&[("on_conflict", conflict_key)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&rows)
            .send()
            .await?;

        let written = self.read_rows(response).await?;
        timer.observe_duration();
        Ok(written)
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, filters: &[Filter]) -> Result<u64, AppError> {
        let timer = STORE_REQUEST_DURATION
            .with_label_values(&["delete", collection])
            .start_timer();

        let query: Vec<(String, String)> = filters
            .iter()
            .map(|f| match f {
                Filter::Eq(column, value) => (column.to_string(), format!("eq.{}", value)),
                Filter::In(column, values) => {
                    (column.to_string(), format!("in.({})", values.join(",")))
                }
            })
            .collect();

        let response = self
            .client
            .delete(self.endpoint(collection))
            .query(&query)
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let removed = self.read_rows(response).await?;
        timer.observe_duration();
        Ok(removed.len() as u64)
    }
}

/// Error body shape the store reports.
#[derive(Debug, Deserialize)]
struct StoreErrorBody {
    code: Option<String>,
    message: Option<String>,
    #[allow(dead_code)]
    details: Option<String>,
    hint: Option<String>,
}

/// Map an error response onto the error taxonomy. Missing tables/columns
/// must come back as `SchemaMismatch` so the customer ledger can tell the
/// legacy-fallback case apart from everything else.
fn classify_error(status: StatusCode, body: &str) -> AppError {
    let parsed: Option<StoreErrorBody> = serde_json::from_str(body).ok();
    let (code, message) = match parsed {
        Some(b) => (
            b.code.unwrap_or_default(),
            b.message
                .or(b.hint)
                .unwrap_or_else(|| status.to_string()),
        ),
        None => (String::new(), truncated(body, status)),
    };

    match code.as_str() {
        // undefined_column / unknown column in schema cache / undefined_table
        "42703" | "PGRST204" | "42P01" => {
            AppError::SchemaMismatch(anyhow::anyhow!("{}: {}", code, message))
        }
        // unique_violation
        "23505" => AppError::Conflict(anyhow::anyhow!("{}", message)),
        _ => match status {
            StatusCode::CONFLICT => AppError::Conflict(anyhow::anyhow!("{}", message)),
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(anyhow::anyhow!("{}", message)),
            StatusCode::FORBIDDEN => AppError::Forbidden(anyhow::anyhow!("{}", message)),
            _ => AppError::StoreError(anyhow::anyhow!("{}: {}", status, message)),
        },
    }
}

fn truncated(body: &str, status: StatusCode) -> String {
    if body.is_empty() {
        return status.to_string();
    }
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_maps_to_schema_mismatch() {
        let body = r#"{"code":"42703","message":"column customers.balance_as_of_date does not exist"}"#;
        let err = classify_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, AppError::SchemaMismatch(_)));
        assert!(err.is_missing_column("balance_as_of_date"));
        assert!(!err.is_missing_column("phone"));
    }

    #[test]
    fn schema_cache_miss_maps_to_schema_mismatch() {
        let body = r#"{"code":"PGRST204","message":"Could not find the 'previous_balance' column of 'customers' in the schema cache"}"#;
        let err = classify_error(StatusCode::BAD_REQUEST, body);
        assert!(err.is_missing_column("previous_balance"));
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"customers_phone_key\""}"#;
        let err = classify_error(StatusCode::CONFLICT, body);
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn permission_errors_propagate_verbatim() {
        let err = classify_error(StatusCode::FORBIDDEN, r#"{"message":"permission denied"}"#);
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = classify_error(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn unparseable_body_still_classifies_by_status() {
        let err = classify_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(err, AppError::StoreError(_)));
    }
}
