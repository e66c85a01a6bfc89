//! Shared client for the HuggingFace datasets-server rows API.
//!
//! All three benchmark collectors page through their split with this client.
//! Rows come back as untyped JSON objects that each collector deserializes
//! into its own row struct.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::types::{DatasetResult, FetchConfig};
use crate::error::DatasetError;

/// Base URL for the HuggingFace datasets-server rows API.
const HUGGINGFACE_ROWS_API: &str = "https://datasets-server.huggingface.co/rows";

/// Base delay before retrying a rate-limited request, in milliseconds.
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for paging through a dataset split on the rows API.
pub struct HuggingFaceClient {
    /// HTTP client for API requests.
    http_client: Client,
    /// Base URL of the rows endpoint.
    base_url: String,
    /// Paging and rate-limit settings.
    config: FetchConfig,
}

impl HuggingFaceClient {
    /// Create a client against the public rows API.
    pub fn new() -> Self {
        Self::with_base_url(HUGGINGFACE_ROWS_API)
    }

    /// Create a client against a custom rows endpoint.
    ///
    /// Useful for tests and API-compatible mirrors.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
            config: FetchConfig::default(),
        }
    }

    /// Override the paging configuration.
    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every row of a split, in upstream order.
    ///
    /// Pages through the split with `max_page_size` rows per request and a
    /// `rate_limit_delay_ms` pause between pages. `limit` caps the number of
    /// rows fetched; `None` fetches the whole split.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError` if a page request fails after retries or a
    /// response cannot be parsed.
    pub async fn fetch_split<T: DeserializeOwned>(
        &self,
        dataset: &str,
        config_name: &str,
        split: &str,
        limit: Option<usize>,
    ) -> DatasetResult<Vec<RowEntry<T>>> {
        let mut entries: Vec<RowEntry<T>> = Vec::new();
        let mut offset = 0usize;

        loop {
            let remaining = limit.map(|cap| cap.saturating_sub(entries.len()));
            if remaining == Some(0) {
                break;
            }
            let length = remaining
                .unwrap_or(self.config.max_page_size)
                .min(self.config.max_page_size);

            let page = self
                .fetch_page(dataset, config_name, split, offset, length)
                .await?;
            let fetched = page.rows.len();
            tracing::debug!(
                dataset = dataset,
                split = split,
                offset = offset,
                fetched = fetched,
                total = ?page.num_rows_total,
                "Fetched rows page"
            );

            entries.extend(page.rows);
            offset += fetched;

            // A short page means the split is exhausted.
            if fetched < length {
                break;
            }
            if let Some(total) = page.num_rows_total {
                if offset >= total {
                    break;
                }
            }

            tokio::time::sleep(Duration::from_millis(self.config.rate_limit_delay_ms)).await;
        }

        Ok(entries)
    }

    /// Fetch one page of rows, retrying on rate-limit responses.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        dataset: &str,
        config_name: &str,
        split: &str,
        offset: usize,
        length: usize,
    ) -> DatasetResult<RowsPage<T>> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay_ms = match &last_error {
                    Some(DatasetError::RateLimited {
                        retry_after: Some(secs),
                    }) => secs * 1000,
                    _ => BASE_RETRY_DELAY_MS * (1 << (attempt - 1)),
                };
                tracing::warn!(
                    dataset = dataset,
                    attempt = attempt,
                    delay_ms = delay_ms,
                    "Rate limited by rows API, retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            match self
                .request_page(dataset, config_name, split, offset, length)
                .await
            {
                Ok(page) => return Ok(page),
                Err(err @ DatasetError::RateLimited { .. }) => {
                    last_error = Some(err);
                }
                Err(other) => return Err(other),
            }
        }

        Err(last_error.unwrap_or(DatasetError::RateLimited { retry_after: None }))
    }

    /// Execute a single page request with no retry logic.
    async fn request_page<T: DeserializeOwned>(
        &self,
        dataset: &str,
        config_name: &str,
        split: &str,
        offset: usize,
        length: usize,
    ) -> DatasetResult<RowsPage<T>> {
        let url = format!(
            "{}?dataset={}&config={}&split={}&offset={}&length={}",
            self.base_url, dataset, config_name, split, offset, length
        );

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DatasetError::HttpError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(DatasetError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DatasetError::HttpError(format!(
                "API returned status {}: {}",
                status, error_text
            )));
        }

        let api_response: RowsResponse<T> = response
            .json()
            .await
            .map_err(|e| DatasetError::ParseError(format!("Failed to parse response: {}", e)))?;

        Ok(RowsPage {
            rows: api_response.rows,
            num_rows_total: api_response.num_rows_total,
        })
    }
}

impl Default for HuggingFaceClient {
    fn default() -> Self {
        Self::new()
    }
}

/// One page of rows with the split's total row count, when reported.
#[derive(Debug)]
pub struct RowsPage<T> {
    /// Rows in this page.
    pub rows: Vec<RowEntry<T>>,
    /// Total rows in the split.
    pub num_rows_total: Option<usize>,
}

/// A single row together with its index in the split.
#[derive(Debug, Deserialize)]
pub struct RowEntry<T> {
    /// Position of the row within the upstream split.
    pub row_idx: usize,
    /// The row fields.
    pub row: T,
}

/// Response structure from the rows API.
#[derive(Debug, Deserialize)]
struct RowsResponse<T> {
    rows: Vec<RowEntry<T>>,
    num_rows_total: Option<usize>,
}
