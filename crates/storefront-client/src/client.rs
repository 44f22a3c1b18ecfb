//! HTTP client for the storefront product API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use storefront_core::{AppConfig, FetchError, Product, ProductSource, QueryParams};

use crate::error::ClientError;
use crate::retry::retry_with_backoff;
use crate::types::ProductsResponse;

/// HTTP client for `GET {base}/products`.
///
/// 429, 404 and other non-2xx responses become typed errors. Transient
/// failures (429, network errors, 5xx) are retried with exponential backoff.
pub struct CatalogClient {
    client: Client,
    base_url: reqwest::Url,
    api_token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// `max_retries` is the number of additional attempts after the first
    /// failure. Set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidBaseUrl`] if `base_url` is not an absolute http(s) URL.
    /// - [`ClientError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_token: None,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from the application config.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let client = Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )?;
        Ok(match &config.api_token {
            Some(token) => client.with_api_token(token.clone()),
            None => client,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    #[must_use]
    pub fn with_api_token(mut self, token: String) -> Self {
        self.api_token = Some(token);
        self
    }

    /// Fetches the products matching `params`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ClientError::NotFound`]: HTTP 404 (not retried).
    /// - [`ClientError::UnexpectedStatus`]: other non-2xx (5xx retried).
    /// - [`ClientError::Http`]: network failure after all retries.
    /// - [`ClientError::Deserialize`]: body is not a recognized response shape.
    /// - [`ClientError::Api`]: the envelope reported `success: false`.
    /// - [`ClientError::InvalidProduct`]: a record has no usable price.
    pub async fn fetch_products(&self, params: &QueryParams) -> Result<Vec<Product>, ClientError> {
        let url = self.products_url(params);

        let response = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let mut request = self
                    .client
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json");

                if let Some(token) = &self.api_token {
                    request = request.bearer_auth(token);
                }

                let response = request.send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ClientError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ClientError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(ClientError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<ProductsResponse>(&body).map_err(|e| {
                    ClientError::Deserialize {
                        context: format!("products response from {url}"),
                        source: e,
                    }
                })
            }
        })
        .await?;

        let products = response.into_products()?;
        tracing::debug!(
            params = params.len(),
            count = products.len(),
            "fetched products"
        );
        Ok(products)
    }

    /// Builds `{base}/products?<params>`. An empty param set yields no query string.
    fn products_url(&self, params: &QueryParams) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("products");
        }

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params.to_query_pairs() {
                pairs.append_pair(key, &value);
            }
        }

        url
    }
}

fn parse_base_url(base_url: &str) -> Result<reqwest::Url, ClientError> {
    let url = reqwest::Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }

    Ok(url)
}

#[async_trait]
impl ProductSource for CatalogClient {
    async fn fetch_products(&self, params: &QueryParams) -> Result<Vec<Product>, FetchError> {
        CatalogClient::fetch_products(self, params)
            .await
            .map_err(FetchError::from)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
