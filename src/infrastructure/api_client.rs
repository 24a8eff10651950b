use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::{AppConfig, PRODUCT_ID_PLACEHOLDER};
use crate::domain::errors::WidgetError;
use crate::domain::ports::{CatalogApi, DownloadsApi};

/// Widget API client: product modifiers and orders with download links.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    http: Client,
    base_url: String,
    modifiers_endpoint: String,
    downloads_endpoint: String,
}

impl HttpApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, WidgetError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| WidgetError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            modifiers_endpoint: config.product_modifiers_endpoint.clone(),
            downloads_endpoint: config.customer_downloads_endpoint.clone(),
        }
    }

    pub fn modifiers_url(&self, product_id: i64) -> String {
        let path = self
            .modifiers_endpoint
            .replace(PRODUCT_ID_PLACEHOLDER, &product_id.to_string());
        format!("{}{}", self.base_url, path)
    }

    pub fn downloads_url(&self, identifier: &str, page: u32, per_page: u32) -> String {
        format!(
            "{}{}?identifier={}&page={}&per_page={}",
            self.base_url,
            self.downloads_endpoint,
            urlencoding::encode(identifier),
            page,
            per_page
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, WidgetError> {
        log::debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                WidgetError::Network(format!("request to {url} {kind}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::debug!(
                "Non-success body from {url}: {}",
                body.chars().take(200).collect::<String>()
            );
            return Err(WidgetError::Network(format!(
                "request to {url} failed with status {}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| WidgetError::Network(format!("invalid JSON from {url}: {e}")))
    }
}

#[async_trait]
impl CatalogApi for HttpApiClient {
    async fn product_modifiers(&self, product_id: i64) -> Result<Value, WidgetError> {
        self.get_json(&self.modifiers_url(product_id)).await
    }
}

#[async_trait]
impl DownloadsApi for HttpApiClient {
    async fn orders_with_links(
        &self,
        identifier: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Value, WidgetError> {
        self.get_json(&self.downloads_url(identifier, page, per_page))
            .await
    }
}
