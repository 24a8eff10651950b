use async_trait::async_trait;
use serde_json::Value;

use super::errors::WidgetError;
use super::picklist::CartLine;

/// Product modifier source for the picklist.
#[async_trait]
pub trait CatalogApi: Send + Sync + 'static {
    async fn product_modifiers(&self, product_id: i64) -> Result<Value, WidgetError>;
}

/// Orders-with-download-links source for the account downloads list.
#[async_trait]
pub trait DownloadsApi: Send + Sync + 'static {
    async fn orders_with_links(
        &self,
        identifier: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Value, WidgetError>;
}

/// What the storefront cart returned for one successful add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartAddReceipt {
    pub cart_item_id: Option<String>,
}

/// The storefront cart. Failures are `WidgetError::Submission` carrying
/// plain-text messages.
#[async_trait]
pub trait CartApi: Send + Sync + 'static {
    async fn add_item(&self, line: CartLine) -> Result<CartAddReceipt, WidgetError>;
}
