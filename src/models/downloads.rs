use serde::Deserialize;
use serde_json::Value;

/// `GET /customers/orders-with-links` response.
///
/// Count fields are kept as raw JSON: their presence, not their truthiness,
/// decides which one is used. Orders and their links stay raw until read so
/// one malformed entry only drops itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersWithLinksEnvelope {
    pub success: Option<bool>,
    pub message: Option<Value>,
    pub orders_with_links: Option<Vec<Value>>,
    pub pagination: Option<PaginationFields>,
    pub orders_count: Option<Value>,
    pub total_orders: Option<Value>,
    pub total_records: Option<Value>,
}

impl OrdersWithLinksEnvelope {
    pub fn orders(&self) -> Vec<OrderWithLinks> {
        self.orders_with_links
            .iter()
            .flatten()
            .filter_map(|raw| match OrderWithLinks::deserialize(raw) {
                Ok(order) => Some(order),
                Err(e) => {
                    log::warn!("Skipping malformed order entry {raw}: {e}");
                    None
                }
            })
            .collect()
    }

    pub fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationFields {
    pub current_page: Option<Value>,
    pub page: Option<Value>,
    pub per_page: Option<Value>,
    pub limit: Option<Value>,
    pub total_orders_checked: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderWithLinks {
    pub order_id: Option<Value>,
    pub order_number: Option<Value>,
    pub date_created: Option<Value>,
    pub download_links: Option<Value>,
}

impl OrderWithLinks {
    pub fn links(&self) -> Vec<DownloadLink> {
        let Some(Value::Array(raw_links)) = &self.download_links else {
            return Vec::new();
        };
        raw_links
            .iter()
            .filter_map(|raw| match DownloadLink::deserialize(raw) {
                Ok(link) => Some(link),
                Err(e) => {
                    log::warn!("Skipping malformed download link {raw}: {e}");
                    None
                }
            })
            .collect()
    }

    pub fn has_links(&self) -> bool {
        !self.links().is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadLink {
    pub download_link: Option<Value>,
    pub sku: Option<Value>,
    pub product_title: Option<Value>,
}
