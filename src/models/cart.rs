use serde::Deserialize;

/// Storefront `remote/v1/cart/add` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartAddEnvelope {
    #[serde(default)]
    pub data: CartAddData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartAddData {
    pub cart_item: Option<CartItemRef>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItemRef {
    pub id: Option<CartItemId>,
}

/// Cart item ids arrive as strings on current storefronts and as numbers on
/// older ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CartItemId {
    Text(String),
    Number(i64),
}

impl CartItemId {
    pub fn into_string(self) -> String {
        match self {
            CartItemId::Text(id) => id,
            CartItemId::Number(id) => id.to_string(),
        }
    }
}

impl CartAddEnvelope {
    pub fn cart_item_id(&self) -> Option<String> {
        self.data
            .cart_item
            .as_ref()
            .and_then(|item| item.id.clone())
            .map(CartItemId::into_string)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_string_and_numeric_item_ids() {
        let text: CartAddEnvelope =
            serde_json::from_str(r#"{"data":{"cart_item":{"id":"abc-1"}}}"#).unwrap();
        assert_eq!(text.cart_item_id().as_deref(), Some("abc-1"));

        let number: CartAddEnvelope =
            serde_json::from_str(r#"{"data":{"cart_item":{"id":42}}}"#).unwrap();
        assert_eq!(number.cart_item_id().as_deref(), Some("42"));
    }

    #[test]
    fn error_payload_has_no_item() {
        let env: CartAddEnvelope =
            serde_json::from_str(r#"{"data":{"error":"<p>Out of stock</p>"}}"#).unwrap();
        assert!(env.cart_item_id().is_none());
        assert_eq!(env.data.error.as_deref(), Some("<p>Out of stock</p>"));
    }
}
