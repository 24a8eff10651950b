use serde::Deserialize;
use serde_json::Value;

/// Discriminator for modifier groups that carry a purchasable product list.
pub const PRODUCT_LIST_WITH_IMAGES: &str = "product_list_with_images";

/// `GET /products/{id}/modifiers` response.
///
/// Scalar product fields stay as raw JSON because deployments disagree on
/// whether numbers arrive as numbers or strings. Groups and products are
/// decoded one by one so a malformed entry only drops itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModifiersEnvelope {
    pub data: Option<Vec<Value>>,
}

impl ModifiersEnvelope {
    pub fn groups(&self) -> Vec<ModifierGroup> {
        self.data
            .iter()
            .flatten()
            .filter_map(|raw| match ModifierGroup::deserialize(raw) {
                Ok(group) => Some(group),
                Err(e) => {
                    log::warn!("Skipping malformed modifier group: {e}");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModifierGroup {
    pub modifier_details: Option<ModifierDetails>,
    pub products: Option<Vec<Value>>,
}

impl ModifierGroup {
    pub fn is_picklist(&self) -> bool {
        self.modifier_details
            .as_ref()
            .is_some_and(ModifierDetails::is_picklist)
    }

    pub fn products(&self) -> Vec<ModifierProduct> {
        self.products
            .iter()
            .flatten()
            .filter(|raw| !raw.is_null())
            .filter_map(|raw| match ModifierProduct::deserialize(raw) {
                Ok(product) => Some(product),
                Err(e) => {
                    log::warn!("Skipping malformed picklist product {raw}: {e}");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModifierDetails {
    pub modifier_type: Option<Value>,
    pub modifier_id: Option<Value>,
    pub modifier_display_name: Option<Value>,
    pub modifier_name: Option<Value>,
}

impl ModifierDetails {
    pub fn is_picklist(&self) -> bool {
        self.modifier_type.as_ref().and_then(Value::as_str) == Some(PRODUCT_LIST_WITH_IMAGES)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModifierProduct {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub sku: Option<Value>,
    pub price: Option<Value>,
    pub inventory_level: Option<Value>,
    pub is_visible: Option<Value>,
    pub is_digital: Option<Value>,
}
