use bigdecimal::BigDecimal;

/// Upper quantity bound for digital items, which have no stock to respect.
pub const DIGITAL_MAX_QTY: u32 = 9999;

/// A purchasable picklist line item, rebuilt on every successful fetch.
///
/// `price` and `inventory_level` are `None` when the API sent something
/// non-numeric; the renderer turns those into a per-row placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemRow {
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub price: Option<BigDecimal>,
    pub inventory_level: Option<i64>,
    pub is_visible: bool,
    pub is_digital: bool,
}

impl LineItemRow {
    /// Physical rows with no stock. Digital rows are never out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        !self.is_digital && self.inventory_level == Some(0)
    }

    /// Rows that cannot be purchased because a required field is malformed.
    pub fn data_problem(&self) -> Option<&'static str> {
        if self.price.is_none() {
            return Some("price");
        }
        if !self.is_digital && self.inventory_level.is_none() {
            return Some("inventory_level");
        }
        None
    }

    /// Malformed rows get `max = 0` so no quantity can pass validation.
    pub fn bounds(&self) -> QuantityBounds {
        let max = if self.data_problem().is_some() {
            0
        } else if self.is_digital {
            DIGITAL_MAX_QTY
        } else {
            self.inventory_level
                .filter(|level| *level > 0)
                .map(|level| u32::try_from(level).unwrap_or(u32::MAX))
                .unwrap_or(0)
        };
        QuantityBounds { min: 0, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityBounds {
    pub min: u32,
    pub max: u32,
}

impl QuantityBounds {
    pub fn contains(&self, qty: u32) -> bool {
        self.min <= qty && qty <= self.max
    }
}

/// The quantity currently entered for one rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantitySelection {
    pub product_id: i64,
    pub qty: u32,
    pub bounds: QuantityBounds,
}

impl QuantitySelection {
    pub fn for_row(row: &LineItemRow) -> Self {
        let bounds = row.bounds();
        Self {
            product_id: row.product_id,
            qty: bounds.min,
            bounds,
        }
    }
}

/// A row chosen for submission: only rows with `qty > 0` become one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub qty: u32,
}

/// Modifier ids and labels of the picklist groups, used to hide the
/// duplicate option fields on the product page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PicklistModifiers {
    pub ids: Vec<i64>,
    pub display_names: Vec<String>,
}
