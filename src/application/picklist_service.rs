use std::sync::Arc;

use crate::domain::errors::WidgetError;
use crate::domain::picklist::{LineItemRow, PicklistModifiers, QuantitySelection};
use crate::domain::ports::CatalogApi;
use crate::domain::quantity::{self, QuantityAction};
use crate::domain::ui_state::{FetchTicket, Resolution, UiState, UiStateMachine};

use super::row_extractor::{extract_picklist_modifiers, extract_picklist_rows};
use super::submission::{validate_all, QuantityInput};

/// Shown in place of the picklist whenever it cannot be loaded.
pub const UNAVAILABLE_MESSAGE: &str = "Coming Soon...";

/// Normalized result of one picklist fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PicklistData {
    pub rows: Vec<LineItemRow>,
    pub modifiers: PicklistModifiers,
}

#[derive(Clone)]
pub struct PicklistService {
    catalog: Arc<dyn CatalogApi>,
}

impl PicklistService {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }

    pub async fn fetch(&self, product_id: i64) -> Result<PicklistData, WidgetError> {
        let json = self.catalog.product_modifiers(product_id).await?;
        let rows = extract_picklist_rows(&json)?;
        let modifiers = extract_picklist_modifiers(&json)?;
        log::debug!(
            "Picklist for product {product_id}: {} row(s), {} modifier id(s)",
            rows.len(),
            modifiers.ids.len()
        );
        Ok(PicklistData { rows, modifiers })
    }
}

/// Result of applying a quantity control action to one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityUpdate {
    pub product_id: i64,
    pub qty: u32,
    pub valid: bool,
    pub can_submit: bool,
}

/// State of one rendered picklist.
#[derive(Debug, Clone)]
pub struct PicklistWidget {
    product_id: i64,
    ui: UiStateMachine,
    data: PicklistData,
    /// Raw text of each row's input, in row order.
    inputs: Vec<QuantityInput>,
}

impl PicklistWidget {
    pub fn new(product_id: i64) -> Self {
        Self {
            product_id,
            ui: UiStateMachine::new(),
            data: PicklistData::default(),
            inputs: Vec::new(),
        }
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn state(&self) -> &UiState {
        self.ui.state()
    }

    pub fn rows(&self) -> &[LineItemRow] {
        &self.data.rows
    }

    pub fn modifiers(&self) -> &PicklistModifiers {
        &self.data.modifiers
    }

    /// Enters `Loading` and drops the previous rows.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.data = PicklistData::default();
        self.inputs.clear();
        self.ui.begin_fetch()
    }

    /// Applies a fetch result if `ticket` is still current.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<PicklistData, WidgetError>) -> bool {
        if !self.ui.is_current(ticket) {
            log::info!("Ignoring stale picklist fetch for product {}", self.product_id);
            return false;
        }
        let resolution = match result {
            Ok(data) if data.rows.is_empty() => {
                self.data = data;
                Resolution::Empty
            }
            Ok(data) => {
                self.inputs = data
                    .rows
                    .iter()
                    .map(|row| QuantityInput {
                        product_id: row.product_id,
                        raw: QuantitySelection::for_row(row).qty.to_string(),
                    })
                    .collect();
                self.data = data;
                Resolution::Content
            }
            Err(err) => {
                log::error!("Picklist for product {} unavailable: {err}", self.product_id);
                Resolution::Error(UNAVAILABLE_MESSAGE.to_string())
            }
        };
        self.ui.resolve(ticket, resolution)
    }

    /// Current input text per row.
    pub fn inputs(&self) -> &[QuantityInput] {
        &self.inputs
    }

    pub fn input_for(&self, product_id: i64) -> Option<&str> {
        self.inputs
            .iter()
            .find(|input| input.product_id == product_id)
            .map(|input| input.raw.as_str())
    }

    /// True when every input passes validation.
    pub fn can_submit(&self, error_message: &str) -> bool {
        *self.ui.state() == UiState::Content
            && validate_all(&self.data.rows, &self.inputs, error_message).is_ok()
    }

    /// Runs the +/- buttons or a typed value through the quantity control and
    /// re-validates the whole picklist.
    pub fn apply_quantity(
        &mut self,
        product_id: i64,
        action: QuantityAction,
        raw: &str,
        error_message: &str,
    ) -> Result<QuantityUpdate, WidgetError> {
        let row = self
            .data
            .rows
            .iter()
            .find(|row| row.product_id == product_id)
            .ok_or_else(|| WidgetError::Data(format!("product {product_id} is not in the picklist")))?;

        if row.is_out_of_stock() || row.data_problem().is_some() {
            return Err(WidgetError::Data(format!(
                "quantity for product {product_id} is disabled"
            )));
        }

        let bounds = row.bounds();
        let (qty, text) = match action {
            QuantityAction::Set => (quantity::normalize(raw, bounds), raw.to_string()),
            _ => {
                let qty = quantity::apply(action, raw, bounds);
                (qty, qty.to_string())
            }
        };
        let valid = quantity::parse(&text).is_some_and(|q| bounds.contains(q));

        if let Some(input) = self.inputs.iter_mut().find(|i| i.product_id == product_id) {
            input.raw = text;
        }

        Ok(QuantityUpdate {
            product_id,
            qty,
            valid,
            can_submit: self.can_submit(error_message),
        })
    }
}
