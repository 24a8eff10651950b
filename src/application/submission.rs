//! Validation and sequential cart submission for the picklist.
//!
//! Submission is an ordered pipeline: each selected line is one step, a step
//! is only issued after the previous one's response has been observed, and
//! the first failure leaves every later step `NotAttempted`. Items already
//! added stay in the cart.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::errors::WidgetError;
use crate::domain::picklist::{CartLine, LineItemRow, QuantitySelection};
use crate::domain::ports::CartApi;
use crate::domain::quantity;

pub const EMPTY_SELECTION_MESSAGE: &str = "Select a quantity for at least one item.";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to add items to cart.";

/// Raw text of one quantity input as the page sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityInput {
    pub product_id: i64,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub product_id: i64,
    pub message: String,
}

impl FieldError {
    fn from_errors(errors: Vec<WidgetError>) -> Vec<Self> {
        errors
            .into_iter()
            .filter_map(|err| match err {
                WidgetError::Validation {
                    product_id,
                    message,
                } => Some(FieldError {
                    product_id,
                    message,
                }),
                _ => None,
            })
            .collect()
    }
}

/// Checks every rendered row's input against its bounds.
///
/// Rows with no input count as the default `0`. Inputs for products that are
/// not rendered are ignored. Any single invalid input fails the whole pass.
pub fn validate_all(
    rows: &[LineItemRow],
    inputs: &[QuantityInput],
    error_message: &str,
) -> Result<Vec<QuantitySelection>, Vec<WidgetError>> {
    let by_product: HashMap<i64, &str> = inputs
        .iter()
        .map(|input| (input.product_id, input.raw.as_str()))
        .collect();

    for input in inputs {
        if !rows.iter().any(|row| row.product_id == input.product_id) {
            log::warn!(
                "Ignoring quantity for product {} which is not in the picklist",
                input.product_id
            );
        }
    }

    let mut selections = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();
    for row in rows {
        let bounds = row.bounds();
        let raw = by_product.get(&row.product_id).copied().unwrap_or("0");
        match quantity::parse(raw).filter(|qty| bounds.contains(*qty)) {
            Some(qty) => selections.push(QuantitySelection {
                product_id: row.product_id,
                qty,
                bounds,
            }),
            None => errors.push(WidgetError::Validation {
                product_id: row.product_id,
                message: error_message.to_string(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(selections)
    } else {
        log::info!("Picklist validation failed for {} input(s)", errors.len());
        Err(errors)
    }
}

/// Rows with a positive quantity, in row order.
pub fn collect_selections(selections: &[QuantitySelection]) -> Vec<CartLine> {
    selections
        .iter()
        .filter(|sel| sel.qty > 0)
        .map(|sel| CartLine {
            product_id: sel.product_id,
            qty: sel.qty,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    Added { cart_item_id: Option<String> },
    Failed { message: String },
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubmissionStep {
    pub product_id: i64,
    pub qty: u32,
    pub outcome: StepOutcome,
}

/// How the page should reflect the new cart contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefreshAction {
    Preview { cart_item_id: String },
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Every selected line was added.
    Added,
    /// A cart add failed; later lines were not sent.
    Failed,
    /// Nothing was sent: validation failed, nothing was selected or another
    /// submission is still running.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubmissionReport {
    pub status: SubmissionStatus,
    pub message: Option<String>,
    pub field_errors: Vec<FieldError>,
    pub steps: Vec<SubmissionStep>,
    pub refresh: Option<RefreshAction>,
}

impl SubmissionReport {
    pub fn rejected(message: impl Into<String>, field_errors: Vec<FieldError>) -> Self {
        Self {
            status: SubmissionStatus::Rejected,
            message: Some(message.into()),
            field_errors,
            steps: Vec::new(),
            refresh: None,
        }
    }

    pub fn added_lines(&self) -> impl Iterator<Item = &SubmissionStep> {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, StepOutcome::Added { .. }))
    }
}

#[derive(Clone)]
pub struct SubmissionCoordinator {
    cart: Arc<dyn CartApi>,
    preview_enabled: bool,
}

impl SubmissionCoordinator {
    pub fn new(cart: Arc<dyn CartApi>, preview_enabled: bool) -> Self {
        Self {
            cart,
            preview_enabled,
        }
    }

    /// Validates, then adds the selected lines one at a time.
    pub async fn submit_inputs(
        &self,
        rows: &[LineItemRow],
        inputs: &[QuantityInput],
        error_message: &str,
    ) -> SubmissionReport {
        let selections = match validate_all(rows, inputs, error_message) {
            Ok(selections) => selections,
            Err(errors) => {
                return SubmissionReport::rejected(error_message, FieldError::from_errors(errors))
            }
        };
        self.submit(collect_selections(&selections)).await
    }

    pub async fn submit(&self, lines: Vec<CartLine>) -> SubmissionReport {
        if lines.is_empty() {
            return SubmissionReport::rejected(EMPTY_SELECTION_MESSAGE, Vec::new());
        }

        let mut steps: Vec<SubmissionStep> = lines
            .iter()
            .map(|line| SubmissionStep {
                product_id: line.product_id,
                qty: line.qty,
                outcome: StepOutcome::NotAttempted,
            })
            .collect();

        let mut last_cart_item_id = None;
        let mut failure = None;

        for (line, step) in lines.iter().zip(steps.iter_mut()) {
            log::debug!("Adding product {} x{} to cart", line.product_id, line.qty);
            match self.cart.add_item(*line).await {
                Ok(receipt) => {
                    if receipt.cart_item_id.is_some() {
                        last_cart_item_id.clone_from(&receipt.cart_item_id);
                    }
                    step.outcome = StepOutcome::Added {
                        cart_item_id: receipt.cart_item_id,
                    };
                }
                Err(err) => {
                    let message = failure_message(&err);
                    log::error!(
                        "Cart add failed for product {}: {}; remaining items not sent",
                        line.product_id,
                        err
                    );
                    step.outcome = StepOutcome::Failed {
                        message: message.clone(),
                    };
                    failure = Some(message);
                    break;
                }
            }
        }

        if let Some(message) = failure {
            return SubmissionReport {
                status: SubmissionStatus::Failed,
                message: Some(message),
                field_errors: Vec::new(),
                steps,
                refresh: None,
            };
        }

        let refresh = match last_cart_item_id {
            Some(cart_item_id) if self.preview_enabled => RefreshAction::Preview { cart_item_id },
            _ => RefreshAction::Reload,
        };
        log::info!("Added {} picklist line(s) to cart", steps.len());

        SubmissionReport {
            status: SubmissionStatus::Added,
            message: None,
            field_errors: Vec::new(),
            steps,
            refresh: Some(refresh),
        }
    }
}

fn failure_message(err: &WidgetError) -> String {
    match err {
        WidgetError::Submission(message) if !message.trim().is_empty() => message.clone(),
        _ => DEFAULT_FAILURE_MESSAGE.to_string(),
    }
}
