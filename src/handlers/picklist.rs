use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::picklist_service::PicklistWidget;
use crate::application::submission::{QuantityInput, SubmissionReport};
use crate::domain::quantity::QuantityAction;
use crate::domain::ui_state::UiState;
use crate::errors::AppError;
use crate::render::markup::picklist_fragment;
use crate::render::view::picklist_view;
use crate::AppState;

use super::{html, ViewQuery, VIEW_HEADER};

pub const IN_FLIGHT_MESSAGE: &str = "Items are already being added to the cart.";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuantityActionRequest {
    Inc,
    Dec,
    Set,
}

impl From<QuantityActionRequest> for QuantityAction {
    fn from(action: QuantityActionRequest) -> Self {
        match action {
            QuantityActionRequest::Inc => QuantityAction::Increment,
            QuantityActionRequest::Dec => QuantityAction::Decrement,
            QuantityActionRequest::Set => QuantityAction::Set,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuantityRequest {
    pub view: Uuid,
    /// Row whose quantity changes.
    pub product_id: i64,
    pub action: QuantityActionRequest,
    /// Current text of the input; the typed value for `set`.
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuantityResponse {
    pub product_id: i64,
    pub qty: u32,
    pub valid: bool,
    pub can_submit: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuantityValue {
    pub product_id: i64,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub view: Option<Uuid>,
    pub quantities: Vec<QuantityValue>,
}

fn render(widget: &PicklistWidget, error_message: &str) -> String {
    let view = picklist_view(
        widget.product_id(),
        widget.state(),
        widget.rows(),
        |id| widget.input_for(id),
        widget.modifiers(),
        widget.can_submit(error_message),
    );
    picklist_fragment(&view)
}

fn valid_product_id(product_id: i64) -> Result<i64, AppError> {
    if product_id <= 0 {
        return Err(AppError::BadRequest(format!("Invalid product id {product_id}")));
    }
    Ok(product_id)
}

/// Fetches the picklist into the view's widget and returns the rendered
/// fragment.
async fn load(state: &AppState, view: Uuid, product_id: i64) -> Result<String, AppError> {
    let ticket = state
        .views
        .with_view(view, |session| session.picklist(product_id).begin_fetch())
        .ok_or_else(|| AppError::Internal(format!("view {view} disappeared")))?;

    let result = state.picklist.fetch(product_id).await;

    state
        .views
        .with_view(view, |session| {
            let widget = session.picklist(product_id);
            widget.complete(ticket, result);
            render(widget, &state.quantity_error_message)
        })
        .ok_or_else(|| AppError::Internal(format!("view {view} disappeared")))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /picklist/{product_id}
///
/// Renders the picklist fragment for a product page. Upstream failures
/// render an informational state rather than an error status.
#[utoipa::path(
    get,
    path = "/picklist/{product_id}",
    params(
        ("product_id" = i64, Path, description = "Parent product id"),
        ("view" = Option<Uuid>, Query, description = "Page-view id from a previous response"),
    ),
    responses(
        (status = 200, description = "Picklist fragment", body = String, content_type = "text/html"),
        (status = 400, description = "Invalid product id"),
    ),
    tag = "picklist"
)]
pub async fn get_picklist(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, AppError> {
    let product_id = valid_product_id(path.into_inner())?;
    let view = state.views.open(query.view);
    let body = load(&state, view, product_id).await?;

    Ok(html()
        .insert_header((VIEW_HEADER, view.to_string()))
        .body(body))
}

/// POST /picklist/{product_id}/quantity
///
/// Applies a +/-/typed change to one row and reports whether the whole
/// picklist can now be submitted.
#[utoipa::path(
    post,
    path = "/picklist/{product_id}/quantity",
    params(
        ("product_id" = i64, Path, description = "Parent product id"),
    ),
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "Quantity applied", body = QuantityResponse),
        (status = 400, description = "Row is disabled or not in the picklist"),
        (status = 404, description = "Unknown view or picklist not loaded"),
    ),
    tag = "picklist"
)]
pub async fn update_quantity(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<QuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = valid_product_id(path.into_inner())?;
    let body = body.into_inner();
    let message = state.quantity_error_message.as_str();

    let update = state
        .views
        .with_view(body.view, |session| {
            session.existing_picklist(product_id).map(|widget| {
                widget.apply_quantity(body.product_id, body.action.into(), &body.value, message)
            })
        })
        .flatten()
        .ok_or(AppError::NotFound)??;

    Ok(HttpResponse::Ok().json(QuantityResponse {
        product_id: update.product_id,
        qty: update.qty,
        valid: update.valid,
        can_submit: update.can_submit,
    }))
}

/// POST /picklist/{product_id}/cart
///
/// Validates every quantity, then adds the selected rows to the cart one at
/// a time. A failed add stops the remaining rows; items already added stay.
#[utoipa::path(
    post,
    path = "/picklist/{product_id}/cart",
    params(
        ("product_id" = i64, Path, description = "Parent product id"),
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Submission report", body = SubmissionReport),
        (status = 400, description = "Invalid product id"),
        (status = 409, description = "A submission is already in progress for this view", body = SubmissionReport),
        (status = 503, description = "Picklist could not be loaded"),
    ),
    tag = "picklist"
)]
pub async fn add_to_cart(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = valid_product_id(path.into_inner())?;
    let body = body.into_inner();
    let view = state.views.open(body.view);

    let Some(_in_flight) = state.views.begin_submission(view) else {
        return Ok(HttpResponse::Conflict()
            .insert_header((VIEW_HEADER, view.to_string()))
            .json(SubmissionReport::rejected(IN_FLIGHT_MESSAGE, Vec::new())));
    };

    let loaded = |session: &mut crate::session::ViewSession| {
        session
            .existing_picklist(product_id)
            .filter(|widget| *widget.state() == UiState::Content)
            .map(|widget| widget.rows().to_vec())
    };
    let rows = match state.views.with_view(view, loaded).flatten() {
        Some(rows) => rows,
        None => {
            log::info!("Picklist {product_id} not loaded for view {view}; fetching bounds");
            let data = state.picklist.fetch(product_id).await?;
            let rows = data.rows.clone();
            state.views.with_view(view, |session| {
                let widget = session.picklist(product_id);
                let ticket = widget.begin_fetch();
                widget.complete(ticket, Ok(data));
            });
            rows
        }
    };

    let inputs: Vec<QuantityInput> = body
        .quantities
        .into_iter()
        .map(|q| QuantityInput {
            product_id: q.product_id,
            raw: q.value,
        })
        .collect();

    let report = state
        .submission
        .submit_inputs(&rows, &inputs, &state.quantity_error_message)
        .await;

    log::info!(
        "Picklist {product_id} submission {:?}: {} of {} line(s) added",
        report.status,
        report.added_lines().count(),
        report.steps.len()
    );

    Ok(HttpResponse::Ok()
        .insert_header((VIEW_HEADER, view.to_string()))
        .json(report))
}
