use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::downloads_service::user_message;
use crate::application::identity::CustomerContext;
use crate::errors::AppError;
use crate::render::markup::downloads_fragment;
use crate::render::view::DownloadsView;
use crate::AppState;

use super::{html, VIEW_HEADER};

pub const GENERATION_HEADER: &str = "X-Fetch-Generation";
pub const STALE_HEADER: &str = "X-Fetch-Stale";

/// Query string of the downloads fragment. The email fields carry whatever
/// the page could find out about the signed-in customer.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadsQuery {
    pub view: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub context_email: Option<String>,
    #[serde(alias = "email")]
    pub customer_email: Option<String>,
    pub customer_data_email: Option<String>,
    pub hidden_field_email: Option<String>,
    pub data_email: Option<String>,
}

impl DownloadsQuery {
    fn context(&self) -> CustomerContext {
        CustomerContext {
            configured_email: self.context_email.clone(),
            customer_email: self.customer_email.clone(),
            customer_data_email: self.customer_data_email.clone(),
            hidden_field_email: self.hidden_field_email.clone(),
            data_email: self.data_email.clone(),
        }
    }
}

/// GET /downloads
///
/// Renders one page of the account downloads list. A response whose fetch
/// was overtaken by a newer one for the same view is flagged stale and
/// leaves the view's pagination untouched.
#[utoipa::path(
    get,
    path = "/downloads",
    params(
        ("view" = Option<Uuid>, Query, description = "Page-view id from a previous response"),
        ("page" = Option<u32>, Query, description = "Page number (1-based, default 1)"),
        ("per_page" = Option<u32>, Query, description = "Orders per page (defaults to DOWNLOADS_PER_PAGE)"),
        ("context_email" = Option<String>, Query, description = "Email configured for the widget"),
        ("customer_email" = Option<String>, Query, description = "Email of the page context customer"),
        ("customer_data_email" = Option<String>, Query, description = "Email of the global customer data"),
        ("hidden_field_email" = Option<String>, Query, description = "Email on the hidden customer id field"),
        ("data_email" = Option<String>, Query, description = "Email on any data-customer-email attribute"),
    ),
    responses(
        (status = 200, description = "Downloads fragment", body = String, content_type = "text/html"),
    ),
    tag = "downloads"
)]
pub async fn get_downloads(
    state: web::Data<AppState>,
    query: web::Query<DownloadsQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let view = state.views.open(query.view);
    let page = query.page.unwrap_or(1).max(1);

    let (ticket, per_page, remembered_email) = state
        .views
        .with_view(view, |session| {
            let widget = session.downloads(state.downloads_per_page);
            let ticket = widget.begin_fetch(page, query.per_page);
            (
                ticket,
                widget.pagination().per_page,
                widget.customer_email().map(str::to_string),
            )
        })
        .ok_or_else(|| AppError::Internal(format!("view {view} disappeared")))?;

    let context = query
        .context()
        .with_default_email(remembered_email.as_deref());
    let result = state.downloads.fetch_page(context, page, per_page).await;

    let applied = state
        .views
        .with_view(view, |session| {
            session
                .downloads(state.downloads_per_page)
                .complete(ticket, &result)
        })
        .unwrap_or(false);

    let rendered = match &result {
        Ok(fetched) => DownloadsView::from_outcome(&fetched.outcome),
        Err(err) => DownloadsView::error(&user_message(err)),
    };

    let mut response = html();
    response
        .insert_header((VIEW_HEADER, view.to_string()))
        .insert_header((GENERATION_HEADER, ticket.generation().to_string()));
    if !applied {
        response.insert_header((STALE_HEADER, "true"));
    }
    Ok(response.body(downloads_fragment(&rendered)))
}
