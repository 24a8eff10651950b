pub mod downloads;
pub mod picklist;

use actix_web::{http::header::ContentType, HttpResponse, HttpResponseBuilder};
use serde::Deserialize;
use utoipa::OpenApi;
use uuid::Uuid;

pub const VIEW_HEADER: &str = "X-View-Id";

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub view: Option<Uuid>,
}

fn html() -> HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    builder
}

#[derive(OpenApi)]
#[openapi(
    paths(
        picklist::get_picklist,
        picklist::update_quantity,
        picklist::add_to_cart,
        downloads::get_downloads,
    ),
    tags(
        (name = "picklist", description = "Multi-item add-to-cart on product pages"),
        (name = "downloads", description = "Account downloads list"),
    )
)]
pub struct ApiDoc;
