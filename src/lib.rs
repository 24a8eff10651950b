pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod models;
pub mod render;
pub mod session;

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web, App, HttpServer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::downloads_service::DownloadsService;
use application::picklist_service::PicklistService;
use application::submission::SubmissionCoordinator;
use config::AppConfig;
use domain::errors::WidgetError;
use domain::ports::{CartApi, CatalogApi, DownloadsApi};
use handlers::ApiDoc;
use infrastructure::{api_client::HttpApiClient, cart_client::StorefrontCartClient};
use session::ViewRegistry;

/// Everything the handlers share.
pub struct AppState {
    pub picklist: PicklistService,
    pub downloads: DownloadsService,
    pub submission: SubmissionCoordinator,
    pub views: ViewRegistry,
    pub downloads_per_page: u32,
    pub quantity_error_message: String,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        catalog: Arc<dyn CatalogApi>,
        downloads: Arc<dyn DownloadsApi>,
        cart: Arc<dyn CartApi>,
    ) -> Self {
        Self {
            picklist: PicklistService::new(catalog),
            downloads: DownloadsService::new(
                downloads,
                &config.api_base_url,
                config.downloads_customer_email.clone(),
            ),
            submission: SubmissionCoordinator::new(cart, config.cart_preview_enabled),
            views: ViewRegistry::default(),
            downloads_per_page: config.downloads_per_page,
            quantity_error_message: config.quantity_error_message.clone(),
        }
    }

    /// Wires the HTTP clients for the configured widget API and storefront.
    pub fn from_config(config: &AppConfig) -> Result<Self, WidgetError> {
        if config.date_locale != "en-US" {
            log::warn!(
                "DATE_LOCALE {} is not supported; download dates render as en-US",
                config.date_locale
            );
        }
        let api = Arc::new(HttpApiClient::new(config)?);
        let cart = Arc::new(StorefrontCartClient::new(config)?);
        Ok(Self::new(config, api.clone(), api, cart))
    }
}

/// The application with every route, the request logger and the OpenAPI
/// docs mounted.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(Logger::default())
        .service(
            web::scope("/picklist/{product_id}")
                .route("", web::get().to(handlers::picklist::get_picklist))
                .route("/quantity", web::post().to(handlers::picklist::update_quantity))
                .route("/cart", web::post().to(handlers::picklist::add_to_cart)),
        )
        .route("/downloads", web::get().to(handlers::downloads::get_downloads))
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
}

/// Binds the widget endpoints on `host:port`. Every worker shares the same
/// view registry and upstream clients.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    Ok(HttpServer::new(move || build_app(state.clone()))
        .bind((host.to_string(), port))?
        .run())
}
