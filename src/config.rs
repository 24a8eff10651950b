use std::time::Duration;

use reqwest::Url;

use crate::domain::errors::WidgetError;

pub const PRODUCT_ID_PLACEHOLDER: &str = "{{productId}}";
pub const DEFAULT_MODIFIERS_ENDPOINT: &str = "/products/{{productId}}/modifiers";
pub const DEFAULT_DOWNLOADS_ENDPOINT: &str = "/customers/orders-with-links";
pub const DEFAULT_QUANTITY_ERROR: &str = "Please enter a valid quantity.";

/// Settings for the widget service, read from the environment after
/// `dotenvy::dotenv()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Widget API base without a trailing slash.
    pub api_base_url: String,
    pub product_modifiers_endpoint: String,
    pub customer_downloads_endpoint: String,
    /// Storefront origin without a trailing slash.
    pub storefront_url: String,
    pub cart_preview_enabled: bool,
    pub downloads_per_page: u32,
    pub downloads_customer_email: Option<String>,
    pub http_timeout: Duration,
    pub quantity_error_message: String,
    pub date_locale: String,
    pub host: String,
    pub port: u16,
}

fn absolute_url(name: &str, value: Option<String>) -> Result<String, WidgetError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WidgetError::Config(format!("{name} must be set")))?;
    Url::parse(&value).map_err(|e| WidgetError::Config(format!("{name} is not a valid URL: {e}")))?;
    Ok(value.trim_end_matches('/').to_string())
}

fn number<T: std::str::FromStr>(name: &str, value: Option<String>, default: T) -> Result<T, WidgetError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| WidgetError::Config(format!("{name} must be a valid number, got '{raw}'"))),
    }
}

fn flag(name: &str, value: Option<String>, default: bool) -> Result<bool, WidgetError> {
    match value.as_deref().map(str::trim) {
        None => Ok(default),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => Err(WidgetError::Config(format!(
            "{name} must be true or false, got '{other}'"
        ))),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, WidgetError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WidgetError> {
        let product_modifiers_endpoint = lookup("PRODUCT_MODIFIERS_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_MODIFIERS_ENDPOINT.to_string());
        if !product_modifiers_endpoint.contains(PRODUCT_ID_PLACEHOLDER) {
            return Err(WidgetError::Config(format!(
                "PRODUCT_MODIFIERS_ENDPOINT must contain {PRODUCT_ID_PLACEHOLDER}"
            )));
        }

        let downloads_per_page = number("DOWNLOADS_PER_PAGE", lookup("DOWNLOADS_PER_PAGE"), 5u32)?;
        if downloads_per_page == 0 {
            return Err(WidgetError::Config(
                "DOWNLOADS_PER_PAGE must be at least 1".to_string(),
            ));
        }

        let timeout_secs = number("HTTP_TIMEOUT_SECS", lookup("HTTP_TIMEOUT_SECS"), 10u64)?;
        if timeout_secs == 0 {
            return Err(WidgetError::Config(
                "HTTP_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_base_url: absolute_url("API_BASE_URL", lookup("API_BASE_URL"))?,
            product_modifiers_endpoint,
            customer_downloads_endpoint: lookup("CUSTOMER_DOWNLOADS_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_DOWNLOADS_ENDPOINT.to_string()),
            storefront_url: absolute_url("STOREFRONT_URL", lookup("STOREFRONT_URL"))?,
            cart_preview_enabled: flag("CART_PREVIEW_ENABLED", lookup("CART_PREVIEW_ENABLED"), true)?,
            downloads_per_page,
            downloads_customer_email: lookup("DOWNLOADS_CUSTOMER_EMAIL")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            http_timeout: Duration::from_secs(timeout_secs),
            quantity_error_message: lookup("QUANTITY_ERROR_MESSAGE")
                .unwrap_or_else(|| DEFAULT_QUANTITY_ERROR.to_string()),
            date_locale: lookup("DATE_LOCALE").unwrap_or_else(|| "en-US".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: number("PORT", lookup("PORT"), 8080u16)?,
        })
    }
}
