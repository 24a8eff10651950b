//! Download URLs for the account downloads table.
//!
//! The download endpoint expects `data` to be the standard base64 encoding
//! of `order_id={id}&sku={sku}&customer_email={email}` with only the email
//! percent-encoded, and the resulting base64 text percent-encoded again.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::domain::downloads::DownloadUrl;

pub const DOWNLOAD_PATH: &str = "/account/download";

/// The query string that gets base64-encoded into the `data` parameter.
pub fn download_query(order_id: &str, sku: &str, customer_email: &str) -> String {
    format!(
        "order_id={}&sku={}&customer_email={}",
        order_id,
        sku,
        urlencoding::encode(customer_email)
    )
}

pub fn encode_download_data(order_id: &str, sku: &str, customer_email: &str) -> String {
    STANDARD.encode(download_query(order_id, sku, customer_email))
}

/// Inverse of [`encode_download_data`], accepting the still
/// percent-encoded parameter value taken from a URL.
pub fn decode_download_data(data: &str) -> Option<String> {
    let unescaped = urlencoding::decode(data).ok()?;
    let bytes = STANDARD.decode(unescaped.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Builds the link for one download.
///
/// `base_url` must already have its trailing slash trimmed.
pub fn build_download_url(
    base_url: &str,
    server_link: Option<&str>,
    order_id: Option<&str>,
    sku: Option<&str>,
    customer_email: Option<&str>,
) -> DownloadUrl {
    if let Some(link) = server_link.map(str::trim).filter(|l| !l.is_empty()) {
        return DownloadUrl::Server(format!("{base_url}{link}"));
    }

    fn present(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|v| !v.is_empty())
    }
    match (present(order_id), present(sku), present(customer_email)) {
        (Some(order_id), Some(sku), Some(email)) => {
            let data = encode_download_data(order_id, sku, email);
            DownloadUrl::Constructed(format!(
                "{base_url}{DOWNLOAD_PATH}?data={}",
                urlencoding::encode(&data)
            ))
        }
        (order_id, sku, email) => {
            log::warn!(
                "Missing data for download link: order_id={:?} sku={:?} email_present={}",
                order_id,
                sku,
                email.is_some()
            );
            DownloadUrl::Missing
        }
    }
}
