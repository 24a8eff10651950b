use async_trait::async_trait;
use reqwest::Client;

use crate::application::submission::DEFAULT_FAILURE_MESSAGE;
use crate::config::AppConfig;
use crate::domain::errors::WidgetError;
use crate::domain::picklist::CartLine;
use crate::domain::ports::{CartAddReceipt, CartApi};
use crate::models::cart::CartAddEnvelope;
use crate::render::escape::strip_html;

pub const CART_ADD_PATH: &str = "/remote/v1/cart/add";

/// Storefront remote cart, one form POST per line.
#[derive(Debug, Clone)]
pub struct StorefrontCartClient {
    http: Client,
    add_url: String,
}

impl StorefrontCartClient {
    pub fn new(config: &AppConfig) -> Result<Self, WidgetError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| WidgetError::Config(format!("Failed to create cart client: {e}")))?;
        Ok(Self {
            http,
            add_url: format!(
                "{}{CART_ADD_PATH}",
                config.storefront_url.trim_end_matches('/')
            ),
        })
    }

    pub fn add_url(&self) -> &str {
        &self.add_url
    }
}

/// Form fields of a single cart add.
pub fn cart_add_form(line: CartLine) -> [(&'static str, String); 3] {
    [
        ("action", "add".to_string()),
        ("product_id", line.product_id.to_string()),
        ("qty[]", line.qty.to_string()),
    ]
}

/// Turns a decoded cart response into a receipt, or the cart's error text
/// with markup removed.
pub fn receipt_from(envelope: CartAddEnvelope) -> Result<CartAddReceipt, WidgetError> {
    if let Some(error) = envelope.data.error.as_deref().filter(|e| !e.trim().is_empty()) {
        return Err(WidgetError::Submission(strip_html(error)));
    }
    Ok(CartAddReceipt {
        cart_item_id: envelope.cart_item_id(),
    })
}

#[async_trait]
impl CartApi for StorefrontCartClient {
    async fn add_item(&self, line: CartLine) -> Result<CartAddReceipt, WidgetError> {
        log::debug!(
            "Cart add: product {} qty {} -> {}",
            line.product_id,
            line.qty,
            self.add_url
        );
        let response = self
            .http
            .post(&self.add_url)
            .header("Accept", "application/json")
            .form(&cart_add_form(line)[..])
            .send()
            .await
            .map_err(|e| WidgetError::Submission(strip_html(&e.to_string())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WidgetError::Submission(strip_html(&e.to_string())))?;
        let envelope = match serde_json::from_str::<CartAddEnvelope>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                log::error!(
                    "Unreadable cart response for product {} (status {}): {e}; body starts {:?}",
                    line.product_id,
                    status.as_u16(),
                    body.chars().take(200).collect::<String>()
                );
                return Err(WidgetError::Submission(DEFAULT_FAILURE_MESSAGE.to_string()));
            }
            Err(_) => CartAddEnvelope::default(),
        };

        if !status.is_success() && envelope.data.error.is_none() {
            return Err(WidgetError::Submission(format!(
                "Cart add failed with status {}",
                status.as_u16()
            )));
        }
        receipt_from(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn config_for(storefront: &str) -> AppConfig {
        let storefront = storefront.to_string();
        AppConfig::from_lookup(move |name| match name {
            "API_BASE_URL" => Some("https://api.example.com".to_string()),
            "STOREFRONT_URL" => Some(storefront.clone()),
            _ => None,
        })
        .unwrap()
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    /// Answers a single request with the given status line and body, and
    /// hands back the raw request it received.
    async fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request_complete(&request) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (origin, handle)
    }

    fn line() -> CartLine {
        CartLine {
            product_id: 12,
            qty: 3,
        }
    }

    #[test]
    fn form_matches_storefront_fields() {
        let form = cart_add_form(CartLine {
            product_id: 12,
            qty: 3,
        });
        assert_eq!(
            form,
            [
                ("action", "add".to_string()),
                ("product_id", "12".to_string()),
                ("qty[]", "3".to_string()),
            ]
        );
    }

    #[test]
    fn cart_error_is_stripped_of_markup() {
        let envelope: CartAddEnvelope = serde_json::from_value(json!({
            "data": { "error": "<strong>Only 2</strong> &amp; no more" }
        }))
        .unwrap();
        assert_eq!(
            receipt_from(envelope),
            Err(WidgetError::Submission("Only 2 & no more".into()))
        );
    }

    #[test]
    fn successful_add_returns_cart_item_id() {
        let envelope: CartAddEnvelope = serde_json::from_value(json!({
            "data": { "cart_item": { "id": "abc-1" }, "cart_id": "c1" }
        }))
        .unwrap();
        assert_eq!(
            receipt_from(envelope).unwrap().cart_item_id.as_deref(),
            Some("abc-1")
        );
    }

    #[test]
    fn add_url_joins_storefront_origin() {
        let config = AppConfig::from_lookup(|name| match name {
            "API_BASE_URL" => Some("https://api.example.com".to_string()),
            "STOREFRONT_URL" => Some("https://shop.example.com/".to_string()),
            _ => None,
        })
        .unwrap();
        let client = StorefrontCartClient::new(&config).unwrap();
        assert_eq!(client.add_url(), "https://shop.example.com/remote/v1/cart/add");
    }

    #[tokio::test]
    async fn html_reply_is_a_failed_add() {
        let (origin, served) =
            serve_once("200 OK", "text/html", "<html>Please sign in</html>").await;
        let client = StorefrontCartClient::new(&config_for(&origin)).unwrap();

        let result = client.add_item(line()).await;

        assert_eq!(
            result,
            Err(WidgetError::Submission(DEFAULT_FAILURE_MESSAGE.into()))
        );
        let request = served.await.unwrap();
        assert!(request.starts_with("POST /remote/v1/cart/add"), "{request}");
        assert!(request.contains("product_id=12"), "{request}");
    }

    #[tokio::test]
    async fn json_reply_with_numeric_cart_id_is_added() {
        let (origin, served) = serve_once(
            "200 OK",
            "application/json",
            r#"{"data":{"cart_item":{"id":"line-7"},"cart_id":991}}"#,
        )
        .await;
        let client = StorefrontCartClient::new(&config_for(&origin)).unwrap();

        let receipt = client.add_item(line()).await.unwrap();

        assert_eq!(receipt.cart_item_id.as_deref(), Some("line-7"));
        served.await.unwrap();
    }

    #[tokio::test]
    async fn server_error_without_json_reports_status() {
        let (origin, served) =
            serve_once("502 Bad Gateway", "text/plain", "upstream down").await;
        let client = StorefrontCartClient::new(&config_for(&origin)).unwrap();

        assert_eq!(
            client.add_item(line()).await,
            Err(WidgetError::Submission("Cart add failed with status 502".into()))
        );
        served.await.unwrap();
    }
}
