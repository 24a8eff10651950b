//! Normalizes raw API payloads into picklist rows and download pages.

use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::downloads::{DownloadEntry, DownloadsOutcome, DownloadsPage, PaginationState};
use crate::domain::errors::WidgetError;
use crate::domain::picklist::{LineItemRow, PicklistModifiers};
use crate::models::downloads::{OrderWithLinks, OrdersWithLinksEnvelope};
use crate::models::modifiers::{ModifierDetails, ModifierProduct, ModifiersEnvelope};
use crate::render::download_link::build_download_url;

/// Name/SKU fragments that mark a product as digital when the API does not
/// say so explicitly.
pub const DIGITAL_KEYWORDS: [&str; 12] = [
    "mp3",
    "mp4",
    "pdf",
    "epub",
    "mobi",
    "zip",
    "download",
    "digital",
    "ebook",
    "audiobook",
    "video",
    "stream",
];

// ── Scalar coercion ──────────────────────────────────────────────────────────

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_negative_count(value: &Value) -> Option<u64> {
    value_i64(value).and_then(|n| u64::try_from(n).ok())
}

fn positive_u32(value: &Value) -> Option<u32> {
    value_i64(value)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
}

/// A numeric page field, pulled into `[1, u32::MAX]` so a present zero or
/// negative page still counts as given.
fn page_number(value: &Value) -> Option<u32> {
    value_i64(value).and_then(|n| u32::try_from(n.clamp(1, i64::from(u32::MAX))).ok())
}

fn value_decimal(value: &Value) -> Option<BigDecimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    BigDecimal::from_str(&text).ok()
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// First source that is present and valid, in the given order.
///
/// A present value that fails `parse` is logged and skipped; `null` counts as
/// absent.
fn first_present<T>(
    sources: &[(&str, Option<&Value>)],
    parse: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    for &(field, value) in sources {
        let Some(value) = value else { continue };
        match parse(value) {
            Some(parsed) => return Some(parsed),
            None => log::warn!("Ignoring invalid pagination field {field}: {value}"),
        }
    }
    None
}

// ── Picklist ─────────────────────────────────────────────────────────────────

fn parse_modifiers(json: &Value) -> Result<ModifiersEnvelope, WidgetError> {
    ModifiersEnvelope::deserialize(json)
        .map_err(|e| WidgetError::Network(format!("Malformed modifiers payload: {e}")))
}

/// Explicit `is_digital` booleans win; otherwise the name or SKU is searched
/// for a [`DIGITAL_KEYWORDS`] entry.
pub fn is_digital_product(is_digital: Option<&Value>, name: &str, sku: &str) -> bool {
    if let Some(Value::Bool(flag)) = is_digital {
        return *flag;
    }
    let name = name.to_lowercase();
    let sku = sku.to_lowercase();
    DIGITAL_KEYWORDS
        .iter()
        .any(|keyword| name.contains(keyword) || sku.contains(keyword))
}

fn normalize_product(product: &ModifierProduct) -> Option<LineItemRow> {
    let product_id = match product.id.as_ref().and_then(value_i64) {
        Some(id) if id != 0 => id,
        _ => {
            log::warn!("Skipping picklist product without a usable id: {:?}", product.id);
            return None;
        }
    };

    let raw_name = product.name.as_ref().and_then(value_text).unwrap_or_default();
    let sku = product.sku.as_ref().and_then(value_text).unwrap_or_default();

    let price = product
        .price
        .as_ref()
        .and_then(value_decimal)
        .filter(|p| *p >= BigDecimal::zero());
    if price.is_none() {
        log::warn!(
            "Picklist product {product_id} has a non-numeric price: {:?}",
            product.price
        );
    }
    let inventory_level = product
        .inventory_level
        .as_ref()
        .and_then(value_i64)
        .filter(|level| *level >= 0);

    let is_digital = is_digital_product(product.is_digital.as_ref(), &raw_name, &sku);
    let name = if raw_name.is_empty() {
        format!("Product {product_id}")
    } else {
        raw_name
    };

    Some(LineItemRow {
        product_id,
        name,
        sku,
        price,
        inventory_level,
        is_visible: truthy(product.is_visible.as_ref()),
        is_digital,
    })
}

/// Rows from every `product_list_with_images` group, in payload order.
pub fn extract_picklist_rows(json: &Value) -> Result<Vec<LineItemRow>, WidgetError> {
    let envelope = parse_modifiers(json)?;
    Ok(envelope
        .groups()
        .iter()
        .filter(|group| group.is_picklist())
        .flat_map(|group| group.products())
        .filter_map(|product| normalize_product(&product))
        .collect())
}

/// De-duplicated modifier ids and labels of the picklist groups.
pub fn extract_picklist_modifiers(json: &Value) -> Result<PicklistModifiers, WidgetError> {
    let envelope = parse_modifiers(json)?;
    let mut modifiers = PicklistModifiers::default();

    for details in envelope
        .groups()
        .into_iter()
        .filter_map(|group| group.modifier_details)
        .filter(ModifierDetails::is_picklist)
    {
        if let Some(id) = details.modifier_id.as_ref().and_then(value_i64) {
            if !modifiers.ids.contains(&id) {
                modifiers.ids.push(id);
            }
        }
        for name in [&details.modifier_display_name, &details.modifier_name]
            .into_iter()
            .flatten()
            .filter_map(value_text)
            .filter(|name| !name.is_empty())
        {
            if !modifiers.display_names.contains(&name) {
                modifiers.display_names.push(name);
            }
        }
    }

    Ok(modifiers)
}

// ── Downloads ────────────────────────────────────────────────────────────────

/// Inputs for turning a downloads payload into a page.
#[derive(Debug, Clone)]
pub struct DownloadsRequest<'a> {
    pub requested_page: u32,
    pub requested_per_page: u32,
    /// Base URL (trailing slash trimmed) that download links hang off.
    pub link_base: &'a str,
    /// The identity the page was fetched for, used for fallback links.
    pub customer_email: &'a str,
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Numeric creation dates are Unix seconds.
fn order_date(value: &Value, raw: Option<&str>) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => raw.and_then(parse_date),
    }
}

fn order_entries(order: &OrderWithLinks, request: &DownloadsRequest<'_>) -> Vec<DownloadEntry> {
    let order_id = order.order_id.as_ref().and_then(value_text);
    let order_number = order
        .order_number
        .as_ref()
        .and_then(value_text)
        .or_else(|| order_id.clone())
        .unwrap_or_default();
    let date_raw = order
        .date_created
        .as_ref()
        .and_then(value_text)
        .filter(|d| !d.is_empty());
    let date_created = order
        .date_created
        .as_ref()
        .and_then(|value| order_date(value, date_raw.as_deref()));

    order
        .links()
        .iter()
        .map(|link| {
            let sku = link.sku.as_ref().and_then(value_text);
            let download_url = build_download_url(
                request.link_base,
                link.download_link.as_ref().and_then(Value::as_str),
                order_id.as_deref(),
                sku.as_deref(),
                Some(request.customer_email),
            );
            DownloadEntry {
                order_number: order_number.clone(),
                order_id: order_id.clone(),
                date_created,
                date_raw: date_raw.clone(),
                product_title: link
                    .product_title
                    .as_ref()
                    .and_then(value_text)
                    .unwrap_or_default(),
                sku,
                download_url,
            }
        })
        .collect()
}

/// Pagination fields are read in a fixed precedence because deployments
/// disagree on naming: `current_page` then `page`; `per_page` then `limit`;
/// total from `pagination.total_orders_checked`, then `orders_count`,
/// `total_orders`, `total_records`, then the number of link-bearing orders.
pub fn resolve_pagination(
    envelope: &OrdersWithLinksEnvelope,
    link_bearing_orders: usize,
    request: &DownloadsRequest<'_>,
) -> PaginationState {
    let fields = envelope.pagination.clone().unwrap_or_default();

    let current_page = first_present(
        &[
            ("pagination.current_page", fields.current_page.as_ref()),
            ("pagination.page", fields.page.as_ref()),
        ],
        page_number,
    )
    .unwrap_or(request.requested_page);

    let per_page = first_present(
        &[
            ("pagination.per_page", fields.per_page.as_ref()),
            ("pagination.limit", fields.limit.as_ref()),
        ],
        positive_u32,
    )
    .unwrap_or(request.requested_per_page);

    let total_count = first_present(
        &[
            (
                "pagination.total_orders_checked",
                fields.total_orders_checked.as_ref(),
            ),
            ("orders_count", envelope.orders_count.as_ref()),
            ("total_orders", envelope.total_orders.as_ref()),
            ("total_records", envelope.total_records.as_ref()),
        ],
        non_negative_count,
    )
    .unwrap_or(link_bearing_orders as u64);

    PaginationState {
        current_page,
        per_page,
        total_count,
    }
    .clamped()
}

/// Classifies and normalizes one downloads page.
pub fn extract_downloads_page(
    json: &Value,
    request: &DownloadsRequest<'_>,
) -> Result<DownloadsOutcome, WidgetError> {
    let envelope = OrdersWithLinksEnvelope::deserialize(json)
        .map_err(|e| WidgetError::Network(format!("Malformed downloads payload: {e}")))?;

    if envelope.success != Some(true) {
        let message = envelope
            .message_text()
            .unwrap_or_else(|| "Failed to fetch downloads".to_string());
        return Err(WidgetError::Network(message));
    }

    let link_bearing: Vec<OrderWithLinks> = envelope
        .orders()
        .into_iter()
        .filter(OrderWithLinks::has_links)
        .collect();

    if link_bearing.is_empty() {
        return Ok(if request.requested_page > 1 {
            log::info!(
                "No more downloadable records on page {}",
                request.requested_page
            );
            DownloadsOutcome::NoMoreRecords {
                requested_page: request.requested_page,
            }
        } else {
            DownloadsOutcome::Empty
        });
    }

    let pagination = resolve_pagination(&envelope, link_bearing.len(), request);
    let entries = link_bearing
        .into_iter()
        .flat_map(|order| order_entries(&order, request))
        .collect();

    Ok(DownloadsOutcome::Content(DownloadsPage {
        entries,
        pagination,
    }))
}
