//! HTML fragments for the view models in [`super::view`].
//!
//! Every piece of server data passes through [`escape_html`] before it lands
//! in markup, attributes included.

use super::escape::escape_html;
use super::view::{DownloadsView, PaginationView, PicklistView};

pub const DOWNLOAD_INSTRUCTIONS: &str =
    "Click an order number or product name to download your file.";

fn hidden(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        " hidden"
    }
}

fn disabled(off: bool) -> &'static str {
    if off {
        " disabled"
    } else {
        ""
    }
}

fn joined<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn picklist_fragment(view: &PicklistView) -> String {
    if !view.root_visible {
        return format!(
            r#"<div class="picklist" data-product-id="{}" data-picklist-empty hidden></div>"#,
            view.product_id
        );
    }

    let mut html = format!(
        r#"<div class="picklist" data-product-id="{}" data-hidden-option-ids="{}" data-hidden-option-names="{}">"#,
        view.product_id,
        escape_html(&joined(&view.hidden_option_ids)),
        escape_html(&view.hidden_option_names.join(",")),
    );
    html.push_str(&format!(
        r#"<div class="picklist-loading"{}>Loading...</div>"#,
        hidden(view.regions.loading)
    ));
    html.push_str(&format!(
        r#"<p class="picklist-message"{}>{}</p>"#,
        hidden(view.regions.error),
        escape_html(view.error_message.as_deref().unwrap_or_default())
    ));

    html.push_str(&format!(
        r#"<table class="picklist-table"{}><thead><tr><th>Product</th><th>Price</th><th>Quantity</th></tr></thead><tbody>"#,
        hidden(view.regions.list)
    ));
    for row in &view.rows {
        let price = match (&row.placeholder, &row.price) {
            (Some(placeholder), _) => {
                format!(r#"<span class="price-unavailable">{}</span>"#, escape_html(placeholder))
            }
            (None, Some(price)) => escape_html(price),
            (None, None) => String::new(),
        };
        let stock = if row.out_of_stock {
            r#" <span class="out-of-stock">Out of stock</span>"#
        } else {
            ""
        };
        html.push_str(&format!(
            concat!(
                r#"<tr data-product-id="{id}"><td>{name}{stock}</td><td>{price}</td>"#,
                r#"<td class="quantity"><button type="button" data-action="dec"{dis}>&minus;</button>"#,
                r#"<input type="text" inputmode="numeric" name="qty[{id}]" value="{qty}" "#,
                r#"data-min="{min}" data-max="{max}" data-prevent-enter{dis}>"#,
                r#"<button type="button" data-action="inc"{dis}>+</button></td></tr>"#,
            ),
            id = row.product_id,
            name = escape_html(&row.name),
            stock = stock,
            price = price,
            qty = escape_html(&row.qty),
            min = row.min,
            max = row.max,
            dis = disabled(row.disabled),
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(&format!(
        r#"<button type="button" class="picklist-add"{}{}>Add to Cart</button></div>"#,
        hidden(view.regions.list),
        disabled(!view.add_enabled)
    ));
    html
}

fn pagination_fragment(pagination: &PaginationView) -> String {
    let control = |label: &str, target: Option<u32>| match target {
        Some(page) => format!(r#"<button type="button" data-page="{page}">{label}</button>"#),
        None => format!(r#"<button type="button" disabled>{label}</button>"#),
    };

    let mut html = String::from(r#"<nav class="downloads-pagination">"#);
    html.push_str(&control("Previous", pagination.previous));
    if !pagination.previous_only {
        for link in &pagination.pages {
            if link.gap_before {
                html.push_str(r#"<span class="gap">&hellip;</span>"#);
            }
            if link.current {
                html.push_str(&format!(
                    r#"<span class="current" aria-current="page">{}</span>"#,
                    link.number
                ));
            } else {
                html.push_str(&format!(
                    r#"<button type="button" data-page="{0}">{0}</button>"#,
                    link.number
                ));
            }
        }
        html.push_str(&control("Next", pagination.next));
    }
    html.push_str("</nav>");
    html
}

pub fn downloads_fragment(view: &DownloadsView) -> String {
    let mut html = String::from(r#"<div class="downloads">"#);
    html.push_str(&format!(
        r#"<div class="downloads-loading"{}>Loading...</div>"#,
        hidden(view.regions.loading)
    ));
    html.push_str(&format!(
        r#"<p class="downloads-error"{}>{}</p>"#,
        hidden(view.regions.error),
        escape_html(view.error_message.as_deref().unwrap_or_default())
    ));

    html.push_str(&format!(r#"<div class="downloads-list"{}>"#, hidden(view.regions.list)));
    if let Some(notice) = &view.notice {
        html.push_str(&format!(r#"<p class="downloads-notice">{}</p>"#, escape_html(notice)));
    }
    if !view.rows.is_empty() {
        html.push_str(&format!(r#"<p class="downloads-instructions">{DOWNLOAD_INSTRUCTIONS}</p>"#));
        html.push_str(
            "<table><thead><tr><th>Order#</th><th>Creation Date</th><th>Product Name</th></tr></thead><tbody>",
        );
        for row in &view.rows {
            let href = escape_html(&row.href);
            let class = if row.navigable { "" } else { r#" class="missing-data""# };
            html.push_str(&format!(
                concat!(
                    r#"<tr><td><a href="{href}" target="_blank"{class}>{order}</a></td>"#,
                    r#"<td>{date}</td>"#,
                    r#"<td><a href="{href}" target="_blank"{class}>{title}</a></td></tr>"#,
                ),
                href = href,
                class = class,
                order = escape_html(&row.order_number),
                date = escape_html(&row.date),
                title = escape_html(&row.product_title),
            ));
        }
        html.push_str("</tbody></table>");
    }
    html.push_str("</div>");

    if let (true, Some(pagination)) = (view.regions.pagination, &view.pagination) {
        html.push_str(&pagination_fragment(pagination));
    }
    html.push_str("</div>");
    html
}
