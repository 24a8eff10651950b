//! View models for both widgets.
//!
//! These are pure functions of widget state; nothing here performs I/O or
//! produces markup. Text fields hold raw values and are escaped when
//! [`super::markup`] applies the view.

use bigdecimal::RoundingMode;

use crate::application::downloads_service::{NO_DOWNLOADS_MESSAGE, NO_MORE_RECORDS_MESSAGE};
use crate::domain::downloads::{DownloadEntry, DownloadsOutcome, PaginationState};
use crate::domain::picklist::{LineItemRow, PicklistModifiers};
use crate::domain::ui_state::{Regions, UiState};

pub const PRICE_UNAVAILABLE: &str = "Price unavailable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicklistRowView {
    pub product_id: i64,
    pub name: String,
    pub price: Option<String>,
    pub qty: String,
    pub min: u32,
    pub max: u32,
    pub disabled: bool,
    pub out_of_stock: bool,
    /// Set when the row's data is malformed; shown instead of the price.
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicklistView {
    pub product_id: i64,
    /// False when the product has no picklist; the page keeps its normal
    /// single add-to-cart.
    pub root_visible: bool,
    pub regions: Regions,
    pub error_message: Option<String>,
    pub rows: Vec<PicklistRowView>,
    pub add_enabled: bool,
    pub hidden_option_ids: Vec<i64>,
    pub hidden_option_names: Vec<String>,
}

pub fn format_price(row: &LineItemRow) -> Option<String> {
    row.price
        .as_ref()
        .map(|price| price.with_scale_round(2, RoundingMode::HalfUp).to_string())
}

fn picklist_row_view(row: &LineItemRow, qty: &str) -> PicklistRowView {
    let bounds = row.bounds();
    let placeholder = row.data_problem().map(|field| {
        log::warn!(
            "Picklist product {} rendered with a placeholder: invalid {field}",
            row.product_id
        );
        PRICE_UNAVAILABLE.to_string()
    });
    let out_of_stock = row.is_out_of_stock();
    PicklistRowView {
        product_id: row.product_id,
        name: row.name.clone(),
        price: format_price(row),
        qty: qty.to_string(),
        min: bounds.min,
        max: bounds.max,
        disabled: out_of_stock || placeholder.is_some(),
        out_of_stock,
        placeholder,
    }
}

/// `inputs` is the current text per product id; rows without one show `0`.
pub fn picklist_view<'a>(
    product_id: i64,
    state: &UiState,
    rows: &[LineItemRow],
    inputs: impl Fn(i64) -> Option<&'a str>,
    modifiers: &PicklistModifiers,
    can_submit: bool,
) -> PicklistView {
    let content = *state == UiState::Content;
    let rows: Vec<PicklistRowView> = if content {
        rows.iter()
            .map(|row| picklist_row_view(row, inputs(row.product_id).unwrap_or("0")))
            .collect()
    } else {
        Vec::new()
    };
    let (hidden_option_ids, hidden_option_names) = if content {
        (modifiers.ids.clone(), modifiers.display_names.clone())
    } else {
        (Vec::new(), Vec::new())
    };

    PicklistView {
        product_id,
        root_visible: *state != UiState::Empty,
        regions: state.regions(false),
        error_message: state.error_message().map(str::to_string),
        add_enabled: content && !rows.is_empty() && can_submit,
        rows,
        hidden_option_ids,
        hidden_option_names,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRowView {
    pub order_number: String,
    pub date: String,
    pub product_title: String,
    pub href: String,
    pub navigable: bool,
}

/// Pages shown on either side of the current one.
pub const PAGE_WINDOW: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: u32,
    pub current: bool,
    /// Pages between the previous link and this one are elided.
    pub gap_before: bool,
}

/// `None` for `previous`/`next` means the control renders disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub previous: Option<u32>,
    pub next: Option<u32>,
    pub pages: Vec<PageLink>,
    /// Only a Previous control is offered.
    pub previous_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadsView {
    pub regions: Regions,
    pub error_message: Option<String>,
    /// Informational notice shown in the list region.
    pub notice: Option<String>,
    pub rows: Vec<DownloadRowView>,
    pub pagination: Option<PaginationView>,
}

/// `en-US` medium date, e.g. `Nov 20, 2012`. Unparseable dates are shown
/// as sent.
pub fn format_date(entry: &DownloadEntry) -> String {
    match (&entry.date_created, &entry.date_raw) {
        (Some(date), _) => date.format("%b %-d, %Y").to_string(),
        (None, Some(raw)) => raw.clone(),
        (None, None) => String::new(),
    }
}

/// The first page, the last page and [`PAGE_WINDOW`] pages around the
/// current one.
fn page_links(current: u32, last: u32) -> Vec<PageLink> {
    let low = current.saturating_sub(PAGE_WINDOW).max(1);
    let high = current.saturating_add(PAGE_WINDOW).min(last);

    let mut numbers = Vec::with_capacity((2 * PAGE_WINDOW + 3) as usize);
    if low > 1 {
        numbers.push(1);
    }
    numbers.extend(low..=high);
    if high < last {
        numbers.push(last);
    }

    let mut previous = 0;
    numbers
        .into_iter()
        .map(|number| {
            let link = PageLink {
                number,
                current: number == current,
                gap_before: previous != 0 && number > previous + 1,
            };
            previous = number;
            link
        })
        .collect()
}

pub fn pagination_view(state: PaginationState) -> Option<PaginationView> {
    let state = state.clamped();
    if !state.has_multiple_pages() {
        return None;
    }
    let last = state.total_pages();
    let current = state.current_page;
    Some(PaginationView {
        previous: (current > 1).then(|| current - 1),
        next: (current < last).then(|| current + 1),
        pages: page_links(current, last),
        previous_only: false,
    })
}

impl DownloadsView {
    pub fn error(message: &str) -> Self {
        Self {
            regions: UiState::Error(message.to_string()).regions(false),
            error_message: Some(message.to_string()),
            notice: None,
            rows: Vec::new(),
            pagination: None,
        }
    }

    pub fn from_outcome(outcome: &DownloadsOutcome) -> Self {
        match outcome {
            DownloadsOutcome::Content(page) => {
                let pagination = pagination_view(page.pagination);
                Self {
                    regions: UiState::Content.regions(pagination.is_some()),
                    error_message: None,
                    notice: None,
                    rows: page
                        .entries
                        .iter()
                        .map(|entry| DownloadRowView {
                            order_number: entry.order_number.clone(),
                            date: format_date(entry),
                            product_title: entry.product_title.clone(),
                            href: entry.download_url.href().to_string(),
                            navigable: entry.download_url.is_navigable(),
                        })
                        .collect(),
                    pagination,
                }
            }
            DownloadsOutcome::Empty => Self {
                regions: UiState::Empty.regions(false),
                error_message: None,
                notice: Some(NO_DOWNLOADS_MESSAGE.to_string()),
                rows: Vec::new(),
                pagination: None,
            },
            DownloadsOutcome::NoMoreRecords { requested_page } => {
                let mut regions = UiState::Empty.regions(false);
                regions.pagination = true;
                Self {
                    regions,
                    error_message: None,
                    notice: Some(NO_MORE_RECORDS_MESSAGE.to_string()),
                    rows: Vec::new(),
                    pagination: Some(PaginationView {
                        previous: Some(requested_page.saturating_sub(1).max(1)),
                        next: None,
                        pages: Vec::new(),
                        previous_only: true,
                    }),
                }
            }
        }
    }
}
