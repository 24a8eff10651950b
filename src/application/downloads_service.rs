use std::sync::Arc;

use crate::domain::downloads::{DownloadsOutcome, PaginationState};
use crate::domain::errors::WidgetError;
use crate::domain::ports::DownloadsApi;
use crate::domain::ui_state::{FetchTicket, Resolution, UiState, UiStateMachine};

use super::identity::CustomerContext;
use super::row_extractor::{extract_downloads_page, DownloadsRequest};

pub const NO_DOWNLOADS_MESSAGE: &str = "You have no downloadable products.";
pub const NO_MORE_RECORDS_MESSAGE: &str = "No more downloadable records available.";

/// Maps a fetch failure to the text shown to the shopper. Raw error text
/// never leaves this function.
pub fn user_message(err: &WidgetError) -> String {
    match err {
        WidgetError::Identity => {
            "Failed to load downloads: Customer email not found. Please ensure you are logged in."
                .to_string()
        }
        err if err.is_not_found() => {
            "Failed to load downloads: API endpoint not found. Please check the API URL."
                .to_string()
        }
        _ => "Downloads are temporarily unavailable. Please try again later.".to_string(),
    }
}

/// A fetched page together with the identity it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDownloads {
    pub customer_email: String,
    pub outcome: DownloadsOutcome,
}

#[derive(Clone)]
pub struct DownloadsService {
    api: Arc<dyn DownloadsApi>,
    link_base: String,
    default_email: Option<String>,
}

impl DownloadsService {
    pub fn new(api: Arc<dyn DownloadsApi>, link_base: &str, default_email: Option<String>) -> Self {
        Self {
            api,
            link_base: link_base.trim_end_matches('/').to_string(),
            default_email,
        }
    }

    pub async fn fetch_page(
        &self,
        context: CustomerContext,
        page: u32,
        per_page: u32,
    ) -> Result<FetchedDownloads, WidgetError> {
        let customer_email = context
            .with_default_email(self.default_email.as_deref())
            .resolve()?;
        let page = page.max(1);
        let per_page = per_page.max(1);

        let json = self
            .api
            .orders_with_links(&customer_email, page, per_page)
            .await?;
        let outcome = extract_downloads_page(
            &json,
            &DownloadsRequest {
                requested_page: page,
                requested_per_page: per_page,
                link_base: &self.link_base,
                customer_email: &customer_email,
            },
        )?;

        if let DownloadsOutcome::Content(ref page) = outcome {
            log::debug!(
                "Downloads page {}/{}: {} entr(ies) of {} order(s)",
                page.pagination.current_page,
                page.pagination.total_pages(),
                page.entries.len(),
                page.pagination.total_count
            );
        }

        Ok(FetchedDownloads {
            customer_email,
            outcome,
        })
    }
}

/// Pagination and UI state of one downloads list.
#[derive(Debug, Clone)]
pub struct DownloadsWidget {
    ui: UiStateMachine,
    pagination: PaginationState,
    customer_email: Option<String>,
}

impl DownloadsWidget {
    pub fn new(per_page: u32) -> Self {
        Self {
            ui: UiStateMachine::new(),
            pagination: PaginationState::new(per_page),
            customer_email: None,
        }
    }

    pub fn state(&self) -> &UiState {
        self.ui.state()
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    /// Identity of the last successful fetch; reused for later pages.
    pub fn customer_email(&self) -> Option<&str> {
        self.customer_email.as_deref()
    }

    /// Moves to `page` and enters `Loading`.
    pub fn begin_fetch(&mut self, page: u32, per_page: Option<u32>) -> FetchTicket {
        self.pagination.current_page = page.max(1);
        if let Some(per_page) = per_page.filter(|p| *p > 0) {
            self.pagination.per_page = per_page;
        }
        self.ui.begin_fetch()
    }

    /// Records a fetch result. Returns `false` for a superseded ticket, in
    /// which case nothing changes.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: &Result<FetchedDownloads, WidgetError>,
    ) -> bool {
        if !self.ui.is_current(ticket) {
            log::info!(
                "Ignoring stale downloads response (generation {})",
                ticket.generation()
            );
            return false;
        }

        let resolution = match result {
            Ok(fetched) => {
                self.customer_email = Some(fetched.customer_email.clone());
                match &fetched.outcome {
                    DownloadsOutcome::Content(page) => {
                        self.pagination = page.pagination;
                        Resolution::Content
                    }
                    DownloadsOutcome::Empty => {
                        self.pagination.total_count = 0;
                        self.pagination.current_page = 1;
                        Resolution::Empty
                    }
                    DownloadsOutcome::NoMoreRecords { .. } => Resolution::Empty,
                }
            }
            Err(err) => {
                log::error!("Error fetching downloads: {err}");
                Resolution::Error(user_message(err))
            }
        };
        self.ui.resolve(ticket, resolution)
    }
}
