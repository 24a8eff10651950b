use chrono::{DateTime, Utc};

/// Link target shown for a download whose URL could not be built.
pub const MISSING_LINK_PLACEHOLDER: &str = "#missing-data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadUrl {
    /// The API supplied a relative path, prefixed with the base URL.
    Server(String),
    /// Built locally from order id, SKU and customer email.
    Constructed(String),
    /// A required field was missing; renders as a non-navigable link.
    Missing,
}

impl DownloadUrl {
    pub fn href(&self) -> &str {
        match self {
            DownloadUrl::Server(url) | DownloadUrl::Constructed(url) => url,
            DownloadUrl::Missing => MISSING_LINK_PLACEHOLDER,
        }
    }

    pub fn is_navigable(&self) -> bool {
        !matches!(self, DownloadUrl::Missing)
    }
}

/// One downloadable (order, link) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    pub order_number: String,
    pub order_id: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
    /// Raw date text, kept for display when it does not parse.
    pub date_raw: Option<String>,
    pub product_title: String,
    pub sku: Option<String>,
    pub download_url: DownloadUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u32,
    pub per_page: u32,
    pub total_count: u64,
}

impl PaginationState {
    pub fn new(per_page: u32) -> Self {
        Self {
            current_page: 1,
            per_page: per_page.max(1),
            total_count: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let per_page = u64::from(self.per_page.max(1));
        let pages = self.total_count.div_ceil(per_page);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Pulls `current_page` back into `[1, max(total_pages, 1)]`.
    pub fn clamped(mut self) -> Self {
        self.per_page = self.per_page.max(1);
        let last = self.total_pages().max(1);
        self.current_page = self.current_page.clamp(1, last);
        self
    }

    pub fn has_multiple_pages(&self) -> bool {
        self.total_pages() > 1
    }
}

/// A normalized downloads page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadsPage {
    pub entries: Vec<DownloadEntry>,
    pub pagination: PaginationState,
}

/// What one downloads fetch resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadsOutcome {
    Content(DownloadsPage),
    /// Page 1 with no link-bearing orders.
    Empty,
    /// A page beyond 1 with no link-bearing orders.
    NoMoreRecords { requested_page: u32 },
}
