//! State of each page view, keyed by the view id the page echoes back.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::application::downloads_service::DownloadsWidget;
use crate::application::picklist_service::PicklistWidget;

pub const VIEW_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
pub struct ViewSession {
    picklists: HashMap<i64, PicklistWidget>,
    downloads: Option<DownloadsWidget>,
    submitting: bool,
    touched: Instant,
}

impl ViewSession {
    fn new() -> Self {
        Self {
            picklists: HashMap::new(),
            downloads: None,
            submitting: false,
            touched: Instant::now(),
        }
    }

    pub fn picklist(&mut self, product_id: i64) -> &mut PicklistWidget {
        self.picklists
            .entry(product_id)
            .or_insert_with(|| PicklistWidget::new(product_id))
    }

    pub fn existing_picklist(&mut self, product_id: i64) -> Option<&mut PicklistWidget> {
        self.picklists.get_mut(&product_id)
    }

    pub fn downloads(&mut self, per_page: u32) -> &mut DownloadsWidget {
        self.downloads
            .get_or_insert_with(|| DownloadsWidget::new(per_page))
    }
}

/// In-process registry of page views. The lock is only ever held for
/// synchronous updates, never across an `.await`.
#[derive(Debug)]
pub struct ViewRegistry {
    views: Mutex<HashMap<Uuid, ViewSession>>,
    ttl: Duration,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new(VIEW_TTL)
    }
}

impl ViewRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ViewSession>> {
        self.views.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `requested` when it names a live view, otherwise registers a
    /// fresh one. Expired views are pruned on every registration.
    pub fn open(&self, requested: Option<Uuid>) -> Uuid {
        let mut views = self.lock();
        if let Some(id) = requested {
            if let Some(session) = views.get_mut(&id) {
                session.touched = Instant::now();
                return id;
            }
            log::debug!("Unknown or expired view {id}; starting a new one");
        }

        let ttl = self.ttl;
        let before = views.len();
        views.retain(|_, session| session.touched.elapsed() < ttl);
        if views.len() < before {
            log::debug!("Pruned {} expired view(s)", before - views.len());
        }

        let id = Uuid::new_v4();
        views.insert(id, ViewSession::new());
        id
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` against a live view. `None` when the view is unknown.
    pub fn with_view<R>(&self, id: Uuid, f: impl FnOnce(&mut ViewSession) -> R) -> Option<R> {
        let mut views = self.lock();
        let session = views.get_mut(&id)?;
        session.touched = Instant::now();
        Some(f(session))
    }

    /// Marks the view as submitting. `None` when a submission is already in
    /// flight for it; the flag clears when the guard drops.
    pub fn begin_submission(&self, id: Uuid) -> Option<SubmissionGuard<'_>> {
        let mut views = self.lock();
        let session = views.entry(id).or_insert_with(ViewSession::new);
        if session.submitting {
            return None;
        }
        session.submitting = true;
        session.touched = Instant::now();
        Some(SubmissionGuard { registry: self, id })
    }
}

pub struct SubmissionGuard<'a> {
    registry: &'a ViewRegistry,
    id: Uuid,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.registry.lock().get_mut(&self.id) {
            session.submitting = false;
        }
    }
}
