// Async driver: runs fetches against a data source and feeds the session
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::FetchFailure;
use crate::models::Category;
use crate::session::{BrowseSession, FetchOutcome, LoadState};
use crate::source::GigDataSource;

/// Couples a [`BrowseSession`] with the source that fills it
///
/// The session lock is never held across the fetch itself, so the user can
/// keep filtering and paging (or start another fetch) while one is in flight.
#[derive(Clone)]
pub struct BrowseController {
    source: Arc<dyn GigDataSource>,
    session: Arc<Mutex<BrowseSession>>,
}

impl BrowseController {
    pub fn new(source: Arc<dyn GigDataSource>, session: BrowseSession) -> Self {
        Self {
            source,
            session: Arc::new(Mutex::new(session)),
        }
    }

    pub fn session(&self) -> Arc<Mutex<BrowseSession>> {
        Arc::clone(&self.session)
    }

    /// Fetch remote `page` and apply it unless a newer fetch overtook it
    pub async fn load(&self, page: u32) -> FetchOutcome {
        let ticket = self.session.lock().await.begin_fetch(page);

        let result = self.source.fetch_page(page).await;

        self.session.lock().await.complete_fetch(ticket, result)
    }

    /// Fetch categories and the first page side by side
    pub async fn bootstrap(&self) -> (Result<Vec<Category>, FetchFailure>, FetchOutcome) {
        futures::future::join(self.source.fetch_categories(), self.load(1)).await
    }

    /// Walk remote pages 1..=last (capped at `max_pages`), returning how many were applied
    ///
    /// Meant for the accumulate strategy. Stops early if another fetch
    /// supersedes this walk.
    pub async fn load_all(&self, max_pages: Option<u32>) -> Result<u32, FetchFailure> {
        let mut page = 1;
        let mut applied = 0;

        loop {
            if self.load(page).await == FetchOutcome::Stale {
                debug!("load_all superseded at page {}", page);
                return Ok(applied);
            }

            let session = self.session.lock().await;
            if let LoadState::Failed(failure) = session.load_state() {
                return Err(failure.clone());
            }
            applied += 1;

            let last_page = session.remote_meta().map(|m| m.last_page).unwrap_or(page);
            let cap = max_pages.unwrap_or(u32::MAX);
            if page >= last_page || applied >= cap {
                info!("loaded {} remote pages ({} listings)", applied, session.listings().len());
                return Ok(applied);
            }
            page += 1;
        }
    }
}
