// Browsing state owned by one view: filters, paging, data and load status
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{BrowseConfig, FetchStrategy};
use crate::descriptor::FilterValue;
use crate::error::FetchFailure;
use crate::filter_state::FilterState;
use crate::models::{GigPage, Listing, PageMeta};
use crate::paginator::{PageWindow, Paginator};
use crate::predicate::{CompiledFilter, PredicateEngine};
use crate::registry::FilterRegistry;
use crate::Result;

/// Where the current collection stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet
    Idle,
    Loading { page: u32 },
    Ready,
    /// Last fetch failed; previous listings (if any) are kept
    Failed(FetchFailure),
}

/// Proof that a fetch was issued, needed to apply its response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    page: u32,
}

impl FetchTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued meanwhile; the response was dropped
    Stale,
}

/// What a renderer should show
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseView<'a> {
    Idle,
    Loading,
    Failed(&'a FetchFailure),
    /// Data arrived but nothing survives the filters
    NoResults(PageWindow<&'a Listing>),
    Results(PageWindow<&'a Listing>),
}

/// Filter, paging and fetch state for one browsing session
///
/// All transitions are synchronous. The only async part, the fetch itself,
/// is split into [`begin_fetch`](Self::begin_fetch) and
/// [`complete_fetch`](Self::complete_fetch) so that responses arriving out
/// of order can be recognised and dropped.
#[derive(Debug)]
pub struct BrowseSession {
    engine: PredicateEngine,
    filters: FilterState,
    compiled: CompiledFilter,
    paginator: Paginator,
    strategy: FetchStrategy,
    listings: Vec<Listing>,
    // indices into `listings`, recomputed only when the filtered collection changes
    filtered: Vec<usize>,
    load: LoadState,
    meta: Option<PageMeta>,
    last_issued: u64,
}

impl BrowseSession {
    pub fn new(registry: Arc<FilterRegistry>, config: &BrowseConfig) -> Result<Self> {
        let engine = PredicateEngine::new(Arc::clone(&registry));
        let filters = registry.default_state();
        let compiled = engine.compile(&filters)?;

        Ok(Self {
            engine,
            filters,
            compiled,
            paginator: Paginator::new(config.page_size)?,
            strategy: config.strategy,
            listings: Vec::new(),
            filtered: Vec::new(),
            load: LoadState::Idle,
            meta: None,
            last_issued: 0,
        })
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Remote pagination of the last applied fetch
    pub fn remote_meta(&self) -> Option<PageMeta> {
        self.meta
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Change one facet. Returns whether the filtered collection changed.
    ///
    /// A rejected value leaves the session exactly as it was. Selections that
    /// filter the same way (e.g. "Anytime" vs nothing) are stored but keep the
    /// current page.
    pub fn set_filter(&mut self, id: &str, value: impl Into<FilterValue>) -> Result<bool> {
        let next = self.filters.set_value(id, value)?;
        self.replace_filters(next)
    }

    /// Back to default facet values. Returns whether the filtered collection changed.
    pub fn reset_filters(&mut self) -> Result<bool> {
        let next = self.filters.reset();
        self.replace_filters(next)
    }

    fn replace_filters(&mut self, next: FilterState) -> Result<bool> {
        if next == self.filters {
            return Ok(false);
        }
        let compiled = self.engine.compile(&next)?;
        self.filters = next;
        if compiled == self.compiled {
            debug!("filter change is a no-op for matching, keeping page");
            return Ok(false);
        }
        self.compiled = compiled;
        self.refilter();
        Ok(true)
    }

    pub fn goto(&mut self, page: i64) -> bool {
        self.step(|p| p.goto(page))
    }

    pub fn next_page(&mut self) -> bool {
        self.step(Paginator::next)
    }

    pub fn prev_page(&mut self) -> bool {
        self.step(Paginator::prev)
    }

    fn step(&mut self, transition: impl FnOnce(Paginator) -> Paginator) -> bool {
        let next = transition(self.paginator);
        let moved = next != self.paginator;
        self.paginator = next;
        moved
    }

    /// Register a new fetch of remote `page`; any earlier in-flight fetch becomes stale
    pub fn begin_fetch(&mut self, page: u32) -> FetchTicket {
        self.last_issued += 1;
        self.load = LoadState::Loading { page };
        debug!("fetch #{} issued for page {}", self.last_issued, page);
        FetchTicket {
            seq: self.last_issued,
            page,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.last_issued
    }

    /// Apply a fetch result if it belongs to the most recent request
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<GigPage, FetchFailure>,
    ) -> FetchOutcome {
        if !self.is_current(&ticket) {
            debug!(
                "dropping response of fetch #{} (latest is #{})",
                ticket.seq, self.last_issued
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                info!(
                    "applying page {} ({} listings)",
                    page.meta.current_page,
                    page.items.len()
                );
                self.absorb(ticket.page, page.items);
                self.meta = Some(page.meta);
                self.load = LoadState::Ready;
                self.refilter();
            }
            Err(failure) => {
                warn!("fetch of page {} failed: {}", ticket.page, failure);
                self.load = LoadState::Failed(failure);
            }
        }

        FetchOutcome::Applied
    }

    fn absorb(&mut self, page: u32, items: Vec<Listing>) {
        match self.strategy {
            FetchStrategy::Replace => self.listings = items,
            FetchStrategy::Accumulate if page <= 1 => self.listings = items,
            FetchStrategy::Accumulate => {
                // Server pages can shift between requests; don't show a gig twice
                let mut seen: HashSet<u64> = self.listings.iter().map(|l| l.id).collect();
                self.listings
                    .extend(items.into_iter().filter(|l| seen.insert(l.id)));
            }
        }
    }

    /// The filtered collection has a new identity: recompute it and restart paging
    fn refilter(&mut self) {
        self.filtered = self.compiled.positions(&self.listings);
        self.paginator = self.paginator.on_source_changed(self.filtered.len());
    }

    /// Current page of the filtered collection
    pub fn window(&self) -> PageWindow<&Listing> {
        self.paginator
            .window_for(&self.filtered)
            .map(|i| &self.listings[i])
    }

    pub fn view(&self) -> BrowseView<'_> {
        match &self.load {
            LoadState::Idle => BrowseView::Idle,
            LoadState::Loading { .. } => BrowseView::Loading,
            LoadState::Failed(failure) => BrowseView::Failed(failure),
            LoadState::Ready => {
                let window = self.window();
                if window.total_items == 0 {
                    BrowseView::NoResults(window)
                } else {
                    BrowseView::Results(window)
                }
            }
        }
    }
}
