// Client-side paging over the filtered collection
//
// Not to be confused with the data source's own paging: this one only ever
// slices what is already in memory.
use serde::Serialize;
use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_PAGE_SIZE: usize = 8;

/// The slice of the filtered collection currently on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageWindow<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    /// Length of the whole filtered collection
    pub total_items: usize,
}

impl<T> PageWindow<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageWindow<U> {
        PageWindow {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            page_size: self.page_size,
            total_items: self.total_items,
        }
    }
}

/// Page cursor over a collection of `source_len` items
///
/// A plain `Copy` value: every transition returns the next paginator, so the
/// owner decides when to commit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    source_len: usize,
    current_page: usize,
}

impl Paginator {
    pub fn new(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::ConfigError("page size must be at least 1".into()));
        }
        Ok(Self {
            page_size,
            source_len: 0,
            current_page: 1,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Never less than 1, even for an empty collection
    pub fn total_pages(&self) -> usize {
        total_pages(self.source_len, self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Index of the first item on the current page
    pub fn offset(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    /// Jump to `page` if it exists; anything else (stale UI, negative) is ignored
    #[must_use]
    pub fn goto(self, page: i64) -> Self {
        let in_range = page >= 1 && (page as u64) <= self.total_pages() as u64;
        if !in_range || page as usize == self.current_page {
            return self;
        }
        Self {
            current_page: page as usize,
            ..self
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        self.goto(self.current_page as i64 + 1)
    }

    #[must_use]
    pub fn prev(self) -> Self {
        self.goto(self.current_page as i64 - 1)
    }

    /// The filtered collection was replaced: the old page number means nothing now
    #[must_use]
    pub fn on_source_changed(self, source_len: usize) -> Self {
        debug!(
            "source changed ({} -> {} items), back to page 1",
            self.source_len, source_len
        );
        Self {
            source_len,
            current_page: 1,
            ..self
        }
    }

    /// Current page of `items`
    ///
    /// Totals come from `items.len()`; if that disagrees with the tracked
    /// source length the page is clamped rather than running off the end.
    pub fn window_for<T: Clone>(&self, items: &[T]) -> PageWindow<T> {
        let total_pages = total_pages(items.len(), self.page_size);
        let current_page = self.current_page.min(total_pages);
        let start = (current_page - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());

        PageWindow {
            items: items[start.min(end)..end].to_vec(),
            current_page,
            total_pages,
            page_size: self.page_size,
            total_items: items.len(),
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            source_len: 0,
            current_page: 1,
        }
    }
}

fn total_pages(len: usize, page_size: usize) -> usize {
    if len == 0 {
        1
    } else {
        (len - 1) / page_size + 1
    }
}
