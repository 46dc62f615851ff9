use async_trait::async_trait;

use crate::error::FetchFailure;
use crate::models::{Category, GigPage};

/// Where listings come from
///
/// The core never talks HTTP itself; it only consumes this contract. Retry
/// policy, if any, belongs to the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GigDataSource: Send + Sync {
    /// One remote page of listings (1-based)
    async fn fetch_page(&self, page: u32) -> Result<GigPage, FetchFailure>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, FetchFailure>;
}
