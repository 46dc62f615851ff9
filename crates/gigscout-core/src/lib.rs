// Core browsing logic - facets, filtering, paging and the fetch plumbing around them
pub mod config;
pub mod controller;
pub mod descriptor;
pub mod error;
pub mod filter_state;
pub mod models;
pub mod paginator;
pub mod predicate;
pub mod providers;
pub mod registry;
pub mod session;
pub mod source;

pub use config::{Config, FetchStrategy};
pub use controller::BrowseController;
pub use descriptor::{FilterDescriptor, FilterKind, FilterValue, RangeValue};
pub use error::{Error, FetchFailure};
pub use filter_state::FilterState;
pub use models::{Category, GigPage, Listing, PageMeta};
pub use paginator::{PageWindow, Paginator};
pub use predicate::{CompiledFilter, PredicateEngine};
pub use providers::HttpGigSource;
pub use registry::FilterRegistry;
pub use session::{BrowseSession, BrowseView, FetchOutcome, FetchTicket, LoadState};
pub use source::GigDataSource;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
