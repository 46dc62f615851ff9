// HTTP client for the marketplace API
pub mod client;
pub mod models;
pub mod retry;

// Re-export common types
pub use client::{MarketApiError, MarketClient, Result};
pub use models::{ApiEnvelope, CategoryRecord, CategoryRef, GigRecord, PageMetaRecord};
pub use retry::RetryConfig;
