use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A gig listing as the engine sees it
///
/// Only `category`, `seller_level`, `price` and `delivery_days` take part in
/// filtering; the rest is carried through for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub seller_level: String,
    pub price: f64,
    pub delivery_days: u32,
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Marketplace category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: Option<String>,
    pub gigs_count: Option<u64>,
}

/// Remote pagination metadata, as reported by the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl PageMeta {
    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// One page delivered by a [`crate::source::GigDataSource`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GigPage {
    pub items: Vec<Listing>,
    pub meta: PageMeta,
}
