use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Every marketplace endpoint wraps its payload in this envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(default)]
    pub meta: Option<PageMetaRecord>,
    /// Only populated when `success` is false
    #[serde(default)]
    pub message: Option<String>,
}

/// Server-side pagination metadata, Laravel style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetaRecord {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// A gig exactly as the API sends it
///
/// The backend serializes decimals as strings ("49.00") on some routes and
/// as numbers on others, so the numeric fields accept both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: CategoryRef,
    pub seller_level: String,
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    #[serde(deserialize_with = "number_or_string", alias = "delivery_time")]
    pub delivery_days: u32,
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<u32>,
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Category as embedded in a gig - either a bare name or the eager-loaded relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Name(String),
    Object { name: String },
}

impl CategoryRef {
    pub fn name(&self) -> &str {
        match self {
            CategoryRef::Name(name) => name,
            CategoryRef::Object { name } => name,
        }
    }
}

/// Entry of `GET /categories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub gigs_count: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose<T> {
    Value(T),
    Text(String),
}

fn number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: std::fmt::Display,
{
    match Loose::<T>::deserialize(deserializer)? {
        Loose::Value(v) => Ok(v),
        Loose::Text(s) => s
            .trim()
            .parse::<T>()
            .map_err(|e| serde::de::Error::custom(format!("invalid number {:?}: {}", s, e))),
    }
}

fn optional_number_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose<f64>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Loose::Value(v)) => Ok(Some(v)),
        Some(Loose::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Loose::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid number {:?}: {}", s, e))),
    }
}
