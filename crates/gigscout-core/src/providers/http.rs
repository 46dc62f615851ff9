// HTTP provider - bridges the marketplace API client with GigDataSource
use async_trait::async_trait;
use gigscout_api::{
    ApiEnvelope, CategoryRecord, GigRecord, MarketApiError, MarketClient, PageMetaRecord,
};
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    config::{ApiConfig, Config},
    error::FetchFailure,
    models::{Category, GigPage, Listing, PageMeta},
    source::GigDataSource,
    Error, Result,
};

/// Wrapper around MarketClient that implements GigDataSource
pub struct HttpGigSource {
    client: MarketClient,
}

impl HttpGigSource {
    pub fn new(client: MarketClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let ApiConfig {
            base_url,
            timeout_secs,
        } = &config.api;

        let client = MarketClient::with_options(
            base_url,
            Duration::from_secs(*timeout_secs),
            config.retry.clone(),
        )
        .map_err(|e| Error::ConfigError(e.to_string()))?;

        Ok(Self::new(client))
    }
}

#[async_trait]
impl GigDataSource for HttpGigSource {
    async fn fetch_page(&self, page: u32) -> std::result::Result<GigPage, FetchFailure> {
        let envelope = self.client.fetch_gigs(page).await.map_err(to_fetch_failure)?;
        let gig_page = envelope_to_page(page, envelope);

        info!(
            "fetched gigs page {}/{} ({} items)",
            gig_page.meta.current_page,
            gig_page.meta.last_page,
            gig_page.items.len()
        );
        Ok(gig_page)
    }

    async fn fetch_categories(&self) -> std::result::Result<Vec<Category>, FetchFailure> {
        let envelope = self
            .client
            .fetch_categories()
            .await
            .map_err(to_fetch_failure)?;

        Ok(envelope.data.into_iter().map(record_to_category).collect())
    }
}

fn envelope_to_page(page: u32, envelope: ApiEnvelope<Vec<GigRecord>>) -> GigPage {
    let items: Vec<Listing> = envelope.data.into_iter().map(record_to_listing).collect();
    let meta = match envelope.meta {
        Some(meta) => meta_from_record(meta),
        None => {
            // Unpaginated response - treat it as the one and only page
            warn!("gigs page {} came back without pagination meta", page);
            PageMeta {
                current_page: page,
                last_page: page,
                per_page: items.len() as u32,
                total: items.len() as u64,
            }
        }
    };

    GigPage { items, meta }
}

/// Sort API errors into transport vs decoding vs server-side rejection
fn to_fetch_failure(err: MarketApiError) -> FetchFailure {
    match err {
        MarketApiError::ParseError(e) => FetchFailure::Decode(e.to_string()),
        MarketApiError::NetworkError(e) if e.is_decode() => FetchFailure::Decode(e.to_string()),
        MarketApiError::Rejected(message) => FetchFailure::Rejected(message),
        other => FetchFailure::Transport(other.to_string()),
    }
}

/// Convert an API gig record to our internal Listing model
fn record_to_listing(record: GigRecord) -> Listing {
    Listing {
        id: record.id,
        title: record.title,
        category: record.category.name().to_string(),
        seller_level: record.seller_level,
        price: record.price,
        delivery_days: record.delivery_days,
        seller_name: record.seller_name,
        rating: record.rating,
        reviews: record.reviews,
        image_url: record.image,
        created_at: record.created_at,
    }
}

fn record_to_category(record: CategoryRecord) -> Category {
    Category {
        id: record.id,
        name: record.name,
        slug: record.slug,
        gigs_count: record.gigs_count,
    }
}

fn meta_from_record(meta: PageMetaRecord) -> PageMeta {
    PageMeta {
        current_page: meta.current_page,
        last_page: meta.last_page,
        per_page: meta.per_page,
        total: meta.total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigscout_api::CategoryRef;

    #[test]
    fn test_record_to_listing_flattens_category() {
        let record = GigRecord {
            id: 7,
            title: "I will mix your track".into(),
            description: None,
            category: CategoryRef::Object {
                name: "Music & Audio".into(),
            },
            seller_level: "Level 2".into(),
            price: 120.0,
            delivery_days: 5,
            seller_name: Some("mixmaster".into()),
            rating: Some(4.7),
            reviews: Some(88),
            image: Some("https://cdn.example.com/7.png".into()),
            created_at: None,
        };

        let listing = record_to_listing(record);
        assert_eq!(listing.category, "Music & Audio");
        assert_eq!(listing.delivery_days, 5);
        assert_eq!(listing.image_url.as_deref(), Some("https://cdn.example.com/7.png"));
    }

    #[test]
    fn test_error_classification() {
        let decode = serde_json::from_str::<GigRecord>("{").unwrap_err();
        assert!(matches!(
            to_fetch_failure(MarketApiError::ParseError(decode)),
            FetchFailure::Decode(_)
        ));
        assert_eq!(
            to_fetch_failure(MarketApiError::Rejected("maintenance".into())),
            FetchFailure::Rejected("maintenance".into())
        );
        assert!(matches!(
            to_fetch_failure(MarketApiError::Status {
                status: 502,
                body: "bad gateway".into()
            }),
            FetchFailure::Transport(_)
        ));
    }

    fn record(id: u64) -> GigRecord {
        GigRecord {
            id,
            title: format!("gig {}", id),
            description: None,
            category: CategoryRef::Name("Business".into()),
            seller_level: "Level 1".into(),
            price: 30.0,
            delivery_days: 2,
            seller_name: None,
            rating: None,
            reviews: None,
            image: None,
            created_at: None,
        }
    }

    #[test]
    fn test_missing_meta_is_synthesized() {
        let envelope = ApiEnvelope {
            success: true,
            data: vec![record(1)],
            meta: None,
            message: None,
        };

        let page = envelope_to_page(3, envelope);
        assert_eq!(
            page.meta,
            PageMeta {
                current_page: 3,
                last_page: 3,
                per_page: 1,
                total: 1
            }
        );
        assert_eq!(page.items[0].id, 1);
    }

    #[test]
    fn test_server_meta_is_kept() {
        let envelope = ApiEnvelope {
            success: true,
            data: vec![record(1), record(2)],
            meta: Some(PageMetaRecord {
                current_page: 2,
                last_page: 5,
                per_page: 2,
                total: 10,
            }),
            message: None,
        };

        let page = envelope_to_page(2, envelope);
        assert_eq!(page.meta.last_page, 5);
        assert_eq!(page.meta.total, 10);
        assert!(page.meta.has_more());
    }

    /// Answer exactly one HTTP request with `body`, returning the base URL
    async fn serve_once(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    fn source_for(base_url: &str) -> HttpGigSource {
        let client = MarketClient::with_options(
            base_url,
            Duration::from_secs(5),
            gigscout_api::RetryConfig::disabled(),
        )
        .unwrap();
        HttpGigSource::new(client)
    }

    #[tokio::test]
    async fn test_failure_envelope_surfaces_as_rejected() {
        let base = serve_once(r#"{"success":false,"data":null,"message":"maintenance"}"#).await;

        let result = source_for(&base).fetch_page(1).await;
        assert_eq!(result, Err(FetchFailure::Rejected("maintenance".into())));
    }

    #[tokio::test]
    async fn test_unpaginated_response_over_http() {
        let base = serve_once(
            r#"{"success":true,"data":[{"id":4,"title":"Voice over","category":"Music & Audio","seller_level":"Top Rated","price":"80.00","delivery_days":1}]}"#,
        )
        .await;

        let page = source_for(&base).fetch_page(3).await.unwrap();
        assert_eq!(page.meta.current_page, 3);
        assert_eq!(page.meta.last_page, 3);
        assert_eq!(page.items[0].price, 80.0);
        assert_eq!(page.items[0].category, "Music & Audio");
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "ftp://nope".into();
        assert!(matches!(
            HttpGigSource::from_config(&config),
            Err(Error::ConfigError(_))
        ));
    }
}
