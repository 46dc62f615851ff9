use std::sync::Arc;

use gigscout_core::config::{BrowseConfig, FetchStrategy};
use gigscout_core::registry::ids;
use gigscout_core::{
    BrowseSession, BrowseView, FilterRegistry, FilterState, GigPage, Listing, PageMeta,
    Paginator, PredicateEngine,
};

const CATEGORIES: &[&str] = &["Business", "Lifestyle", "Music & Audio"];
const LEVELS: &[&str] = &["New Seller", "Level 1", "Level 2", "Top Rated"];

fn gig(id: u64, price: f64, delivery_days: u32) -> Listing {
    Listing {
        id,
        title: format!("gig {}", id),
        category: CATEGORIES[id as usize % CATEGORIES.len()].to_string(),
        seller_level: LEVELS[id as usize % LEVELS.len()].to_string(),
        price,
        delivery_days,
        seller_name: Some(format!("seller{}", id)),
        rating: Some(4.5),
        reviews: Some(10),
        image_url: None,
        created_at: None,
    }
}

/// Deterministic pseudo-random catalogue so failures are reproducible
fn catalogue(len: usize, seed: u64) -> Vec<Listing> {
    let mut x = seed;
    (0..len as u64)
        .map(|id| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let price = ((x >> 33) % 1600) as f64;
            let days = ((x >> 17) % 10) as u32 + 1;
            gig(id, price, days)
        })
        .collect()
}

fn setup() -> (PredicateEngine, FilterState) {
    let registry = Arc::new(FilterRegistry::gig_marketplace());
    (PredicateEngine::new(Arc::clone(&registry)), registry.default_state())
}

fn ids_of(listings: &[&Listing]) -> Vec<u64> {
    listings.iter().map(|l| l.id).collect()
}

fn is_subsequence(needle: &[u64], haystack: &[u64]) -> bool {
    let mut it = haystack.iter();
    needle.iter().all(|n| it.any(|h| h == n))
}

fn session_with(listings: Vec<Listing>, page_size: usize) -> BrowseSession {
    let config = BrowseConfig {
        page_size,
        strategy: FetchStrategy::Replace,
    };
    let mut session = BrowseSession::new(Arc::new(FilterRegistry::gig_marketplace()), &config).unwrap();
    let ticket = session.begin_fetch(1);
    let total = listings.len() as u64;
    session.complete_fetch(
        ticket,
        Ok(GigPage {
            items: listings,
            meta: PageMeta {
                current_page: 1,
                last_page: 1,
                per_page: total as u32,
                total,
            },
        }),
    );
    session
}

#[test]
fn reset_is_idempotent() {
    let (_, state) = setup();
    let state = state
        .set_value(ids::CATEGORY, "Business")
        .and_then(|s| s.set_value(ids::BUDGET, (100.0, 300.0)))
        .unwrap();

    assert_eq!(state.reset().reset(), state.reset());
}

#[test]
fn default_state_has_exactly_one_entry_per_descriptor() {
    let registry = Arc::new(FilterRegistry::gig_marketplace());
    let state = registry.default_state();

    assert_eq!(state.len(), registry.descriptors().len());
    for descriptor in registry.descriptors() {
        assert_eq!(state.get(&descriptor.id), Some(&descriptor.default_value()));
    }
}

#[test]
fn narrowing_budget_never_adds_listings() {
    let (engine, state) = setup();
    let listings = catalogue(200, 7);

    let ranges = [(0.0, 1000.0), (100.0, 1000.0), (100.0, 800.0), (300.0, 600.0), (400.0, 450.0)];
    let mut previous = ids_of(&engine.apply(&listings, &state).unwrap());
    for (lo, hi) in ranges {
        let narrowed = state.set_value(ids::BUDGET, (lo, hi)).unwrap();
        let current = ids_of(&engine.apply(&listings, &narrowed).unwrap());
        assert!(is_subsequence(&current, &previous), "budget {}..{} added listings", lo, hi);
        previous = current;
    }
}

#[test]
fn adding_a_facet_never_adds_listings() {
    let (engine, state) = setup();
    let listings = catalogue(200, 11);

    let loose = state.set_value(ids::DELIVERY_TIME, "Up to 7 days").unwrap();
    let strict = loose.set_value(ids::SELLER_LEVEL, "Top Rated").unwrap();

    let loose_ids = ids_of(&engine.apply(&listings, &loose).unwrap());
    let strict_ids = ids_of(&engine.apply(&listings, &strict).unwrap());
    assert!(is_subsequence(&strict_ids, &loose_ids));
}

#[test]
fn apply_preserves_order_for_every_facet() {
    let (engine, state) = setup();
    let listings = catalogue(150, 3);
    let all_ids: Vec<u64> = listings.iter().map(|l| l.id).collect();

    let states = vec![
        state.clone(),
        state.set_value(ids::CATEGORY, "Lifestyle").unwrap(),
        state.set_value(ids::SELLER_LEVEL, "Level 1").unwrap(),
        state.set_value(ids::BUDGET, (250.0, 1000.0)).unwrap(),
        state.set_value(ids::DELIVERY_TIME, "Express 24H").unwrap(),
    ];
    for s in &states {
        let filtered = ids_of(&engine.apply(&listings, s).unwrap());
        assert!(is_subsequence(&filtered, &all_ids));
    }
}

#[test]
fn windows_reconstruct_filtered_collection() {
    for len in [0usize, 1, 7, 8, 9, 16, 17, 40] {
        for page_size in [1usize, 3, 8, 10] {
            let items: Vec<usize> = (0..len).collect();
            let mut paginator = Paginator::new(page_size).unwrap().on_source_changed(len);

            let mut rebuilt = Vec::new();
            for page in 1..=paginator.total_pages() {
                paginator = paginator.goto(page as i64);
                let window = paginator.window_for(&items);
                assert!(window.items.len() <= page_size);
                rebuilt.extend(window.items);
            }
            assert_eq!(rebuilt, items, "len {} page_size {}", len, page_size);
        }
    }
}

#[test]
fn out_of_range_goto_is_ignored() {
    let paginator = Paginator::new(8).unwrap().on_source_changed(18);
    let total = paginator.total_pages() as i64;

    for bad in [0, total + 1, -5] {
        let after = paginator.goto(bad);
        assert_eq!(after, paginator);
        assert!((1..=paginator.total_pages()).contains(&after.current_page()));
    }
}

#[test]
fn budget_top_is_open_ended() {
    let (engine, state) = setup();
    let listings: Vec<_> = [100.0, 200.0, 500.0, 1000.0, 1500.0]
        .iter()
        .enumerate()
        .map(|(i, p)| gig(i as u64, *p, 3))
        .collect();

    let state = state.set_value(ids::BUDGET, (200.0, 1000.0)).unwrap();
    let prices: Vec<f64> = engine.apply(&listings, &state).unwrap().iter().map(|l| l.price).collect();

    assert_eq!(prices, vec![200.0, 500.0, 1000.0, 1500.0]);
}

#[test]
fn delivery_time_keeps_fast_enough_gigs() {
    let (engine, state) = setup();
    let listings: Vec<_> = [1, 2, 3, 4, 7]
        .iter()
        .enumerate()
        .map(|(i, d)| gig(i as u64, 50.0, *d))
        .collect();

    let state = state.set_value(ids::DELIVERY_TIME, "Up to 3 days").unwrap();
    let days: Vec<u32> = engine
        .apply(&listings, &state)
        .unwrap()
        .iter()
        .map(|l| l.delivery_days)
        .collect();

    assert_eq!(days, vec![1, 2, 3]);
}

#[test]
fn new_fetch_sends_paging_back_to_first_page() {
    let mut session = session_with(catalogue(18, 5), 8);
    assert_eq!(session.paginator().total_pages(), 3);

    assert!(session.goto(3));
    assert_eq!(session.window().current_page, 3);

    let ticket = session.begin_fetch(2);
    session.complete_fetch(
        ticket,
        Ok(GigPage {
            items: catalogue(18, 9),
            meta: PageMeta {
                current_page: 2,
                last_page: 2,
                per_page: 18,
                total: 36,
            },
        }),
    );

    assert_eq!(session.paginator().current_page(), 1);
    assert_eq!(session.window().current_page, 1);
}

#[test]
fn empty_result_is_its_own_view_state() {
    let mut session = session_with(catalogue(30, 1), 8);
    session.set_filter(ids::CATEGORY, "Programming & Tech").unwrap();

    match session.view() {
        BrowseView::NoResults(window) => {
            assert!(window.items.is_empty());
            assert_eq!(window.current_page, 1);
            assert_eq!(window.total_pages, 1);
            assert_eq!(window.page_size, 8);
        }
        other => panic!("expected NoResults, got {:?}", other),
    }

    // A fetch in flight is reported as loading, not as "no results"
    session.begin_fetch(1);
    assert_eq!(session.view(), BrowseView::Loading);
}
