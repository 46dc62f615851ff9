// Terminal output for the CLI; string builders are kept separate so they can be tested
use gigscout_core::{
    Category, FilterKind, FilterRegistry, FilterState, FilterValue, Listing, PageMeta, PageWindow,
};
use serde::Serialize;

const TITLE_WIDTH: usize = 40;

#[derive(Serialize)]
struct JsonPage<'a> {
    window: &'a PageWindow<&'a Listing>,
    filters: Vec<ActiveFilter<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote: Option<PageMeta>,
}

#[derive(Serialize)]
struct ActiveFilter<'a> {
    id: &'a str,
    value: &'a FilterValue,
}

pub fn print_window(window: &PageWindow<&Listing>, filters: &FilterState, remote: Option<PageMeta>) {
    print!("{}", window_to_text(window, filters, remote));
}

pub fn print_json(
    window: &PageWindow<&Listing>,
    filters: &FilterState,
    remote: Option<PageMeta>,
) -> anyhow::Result<()> {
    println!("{}", window_to_json(window, filters, remote)?);
    Ok(())
}

pub fn print_facets(registry: &FilterRegistry) {
    print!("{}", facets_to_text(registry));
}

pub fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories.");
        return;
    }
    for category in categories {
        match category.gigs_count {
            Some(count) => println!("{:>4}  {} ({} gigs)", category.id, category.name, count),
            None => println!("{:>4}  {}", category.id, category.name),
        }
    }
}

fn window_to_json(
    window: &PageWindow<&Listing>,
    filters: &FilterState,
    remote: Option<PageMeta>,
) -> serde_json::Result<String> {
    let active_ids = filters.active_ids();
    let active = filters
        .iter()
        .filter(|(id, _)| active_ids.contains(id))
        .map(|(id, value)| ActiveFilter { id, value })
        .collect();

    serde_json::to_string_pretty(&JsonPage {
        window,
        filters: active,
        remote,
    })
}

fn window_to_text(window: &PageWindow<&Listing>, filters: &FilterState, remote: Option<PageMeta>) -> String {
    let mut out = String::new();

    let active_ids = filters.active_ids();
    let active: Vec<String> = filters
        .iter()
        .filter(|(id, _)| active_ids.contains(id))
        .map(|(id, value)| format!("{}={}", id, value))
        .collect();
    if !active.is_empty() {
        out.push_str(&format!("Filters: {}\n", active.join(", ")));
    }

    if window.is_empty() {
        out.push_str("No gigs match these filters.\n");
    } else {
        out.push_str(&format!(
            "{:>6}  {:<width$}  {:>9}  {:>5}  {:<12}  {}\n",
            "ID",
            "TITLE",
            "PRICE",
            "DAYS",
            "LEVEL",
            "CATEGORY",
            width = TITLE_WIDTH
        ));
        for listing in &window.items {
            out.push_str(&format!(
                "{:>6}  {:<width$}  {:>9}  {:>5}  {:<12}  {}\n",
                listing.id,
                truncate(&listing.title, TITLE_WIDTH),
                format!("${:.2}", listing.price),
                listing.delivery_days,
                listing.seller_level,
                listing.category,
                width = TITLE_WIDTH
            ));
        }
    }

    out.push_str(&format!(
        "Page {}/{} ({} gigs)",
        window.current_page, window.total_pages, window.total_items
    ));
    if let Some(meta) = remote {
        out.push_str(&format!(
            " | remote page {}/{}, {} total",
            meta.current_page, meta.last_page, meta.total
        ));
    }
    out.push('\n');
    out
}

fn facets_to_text(registry: &FilterRegistry) -> String {
    let mut out = String::new();
    for descriptor in registry.descriptors() {
        match &descriptor.kind {
            FilterKind::Select { options, .. } => {
                out.push_str(&format!("{} ({})\n", descriptor.label(), descriptor.id));
                for option in options {
                    out.push_str(&format!("  - {}\n", option));
                }
            }
            FilterKind::Range { min, max, step, .. } => {
                out.push_str(&format!(
                    "{} ({}): {}..{} step {}\n",
                    descriptor.label(),
                    descriptor.id,
                    min,
                    max,
                    step
                ));
            }
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
