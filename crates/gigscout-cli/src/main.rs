use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use gigscout_core::registry::ids;
use gigscout_core::{
    BrowseController, BrowseSession, BrowseView, Config, FetchStrategy, GigDataSource, HttpGigSource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Parser)]
#[command(name = "gigscout")]
#[command(version, about = "Browse, filter and page through marketplace gigs", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/gigscout/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Marketplace API root, overrides the config file
    #[arg(long, global = true, env = "GIGSCOUT_API_URL")]
    api_url: Option<String>,

    /// Gigs per page of the filtered view
    #[arg(long, global = true)]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Fetch gigs, filter them and show one page
    Gigs {
        /// Remote page to fetch from the API
        #[arg(long, default_value_t = 1)]
        remote_page: u32,

        /// Fetch every remote page and browse them as one collection
        #[arg(long, conflicts_with = "remote_page")]
        all: bool,

        /// Upper bound on remote pages fetched with --all
        #[arg(long, requires = "all")]
        max_pages: Option<u32>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        seller_level: Option<String>,

        /// Price range as LO..HI; the top of the slider means "and above"
        #[arg(long, value_parser = parse_budget)]
        budget: Option<(f64, f64)>,

        /// e.g. "Express 24H", "Up to 3 days"
        #[arg(long)]
        delivery: Option<String>,

        /// Page of the filtered view to show
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the available filters
    Facets,
    /// List marketplace categories
    Categories {
        #[arg(long)]
        json: bool,
    },
}

fn parse_budget(raw: &str) -> Result<(f64, f64), String> {
    let (lo, hi) = raw
        .split_once("..")
        .ok_or_else(|| format!("expected LO..HI, got {:?}", raw))?;
    let lo = lo.trim().parse::<f64>().map_err(|e| format!("bad lower bound: {}", e))?;
    let hi = hi.trim().parse::<f64>().map_err(|e| format!("bad upper bound: {}", e))?;
    Ok((lo, hi))
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(size) = cli.page_size {
        config.browse.page_size = size;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gigscout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Gigs {
            remote_page,
            all,
            max_pages,
            category,
            seller_level,
            budget,
            delivery,
            page,
            json,
        }) => {
            if all {
                config.browse.strategy = FetchStrategy::Accumulate;
            }

            let registry = config.registry()?;
            let mut session = BrowseSession::new(registry, &config.browse)?;

            // Filters go in before the fetch; the fetch itself resets paging anyway
            let selections = [
                ("category", ids::CATEGORY, category),
                ("seller-level", ids::SELLER_LEVEL, seller_level),
                ("delivery", ids::DELIVERY_TIME, delivery),
            ];
            for (flag, id, value) in selections {
                if let Some(value) = value {
                    session
                        .set_filter(id, value)
                        .with_context(|| format!("cannot apply --{} filter", flag))?;
                }
            }
            if let Some(range) = budget {
                session.set_filter(ids::BUDGET, range).context("cannot apply --budget filter")?;
            }

            let source: Arc<dyn GigDataSource> = Arc::new(HttpGigSource::from_config(&config)?);
            let controller = BrowseController::new(source, session);

            if all {
                tracing::info!("Fetching all remote pages from {}", config.api.base_url);
                controller.load_all(max_pages).await?;
            } else {
                tracing::info!("Fetching remote page {} from {}", remote_page, config.api.base_url);
                controller.load(remote_page).await;
            }

            let session = controller.session();
            let mut session = session.lock().await;
            if page != 1 && !session.goto(page) {
                tracing::warn!(
                    "page {} does not exist (1..={}), showing page 1",
                    page,
                    session.paginator().total_pages()
                );
            }

            match session.view() {
                BrowseView::Failed(failure) => bail!("could not load gigs: {}", failure),
                BrowseView::Idle | BrowseView::Loading => bail!("no response from the data source"),
                BrowseView::NoResults(window) | BrowseView::Results(window) => {
                    if json {
                        render::print_json(&window, session.filters(), session.remote_meta())?;
                    } else {
                        render::print_window(&window, session.filters(), session.remote_meta());
                    }
                }
            }
        }
        Some(Commands::Facets) => {
            let registry = config.registry()?;
            render::print_facets(&registry);
        }
        Some(Commands::Categories { json }) => {
            let source = HttpGigSource::from_config(&config)?;
            let categories = source.fetch_categories().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&categories)?);
            } else {
                render::print_categories(&categories);
            }
        }
        None => {
            println!("No command specified. Try --help");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_budget() {
        assert_eq!(parse_budget("200..1000"), Ok((200.0, 1000.0)));
        assert_eq!(parse_budget(" 0 .. 49.5 "), Ok((0.0, 49.5)));
        assert!(parse_budget("200-1000").is_err());
        assert!(parse_budget("cheap..1000").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_gigs_flags() {
        let cli = Cli::try_parse_from([
            "gigscout",
            "gigs",
            "--category",
            "Business",
            "--budget",
            "100..500",
            "--page",
            "2",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Gigs {
                category,
                budget,
                page,
                all,
                ..
            }) => {
                assert_eq!(category.as_deref(), Some("Business"));
                assert_eq!(budget, Some((100.0, 500.0)));
                assert_eq!(page, 2);
                assert!(!all);
            }
            _ => panic!("expected gigs subcommand"),
        }
    }
}
