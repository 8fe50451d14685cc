//! Catalog demo binary
//!
//! Loads the catalog over HTTP, renders every snapshot as text, then walks
//! through the intents: filter, open a product, close it, refresh.

use catalog::{
    CatalogEnvironment, CatalogViewModel, Config, HttpProductFetcher, ProductDetailScreen,
    ProductListScreen, Screen, ViewMode,
};
use std::sync::Arc;
use std::time::Duration;
use storefront_core::environment::SystemClock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog=debug,storefront_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    storefront_runtime::metrics::describe_metrics();

    let config = Config::from_env()?;
    tracing::info!(api_url = %config.api_url, stale_selection = %config.stale_selection, "Starting catalog");

    let fetcher = HttpProductFetcher::from_config(&config)?;
    let env = CatalogEnvironment::new(Arc::new(fetcher), Arc::new(SystemClock))
        .with_stale_selection(config.stale_selection);
    let view_model = CatalogViewModel::with_config(env, config.store_config());

    // Render every snapshot until the session ends
    let mut snapshots = view_model.subscribe();
    let renderer = tokio::spawn(async move {
        let list = ProductListScreen::default();
        let detail = ProductDetailScreen;
        while let Some(state) = snapshots.next().await {
            println!("--- {} ---", state.route().name());
            match detail.render(&state) {
                Some(page) => print!("{page}"),
                None => print!("{}", list.render(&state)),
            }
        }
    });

    println!("\n>>> Load");
    view_model.load().await?.wait().await;

    let state = view_model.snapshot();
    if state.mode() == ViewMode::ErrorEmpty {
        println!("\nCould not load the catalog; retrying once");
        view_model.refresh().await?.wait().await;
    }

    let state = view_model.snapshot();
    if let Some(category) = state.categories().first() {
        println!("\n>>> Select category {category}");
        view_model.select_category(Some(category.as_str())).await?;
    }

    if let Some(product) = view_model.snapshot().visible_items().first().cloned() {
        println!("\n>>> Open product {}", product.id);
        view_model.select_product(product).await?;
        println!("\n>>> Close product");
        view_model.clear_selection().await?;
    }

    println!("\n>>> Refresh (twice; the second is ignored while in flight)");
    let mut handle = view_model.refresh().await?;
    view_model.refresh().await?;
    handle.wait().await;

    println!("\n>>> Show all categories");
    view_model.select_category(None).await?;

    view_model.close().await?;
    if tokio::time::timeout(Duration::from_secs(1), renderer).await.is_err() {
        tracing::warn!("Renderer did not finish after close");
    }

    Ok(())
}
