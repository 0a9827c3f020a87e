mod config;
mod source;

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use config::Config;
use source::RegistrySeriesSource;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bistpulse_core::instruments::InstrumentCatalog;
use bistpulse_core::pipeline::CycleRunner;
use bistpulse_market_data::{
    AlphaVantageProvider, MarketDataProvider, ProviderRegistry, YahooProvider,
};
use bistpulse_storage_sqlite::{
    create_pool, db, run_migrations, PriceHistoryRepository, SnapshotRepository,
};

fn init_tracing() {
    let log_format = std::env::var("BP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn load_catalog(path: &str) -> anyhow::Result<InstrumentCatalog> {
    let raw = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read instruments file {}: {}", path, e))?;
    let catalog = InstrumentCatalog::from_json_str(&raw)?;
    anyhow::ensure!(!catalog.is_empty(), "instruments file {} is empty", path);
    Ok(catalog)
}

fn build_registry(config: &Config) -> anyhow::Result<ProviderRegistry> {
    let mut providers: Vec<Arc<dyn MarketDataProvider>> = vec![Arc::new(YahooProvider::new()?)];

    if let Some(key) = &config.alpha_vantage_api_key {
        providers.push(Arc::new(AlphaVantageProvider::new(key.clone())));
    }

    Ok(ProviderRegistry::new(providers))
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env();

    let catalog = load_catalog(&config.instruments_file)?;
    tracing::info!(
        "Loaded catalog: {} indices, {} stocks",
        catalog.indices().len(),
        catalog.unique_stocks().len()
    );

    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;

    let registry = build_registry(&config)?;
    tracing::info!("Providers registered: {:?}", registry.provider_ids());

    let runner = CycleRunner::new(
        Arc::new(RegistrySeriesSource::new(registry)),
        Arc::new(PriceHistoryRepository::new(pool.clone())),
        Arc::new(SnapshotRepository::new(pool)),
        catalog,
    );

    let summary = runner.run().await?;
    tracing::info!(
        "Done: {} indices, {} stocks, {} skipped",
        summary.index_count,
        summary.stock_count,
        summary.skipped
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fetch cycle failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
