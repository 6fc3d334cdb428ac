//! OpenSASE Seeder - provisions the storefront CMS with its initial catalog

use anyhow::{Context, Result};
use clap::Parser;
use opensase_seeder::cli::{Cli, Driver};
use opensase_seeder::config::Settings;
use opensase_seeder::store::{BrowserStore, MemoryStore, RestStore};
use opensase_seeder::{ContentStore, SeedCatalog, SeedReport, Seeder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let settings = Settings::from_cli(Cli::parse())?;
    let catalog = settings.load_catalog().context("loading seed catalog")?;
    tracing::info!("🚀 Seeding {} records into {} via {:?}", catalog.record_count(), settings.store_url, settings.driver);

    let report = match settings.driver {
        Driver::Rest => seed(RestStore::new(&settings.store_url, settings.timeout)?, &settings, &catalog).await?,
        Driver::Browser => {
            let store = BrowserStore::launch(&settings.store_url, &settings.browser).await.context("starting browser session")?;
            seed(store, &settings, &catalog).await?
        }
        Driver::DryRun => seed(MemoryStore::new(), &settings, &catalog).await?,
    };
    report.log_summary();
    Ok(())
}

async fn seed<S: ContentStore>(store: S, settings: &Settings, catalog: &SeedCatalog) -> Result<SeedReport> {
    let mut seeder = Seeder::new(store, settings.seeder.clone());
    let outcome = seeder.run(&settings.credentials, catalog).await;
    if let Err(e) = seeder.store_mut().shutdown().await {
        tracing::warn!(error = %e, "store adapter did not shut down cleanly");
    }
    Ok(outcome?)
}
