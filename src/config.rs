use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::catalog::{CatalogError, SeedCatalog};
use crate::cli::{Cli, Driver};
use crate::seeder::SeederOptions;
use crate::store::{BrowserOptions, Credentials};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required (flag or environment variable)")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub driver: Driver,
    pub store_url: String,
    pub credentials: Credentials,
    pub catalog: Option<PathBuf>,
    pub seeder: SeederOptions,
    pub browser: BrowserOptions,
    pub timeout: Duration,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        check_url("store url", &cli.store_url)?;
        if cli.driver == Driver::Browser {
            check_url("webdriver url", &cli.webdriver_url)?;
        }

        let credentials = match (cli.email, cli.password) {
            (Some(email), Some(password)) => Credentials::new(email, password),
            // nothing to log into on a dry run
            (email, password) if cli.driver == Driver::DryRun => {
                Credentials::new(email.unwrap_or_else(|| "dry-run@localhost".into()), password.unwrap_or_default())
            }
            (None, _) => return Err(ConfigError::Missing("STORE_EMAIL")),
            (_, None) => return Err(ConfigError::Missing("STORE_PASSWORD")),
        };

        let pace = if cli.driver == Driver::DryRun { Duration::ZERO } else { Duration::from_millis(cli.pace_ms) };
        let timeout = Duration::from_secs(cli.timeout_secs.max(1));

        Ok(Self {
            driver: cli.driver,
            store_url: cli.store_url,
            credentials,
            catalog: cli.catalog,
            seeder: SeederOptions { policy: cli.on_error, pace },
            browser: BrowserOptions { webdriver_url: cli.webdriver_url, headless: cli.headless, step_timeout: timeout },
            timeout,
        })
    }

    pub fn load_catalog(&self) -> Result<SeedCatalog, CatalogError> {
        match &self.catalog {
            Some(path) => SeedCatalog::from_path(path),
            None => SeedCatalog::sample(),
        }
    }
}

fn check_url(name: &'static str, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl { name, reason: format!("{raw}: {e}") })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl { name, reason: format!("unsupported scheme {other}") }),
    }
}
