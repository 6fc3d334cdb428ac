use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::seeder::FailurePolicy;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
#[command(name = "opensase-seeder")]
#[command(about = "Create and publish the initial storefront catalog in the content store")]
pub struct Cli {
    /// Catalog JSON file; the bundled sample catalog when omitted
    #[arg(short, long, env = "SEED_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[arg(long, env = "STORE_URL", default_value = "http://localhost:1337")]
    pub store_url: String,

    #[arg(long, env = "STORE_EMAIL")]
    pub email: Option<String>,

    #[arg(long, env = "STORE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(short, long, value_enum, default_value = "rest")]
    pub driver: Driver,

    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// Run the browser without a window; it is visible by default
    #[arg(long, env = "BROWSER_HEADLESS")]
    pub headless: bool,

    #[arg(long = "on-error", value_enum, default_value = "abort")]
    pub on_error: FailurePolicy,

    /// Minimum milliseconds between two record submissions
    #[arg(long, default_value_t = 500)]
    pub pace_ms: u64,

    /// Request timeout in seconds (per HTTP call or per browser step)
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Driver {
    /// Content REST API (default)
    Rest,
    /// Admin web UI through a WebDriver server
    Browser,
    /// In-process store; nothing leaves the machine
    DryRun,
}
