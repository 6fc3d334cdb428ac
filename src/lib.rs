//! OpenSASE Catalog Seeder
//!
//! Provisions a headless storefront CMS with an initial catalog.
//!
//! ## Features
//! - Categories, products, banners and showcases created in dependency order
//! - Every record published right after it is created
//! - REST API and admin-UI (WebDriver) store adapters behind one trait
//! - Seed content read from a JSON catalog file
//! - Abort-on-first-failure or best-effort runs

pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod seeder;
pub mod store;
pub mod webdriver;

pub use catalog::{CatalogError, SeedCatalog};
pub use seeder::{FailurePolicy, SeedPhase, SeedReport, Seeder, SeederOptions};
pub use store::{ContentStore, Credentials, StoreError};

use domain::EntityKind;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("authentication failed: {0}")]
    Authentication(#[source] StoreError),

    #[error("could not create {kind} {label}: {source}")]
    Create { kind: EntityKind, label: String, #[source] source: StoreError },

    #[error("records cannot be submitted while the seeder is {0}")]
    OutOfPhase(SeedPhase),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, SeedError>;
