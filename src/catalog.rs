//! Seed catalog
//!
//! The records a run provisions, read from a JSON file. Products reference
//! categories by slug and showcases reference products by SKU; the seeder
//! swaps those for store identifiers as it goes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::{BannerRecord, CategoryRecord, ProductRecord, ShowcaseRecord, Sku, Slug};

const SAMPLE_CATALOG: &str = include_str!("../data/catalog.json");

pub type ProductSeed = ProductRecord<Slug>;
pub type ShowcaseSeed = ShowcaseRecord<Sku>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    #[serde(default)]
    pub banners: Vec<BannerRecord>,
    #[serde(default)]
    pub showcases: Vec<ShowcaseSeed>,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid entry {entry}: {source}")]
    Invalid { entry: String, #[source] source: ValidationErrors },

    #[error("category slug {0} appears more than once")]
    DuplicateSlug(Slug),

    #[error("product SKU {0} appears more than once")]
    DuplicateSku(Sku),

    #[error("showcase identifier {0} appears more than once")]
    DuplicateIdentifier(Slug),

    #[error("product {product} references unknown category {slug}")]
    UnknownCategory { product: String, slug: Slug },

    #[error("showcase {showcase} references unknown product {sku}")]
    UnknownProduct { showcase: String, sku: Sku },
}

impl SeedCatalog {
    /// The bundled storefront sample: 6 categories, 8 products, 3 banners, 3 showcases.
    pub fn sample() -> Result<Self, CatalogError> {
        Self::from_json(SAMPLE_CATALOG)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn record_count(&self) -> usize {
        self.categories.len() + self.products.len() + self.banners.len() + self.showcases.len()
    }

    /// Field constraints, uniqueness and reference integrity. Runs before any
    /// remote call so a broken file never leaves a half-seeded store.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut slugs = HashSet::new();
        for category in &self.categories {
            check(&category.name, category)?;
            if !slugs.insert(&category.slug) {
                return Err(CatalogError::DuplicateSlug(category.slug.clone()));
            }
        }

        let mut skus = HashSet::new();
        for product in &self.products {
            check(&product.title, product)?;
            for size in &product.sizes {
                check(&product.title, size)?;
            }
            for color in &product.colors {
                check(&product.title, color)?;
            }
            if !skus.insert(&product.sku) {
                return Err(CatalogError::DuplicateSku(product.sku.clone()));
            }
            if let Some(slug) = product.categories.iter().find(|slug| !slugs.contains(slug)) {
                return Err(CatalogError::UnknownCategory { product: product.title.clone(), slug: slug.clone() });
            }
        }

        for banner in &self.banners {
            check(&banner.title, banner)?;
        }

        let mut identifiers = HashSet::new();
        for showcase in &self.showcases {
            check(&showcase.title, showcase)?;
            if !identifiers.insert(&showcase.identifier) {
                return Err(CatalogError::DuplicateIdentifier(showcase.identifier.clone()));
            }
            if let Some(sku) = showcase.products.iter().find(|sku| !skus.contains(sku)) {
                return Err(CatalogError::UnknownProduct { showcase: showcase.title.clone(), sku: sku.clone() });
            }
        }
        Ok(())
    }
}

fn check(entry: &str, value: &impl Validate) -> Result<(), CatalogError> {
    value.validate().map_err(|source| CatalogError::Invalid { entry: entry.to_string(), source })
}
