//! Records module
//!
//! Payloads sent to the content store. Rust field names are English; the
//! serialized names are the store's own attribute names.
pub mod category;
pub mod product;
pub mod banner;
pub mod showcase;

pub use category::CategoryRecord;
pub use product::ProductRecord;
pub use banner::BannerRecord;
pub use showcase::ShowcaseRecord;

use serde::Serialize;
use std::fmt;

/// Collection types the seeder provisions, in dependency order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind { Category, Product, Banner, Showcase }

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Category, Self::Product, Self::Banner, Self::Showcase];

    /// REST collection segment, `/api/<collection>`.
    pub fn collection(&self) -> &'static str {
        match self { Self::Category => "categories", Self::Product => "products", Self::Banner => "banners", Self::Showcase => "showcases" }
    }

    /// Content-manager uid used by the admin UI.
    pub fn admin_uid(&self) -> &'static str {
        match self {
            Self::Category => "api::category.category",
            Self::Product => "api::product.product",
            Self::Banner => "api::banner.banner",
            Self::Showcase => "api::showcase.showcase",
        }
    }

    /// Attributes rendered as a select box rather than a text input.
    pub fn choice_fields(&self) -> &'static [&'static str] {
        match self { Self::Banner => &["posicao"], Self::Showcase => &["tipo"], _ => &[] }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self { Self::Category => "category", Self::Product => "product", Self::Banner => "banner", Self::Showcase => "showcase" };
        f.write_str(name)
    }
}

/// A resolved record, ready to be submitted. Serializes to the bare attribute
/// object; callers wrap it in whatever envelope their transport needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Category(CategoryRecord),
    Product(ProductRecord),
    Banner(BannerRecord),
    Showcase(ShowcaseRecord),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Category(_) => EntityKind::Category,
            Self::Product(_) => EntityKind::Product,
            Self::Banner(_) => EntityKind::Banner,
            Self::Showcase(_) => EntityKind::Showcase,
        }
    }

    /// Human-readable name used in logs.
    pub fn label(&self) -> &str {
        match self {
            Self::Category(c) => &c.name,
            Self::Product(p) => &p.title,
            Self::Banner(b) => &b.title,
            Self::Showcase(s) => &s.title,
        }
    }
}
