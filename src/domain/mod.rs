//! Catalog domain: value objects, schema components, records and seed events
pub mod value_objects;
pub mod components;
pub mod records;
pub mod events;

pub use events::SeedEvent;
pub use records::{BannerRecord, CategoryRecord, EntityKind, ProductRecord, Record, ShowcaseRecord};
pub use value_objects::{BannerPosition, Price, RecordId, SelectionCriterion, ShowcaseType, Sku, Slug};
