//! Showcase record

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::domain::value_objects::{RecordId, SelectionCriterion, ShowcaseType, Slug};

/// Showcase attributes. `R` references products: by SKU in catalog files, by
/// [`RecordId`] once the products exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_selection"))]
pub struct ShowcaseRecord<R = RecordId> {
    #[serde(rename = "titulo")]
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(rename = "identificador")]
    pub identifier: Slug,
    #[serde(rename = "tipo", default)]
    pub showcase_type: ShowcaseType,
    #[serde(rename = "criterioAutomatico", default, skip_serializing_if = "Option::is_none")]
    pub criterion: Option<SelectionCriterion>,
    #[serde(rename = "ordem")]
    pub display_order: u32,
    #[serde(rename = "limite")]
    #[validate(range(min = 1, max = 100))]
    pub item_limit: u32,
    #[serde(rename = "ativa", default = "active_by_default")]
    pub active: bool,
    #[serde(rename = "produtos", default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<R>,
}

fn active_by_default() -> bool { true }

fn validate_selection<R>(showcase: &ShowcaseRecord<R>) -> Result<(), ValidationError> {
    match (showcase.showcase_type, &showcase.criterion) {
        (ShowcaseType::Automatic, None) => Err(ValidationError::new("automatic_without_criterion")),
        (ShowcaseType::Manual, Some(_)) => Err(ValidationError::new("manual_with_criterion")),
        _ => Ok(()),
    }
}

impl<R> ShowcaseRecord<R> {
    pub fn with_products<T>(self, products: Vec<T>) -> ShowcaseRecord<T> {
        ShowcaseRecord {
            title: self.title, identifier: self.identifier, showcase_type: self.showcase_type,
            criterion: self.criterion, display_order: self.display_order, item_limit: self.item_limit,
            active: self.active, products,
        }
    }
}
