//! Category record

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::value_objects::Slug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CategoryRecord {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub slug: Slug,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ordem")]
    pub display_order: u32,
    #[serde(rename = "ativa", default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool { true }

impl CategoryRecord {
    pub fn new(name: impl Into<String>, slug: Slug, display_order: u32) -> Self {
        Self { name: name.into(), slug, description: None, display_order, active: true }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
