//! Banner record

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::value_objects::BannerPosition;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BannerRecord {
    #[serde(rename = "titulo")]
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(rename = "subtitulo", default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(rename = "textoDestaque", default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub link: Option<String>,
    #[serde(rename = "posicao")]
    pub position: BannerPosition,
    #[serde(rename = "ordem")]
    pub display_order: u32,
    #[serde(rename = "ativo", default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool { true }
