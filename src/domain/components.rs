//! Reusable content fragments of the product schema

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Schema metadata of a content-store component.
pub trait Component {
    /// Component uid, `<category>.<name>`.
    const UID: &'static str;
    const COLLECTION: &'static str;
    const DISPLAY_NAME: &'static str;
    const DESCRIPTION: &'static str;
    const ICON: &'static str;
}

/// Color option (`product.color`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ColorOption {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[serde(rename = "codigoHex")]
    #[validate(custom = "validate_hex_code")]
    pub hex_code: String,
}

impl Component for ColorOption {
    const UID: &'static str = "product.color";
    const COLLECTION: &'static str = "components_product_colors";
    const DISPLAY_NAME: &'static str = "Color";
    const DESCRIPTION: &'static str = "Color options for products";
    const ICON: &'static str = "palette";
}

/// Size option (`product.size`). Sizes are available unless stated otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SizeOption {
    #[serde(rename = "nome")]
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "disponivel", default = "available_by_default")]
    pub available: bool,
}

impl SizeOption {
    pub fn available(name: impl Into<String>) -> Self { Self { name: name.into(), available: true } }
    pub fn sold_out(name: impl Into<String>) -> Self { Self { name: name.into(), available: false } }
}

impl Component for SizeOption {
    const UID: &'static str = "product.size";
    const COLLECTION: &'static str = "components_product_sizes";
    const DISPLAY_NAME: &'static str = "Size";
    const DESCRIPTION: &'static str = "Size options for products";
    const ICON: &'static str = "ruler";
}

fn available_by_default() -> bool { true }

fn validate_hex_code(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color"))
    }
}
