//! Value Objects for catalog records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > 50 { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self { sku.0 }
}

#[derive(Debug, Clone)] pub enum SkuError { Empty, TooLong }
impl std::error::Error for SkuError {}
impl fmt::Display for SkuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "SKU empty"), Self::TooLong => write!(f, "SKU too long") }
    }
}

/// URL slug: lowercase ASCII letters, digits and single hyphens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() { return Err(SlugError::Empty); }
        if let Some(c) = value.chars().find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')) {
            return Err(SlugError::InvalidChar(c));
        }
        if value.starts_with('-') || value.ends_with('-') || value.contains("--") {
            return Err(SlugError::MisplacedHyphen);
        }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self { slug.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SlugError { Empty, InvalidChar(char), MisplacedHyphen }
impl std::error::Error for SlugError {}
impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "slug empty"),
            Self::InvalidChar(c) => write!(f, "slug contains invalid character {c:?}"),
            Self::MisplacedHyphen => write!(f, "slug has a leading, trailing or doubled hyphen"),
        }
    }
}

/// Non-negative price, sent to the store as a JSON number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() { return Err(PriceError::Negative); }
        if amount.scale() > 2 { return Err(PriceError::TooPrecise); }
        Ok(Self(amount))
    }
    pub fn amount(&self) -> Decimal { self.0 }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value.normalize()) }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self { price.0 }
}

#[derive(Debug, Clone)] pub enum PriceError { Negative, TooPrecise }
impl std::error::Error for PriceError {}
impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Negative => write!(f, "price is negative"), Self::TooPrecise => write!(f, "price has more than two decimal places") }
    }
}

/// Identifier assigned by the content store. REST responses carry numeric ids,
/// the admin UI addresses entries by document id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Numeric(u64),
    Document(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Numeric(id) => write!(f, "{id}"), Self::Document(id) => write!(f, "{id}") }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerPosition { Hero, Promotional, Secondary }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowcaseType { #[default] Manual, Automatic }

/// Rule an automatic showcase uses to pick its products. The selection itself
/// runs in the storefront, not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum SelectionCriterion {
    BestSellers {
        #[serde(rename = "limite")]
        limit: u32,
    },
    OnSale {
        #[serde(rename = "limite")]
        limit: u32,
    },
    NewArrivals {
        #[serde(rename = "dias", default, skip_serializing_if = "Option::is_none")]
        days: Option<u32>,
        #[serde(rename = "limite")]
        limit: u32,
    },
}

impl SelectionCriterion {
    pub fn limit(&self) -> u32 {
        match self { Self::BestSellers { limit } | Self::OnSale { limit } | Self::NewArrivals { limit, .. } => *limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sku() { let sku = Sku::new("rac-prem-001").unwrap(); assert_eq!(sku.as_str(), "RAC-PREM-001"); }

    #[test]
    fn test_slug_rejects_spaces_and_accents() {
        assert_eq!(Slug::new("food").unwrap().as_str(), "food");
        assert_eq!(Slug::new("cama ortopedica"), Err(SlugError::InvalidChar(' ')));
        assert_eq!(Slug::new("ração"), Err(SlugError::InvalidChar('ç')));
        assert_eq!(Slug::new("-food"), Err(SlugError::MisplacedHyphen));
    }

    #[test]
    fn test_price_serializes_as_number() {
        let price = Price::new(Decimal::new(8990, 2)).unwrap();
        assert_eq!(serde_json::to_value(price).unwrap(), json!(89.9));
        let parsed: Price = serde_json::from_value(json!(24.90)).unwrap();
        assert_eq!(parsed.amount(), Decimal::new(249, 1));
        assert!(serde_json::from_value::<Price>(json!(-1)).is_err());
    }

    #[test]
    fn test_record_id_accepts_numbers_and_documents() {
        assert_eq!(serde_json::from_value::<RecordId>(json!(7)).unwrap(), RecordId::Numeric(7));
        assert_eq!(serde_json::from_value::<RecordId>(json!("abc123")).unwrap(), RecordId::Document("abc123".into()));
    }

    #[test]
    fn test_criterion_wire_shape() {
        let criterion = SelectionCriterion::NewArrivals { days: Some(30), limit: 8 };
        assert_eq!(serde_json::to_value(&criterion).unwrap(), json!({"tipo": "new_arrivals", "dias": 30, "limite": 8}));
        let on_sale: SelectionCriterion = serde_json::from_value(json!({"tipo": "on_sale", "limite": 4})).unwrap();
        assert_eq!(on_sale.limit(), 4);
    }
}
