//! Product record

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::components::{ColorOption, SizeOption};
use crate::domain::value_objects::{Price, RecordId, Sku, Slug};

/// Product attributes. `R` is how categories are referenced: catalog files
/// name them by [`Slug`], submitted records carry the store's [`RecordId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProductRecord<R = RecordId> {
    #[serde(rename = "titulo")]
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub slug: Slug,
    #[serde(rename = "descricaoCurta")]
    #[validate(length(min = 1, max = 255))]
    pub short_description: String,
    #[serde(rename = "descricaoLonga", default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    pub sku: Sku,
    #[serde(rename = "preco")]
    pub price: Price,
    #[serde(rename = "precoPromocional", default, skip_serializing_if = "Option::is_none")]
    pub promotional_price: Option<Price>,
    #[serde(rename = "emPromocao", default)]
    pub on_sale: bool,
    #[serde(rename = "novoLancamento", default)]
    pub new_arrival: bool,
    #[serde(rename = "estoque", default)]
    pub stock: u32,
    #[serde(rename = "vendidos", default)]
    pub sold: u32,
    #[serde(rename = "tamanhos", default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<SizeOption>,
    #[serde(rename = "cores", default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<ColorOption>,
    #[serde(rename = "categorias", default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<R>,
}

impl<R> ProductRecord<R> {
    /// Swap the category references, keeping every other attribute.
    pub fn with_categories<T>(self, categories: Vec<T>) -> ProductRecord<T> {
        ProductRecord {
            title: self.title, slug: self.slug, short_description: self.short_description,
            long_description: self.long_description, sku: self.sku, price: self.price,
            promotional_price: self.promotional_price, on_sale: self.on_sale, new_arrival: self.new_arrival,
            stock: self.stock, sold: self.sold, sizes: self.sizes, colors: self.colors, categories,
        }
    }

    pub fn is_discounted(&self) -> bool {
        matches!(self.promotional_price, Some(promo) if promo < self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn treats() -> ProductRecord<Slug> {
        serde_json::from_value(json!({
            "titulo": "Petiscos Naturais",
            "slug": "petiscos-naturais",
            "descricaoCurta": "Petiscos 100% naturais sem conservantes",
            "sku": "PET-NAT-001",
            "preco": 24.90,
            "novoLancamento": true,
            "estoque": 100,
            "vendidos": 45,
            "categorias": ["food"]
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_promotional_price_is_omitted() {
        let record = treats().with_categories(vec![RecordId::Numeric(3)]);
        let payload = serde_json::to_value(&record).unwrap();
        assert!(payload.get("precoPromocional").is_none());
        assert!(payload.get("tamanhos").is_none());
        assert_eq!(payload["categorias"], json!([3]));
        assert_eq!(payload["emPromocao"], json!(false));
    }

    #[test]
    fn test_discount() {
        let mut record = treats();
        assert!(!record.is_discounted());
        record.promotional_price = Some(Price::new(Decimal::new(1990, 2)).unwrap());
        assert!(record.is_discounted());
    }

    #[test]
    fn test_empty_category_list_is_omitted() {
        let record: ProductRecord = treats().with_categories(Vec::new());
        assert!(serde_json::to_value(&record).unwrap().get("categorias").is_none());
    }
}
