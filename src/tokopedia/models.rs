//! Data models for Tokopedia listings, variants, and reviews.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One independently-choosable product dimension (e.g. color, size) with the
/// option labels advertised on initial page load. Later selections may
/// disable some of these options; the advertised list itself never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAxis {
    /// Normalized lowercase axis label, e.g. "warna".
    pub name: String,
    /// Option labels in page order.
    pub options: Vec<String>,
}

impl VariantAxis {
    pub fn new(name: impl Into<String>, options: Vec<String>) -> Self {
        Self { name: name.into(), options }
    }
}

/// A full assignment of one option per axis, kept in axis order.
///
/// Serialized as a JSON map (`{"warna": "Hitam", "ukuran": "XL"}`) but backed
/// by an ordered list so selections are applied and re-applied in the same
/// sequence every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combination {
    entries: Vec<(String, String)>,
}

impl Combination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns an option to an axis, replacing any earlier choice for it.
    pub fn set(&mut self, axis: impl Into<String>, option: impl Into<String>) {
        let axis = axis.into();
        let option = option.into();
        if let Some(entry) = self.entries.iter_mut().find(|(a, _)| *a == axis) {
            entry.1 = option;
        } else {
            self.entries.push((axis, option));
        }
    }

    pub fn get(&self, axis: &str) -> Option<&str> {
        self.entries.iter().find(|(a, _)| a == axis).map(|(_, o)| o.as_str())
    }

    /// (axis, option) pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, o)| (a.as_str(), o.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> =
            self.entries.iter().map(|(a, o)| format!("{}={}", a, o)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl Serialize for Combination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (axis, option) in &self.entries {
            map.serialize_entry(axis, option)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Combination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CombinationVisitor;

        impl<'de> Visitor<'de> for CombinationVisitor {
            type Value = Combination;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of axis names to option labels")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut combination = Combination::new();
                while let Some((axis, option)) = access.next_entry::<String, String>()? {
                    combination.set(axis, option);
                }
                Ok(combination)
            }
        }

        deserializer.deserialize_map(CombinationVisitor)
    }
}

/// Pricing and stock for one purchasable combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDetail {
    pub variant_options: Combination,
    /// Displayed (post-discount) price in rupiah.
    pub final_price: u64,
    /// Slash price if the listing is discounted; equals `final_price` when
    /// no slash price is shown.
    pub original_price: Option<u64>,
    pub stock: u32,
    /// Percentage off, rounded to one decimal. 0 unless
    /// `original_price > final_price`.
    pub discount_percent: f64,
}

impl VariantDetail {
    /// Builds a detail record, filling in the discount from the two prices.
    pub fn new(
        variant_options: Combination,
        final_price: u64,
        original_price: Option<u64>,
        stock: u32,
    ) -> Self {
        let original = original_price.unwrap_or(final_price);
        let discount_percent = if original > final_price {
            let off = (original - final_price) as f64 / original as f64 * 100.0;
            (off * 10.0).round() / 10.0
        } else {
            0.0
        };

        Self {
            variant_options,
            final_price,
            original_price: Some(original),
            stock,
            discount_percent,
        }
    }
}

/// Summary extracted from one search-result card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSummary {
    pub title: String,
    /// The search query the card was found under.
    pub label: String,
    pub displayed_price_final: u64,
    pub displayed_price_original: u64,
    /// Badge discount percentage on the card, 0 when absent.
    pub discount: u32,
    pub image_url: Option<String>,
    pub seller_name: Option<String>,
    pub location: Option<String>,
    pub product_rating: Option<f64>,
    pub sold_count: Option<String>,
    pub product_url: Option<String>,
}

/// An "etalase" (seller collection) link on the product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionLink {
    pub text: String,
    pub url: String,
}

/// Thumbnail and enlarged preview URLs for the product gallery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailImages {
    pub thumbnail: Vec<String>,
    pub preview: Vec<String>,
}

/// A single customer review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Review {
    pub user_name: Option<String>,
    pub variant: Option<String>,
    pub rating: Option<f64>,
    pub time_ago: Option<String>,
    pub text: String,
    pub image_url: Option<String>,
}

/// Everything collected from a product page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductDetail {
    pub seller_rating: f64,
    pub condition: String,
    pub collection: Vec<CollectionLink>,
    pub min_order: u32,
    pub description: String,
    pub delivery_origin: String,
    pub variants: Vec<VariantAxis>,
    pub available_variant_details: Vec<VariantDetail>,
    pub detail_images: DetailImages,
    pub reviews: Vec<Review>,
}

/// A search-card summary merged with its page details - the unit persisted
/// by the result store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(flatten)]
    pub summary: ProductSummary,
    #[serde(flatten)]
    pub detail: ProductDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combo(pairs: &[(&str, &str)]) -> Combination {
        let mut c = Combination::new();
        for (a, o) in pairs {
            c.set(*a, *o);
        }
        c
    }

    #[test]
    fn test_combination_preserves_order() {
        let c = combo(&[("warna", "Hitam"), ("ukuran", "XL")]);
        let pairs: Vec<_> = c.iter().collect();
        assert_eq!(pairs, vec![("warna", "Hitam"), ("ukuran", "XL")]);
        assert_eq!(c.len(), 2);
        assert!(!c.is_empty());
    }

    #[test]
    fn test_combination_set_replaces() {
        let mut c = combo(&[("warna", "Hitam"), ("ukuran", "XL")]);
        c.set("warna", "Putih");
        assert_eq!(c.get("warna"), Some("Putih"));
        assert_eq!(c.len(), 2);
        // Axis order unchanged by replacement
        let pairs: Vec<_> = c.iter().collect();
        assert_eq!(pairs[0].0, "warna");
    }

    #[test]
    fn test_combination_serializes_as_ordered_map() {
        let c = combo(&[("warna", "Hitam"), ("ukuran", "XL")]);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"warna":"Hitam","ukuran":"XL"}"#);
    }

    #[test]
    fn test_combination_deserialize_roundtrip() {
        let c = combo(&[("warna", "Merah"), ("ukuran", "M")]);
        let json = serde_json::to_string(&c).unwrap();
        let parsed: Combination = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn test_combination_display() {
        let c = combo(&[("warna", "Hitam"), ("ukuran", "XL")]);
        assert_eq!(c.to_string(), "warna=Hitam, ukuran=XL");
    }

    #[test]
    fn test_variant_detail_discount() {
        let d = VariantDetail::new(combo(&[("ukuran", "M")]), 80_000, Some(100_000), 5);
        assert_eq!(d.discount_percent, 20.0);
        assert_eq!(d.original_price, Some(100_000));
    }

    #[test]
    fn test_variant_detail_discount_one_decimal() {
        // 1/3 off rounds to one decimal place
        let d = VariantDetail::new(combo(&[("ukuran", "M")]), 100_000, Some(150_000), 1);
        assert_eq!(d.discount_percent, 33.3);
    }

    #[test]
    fn test_variant_detail_no_discount_without_slash_price() {
        let d = VariantDetail::new(combo(&[("ukuran", "M")]), 80_000, None, 5);
        assert_eq!(d.discount_percent, 0.0);
        assert_eq!(d.original_price, Some(80_000));
    }

    #[test]
    fn test_variant_detail_no_discount_when_equal() {
        let d = VariantDetail::new(combo(&[("ukuran", "M")]), 80_000, Some(80_000), 5);
        assert_eq!(d.discount_percent, 0.0);
    }

    #[test]
    fn test_variant_detail_original_below_final() {
        // Slash price below the displayed price is not a discount
        let d = VariantDetail::new(combo(&[("ukuran", "M")]), 80_000, Some(60_000), 5);
        assert_eq!(d.discount_percent, 0.0);
    }

    #[test]
    fn test_variant_detail_serde() {
        let d = VariantDetail::new(
            combo(&[("warna", "Hitam"), ("ukuran", "XL")]),
            80_000,
            Some(100_000),
            3,
        );
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains(r#""variant_options":{"warna":"Hitam","ukuran":"XL"}"#));
        assert!(json.contains(r#""discount_percent":20.0"#));

        let parsed: VariantDetail = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn test_product_record_flattens() {
        let record = ProductRecord {
            summary: ProductSummary {
                title: "Kaos Polo".to_string(),
                label: "Polo Pria".to_string(),
                displayed_price_final: 99_000,
                ..Default::default()
            },
            detail: ProductDetail { seller_rating: 4.8, ..Default::default() },
        };

        let json = serde_json::to_value(&record).unwrap();
        // Both halves live at the top level of the persisted object
        assert_eq!(json["title"], "Kaos Polo");
        assert_eq!(json["seller_rating"], 4.8);
        assert!(json.get("summary").is_none());
        assert!(json.get("detail").is_none());
    }
}
