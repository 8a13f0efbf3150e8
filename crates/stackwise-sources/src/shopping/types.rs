//! SerpApi Google Shopping response types.
//!
//! ## Observed shape
//!
//! Results arrive in two sections, `inline_shopping_results` (sponsored
//! carousel) and `shopping_results` (organic grid). Field presence varies by
//! listing: `extracted_price` is usually a JSON number but is missing for
//! "see price in store" listings, `delivery` is absent for pickup-only
//! stores, and `extensions` is an array of short annotations.
//!
//! Each result is kept as a raw `serde_json::Value` until
//! [`RawOfferRecord::from_value`] pulls fields out leniently, so one odd
//! listing never fails the whole response.

use serde::Deserialize;
use serde_json::Value;

/// Top-level response from `GET /search.json?engine=google_shopping`.
#[derive(Debug, Deserialize)]
pub(crate) struct ShoppingSearchResponse {
    #[serde(default)]
    pub inline_shopping_results: Vec<Value>,
    #[serde(default)]
    pub shopping_results: Vec<Value>,
    /// Present when SerpApi could not serve the search.
    #[serde(default)]
    pub error: Option<String>,
}

/// SerpApi reports an empty search through `error`; that is not a failure.
pub(crate) const NO_RESULTS_MARKER: &str = "hasn't returned any results";

/// One shopping result, with every field optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOfferRecord {
    /// Merchant name (SerpApi `source`).
    pub store: Option<String>,
    pub title: Option<String>,
    /// Display price, e.g. `"$4.99"`.
    pub price: Option<String>,
    /// Numeric price as SerpApi parsed it; number or string.
    pub extracted_price: Option<Value>,
    pub link: Option<String>,
    pub delivery: Option<String>,
    pub extensions: Vec<String>,
    pub thumbnail: Option<String>,
}

impl RawOfferRecord {
    /// Extracts the known fields from one result object. Fields of the wrong
    /// JSON type are treated as absent.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        let extracted_price = value
            .get("extracted_price")
            .filter(|v| v.is_number() || v.is_string())
            .cloned();

        let extensions = value
            .get("extensions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            store: text("source"),
            title: text("title"),
            price: text("price"),
            extracted_price,
            link: text("link").or_else(|| text("product_link")),
            delivery: text("delivery"),
            extensions,
            thumbnail: text("thumbnail"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_reads_serpapi_fields() {
        let record = RawOfferRecord::from_value(&json!({
            "title": "Organic Whole Milk, 1 gal",
            "source": "QFC",
            "price": "$5.49",
            "extracted_price": 5.49,
            "link": "https://www.qfc.com/p/milk",
            "delivery": "Free delivery",
            "extensions": ["Organic", 3],
            "thumbnail": "https://img.example/milk.jpg"
        }));
        assert_eq!(record.store.as_deref(), Some("QFC"));
        assert_eq!(record.price.as_deref(), Some("$5.49"));
        assert_eq!(record.extracted_price, Some(json!(5.49)));
        assert_eq!(record.extensions, vec!["Organic".to_string()]);
    }

    #[test]
    fn from_value_tolerates_wrong_types_and_gaps() {
        let record = RawOfferRecord::from_value(&json!({
            "title": "Milk",
            "source": 42,
            "extracted_price": null,
            "product_link": "https://shopping.example/milk"
        }));
        assert!(record.store.is_none());
        assert!(record.extracted_price.is_none());
        assert!(record.price.is_none());
        assert_eq!(
            record.link.as_deref(),
            Some("https://shopping.example/milk")
        );
    }
}
