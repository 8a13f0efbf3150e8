use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::catalog::{GiftCardDeal, Perk};
use crate::profile::CreditCard;

/// A single priced listing for an item at a store, normalized from the price
/// provider's raw result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Merchant name as reported by the provider, e.g. `"Target"`.
    pub store: String,
    pub title: String,
    /// Display price exactly as the provider rendered it, e.g. `"$4.99"`.
    pub listed_price: Option<String>,
    /// Parsed numeric price; always non-negative.
    pub base_price: Decimal,
    pub source_link: Option<String>,
    pub delivery_info: Option<String>,
    pub thumbnail: Option<String>,
    /// Free-form provider annotations such as `"Free delivery"` or `"Sale"`.
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Human-readable description of which discounts were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsBreakdown {
    /// e.g. `"4% off via Reloadly gift card"`.
    pub gift_card: Option<String>,
    /// e.g. `"5% cashback with Chase Freedom"`.
    pub credit_card: Option<String>,
}

impl std::fmt::Display for SavingsBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.gift_card, &self.credit_card) {
            (Some(g), Some(c)) => write!(f, "{g}, then {c}"),
            (Some(only), None) | (None, Some(only)) => write!(f, "{only}"),
            (None, None) => write!(f, "no discounts applied"),
        }
    }
}

/// A coupon or promotion surfaced by a supplementary feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDeal {
    pub title: String,
    pub code: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub ends_at: Option<String>,
}

/// Everything one supplementary feed returned for a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDeals {
    pub source: String,
    pub deals: Vec<FeedDeal>,
}

/// An [`Offer`] with discounts composed in order: gift card first, then the
/// best credit-card perk on the reduced price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedOffer {
    #[serde(flatten)]
    pub offer: Offer,
    pub gift_card_discount: Decimal,
    pub gift_card_provider: Option<String>,
    /// Rounded to 2 decimal places.
    pub price_after_gift_card: Decimal,
    pub credit_card_perk: Decimal,
    /// Card contributing `credit_card_perk`, if any perk applied.
    pub perk_card: Option<String>,
    /// Rounded to 2 decimal places, independently of `price_after_gift_card`.
    pub final_effective_price: Decimal,
    pub breakdown: SavingsBreakdown,
    /// Informational only; never affects `final_effective_price`.
    #[serde(default)]
    pub feed_deals: Vec<FeedDeals>,
}

impl AnalyzedOffer {
    /// Amount saved against the base price.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.offer.base_price - self.final_effective_price
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestDealResult {
    pub best_deal: Option<AnalyzedOffer>,
    /// In the order the offers arrived from the provider.
    pub all_deals: Vec<AnalyzedOffer>,
}

/// Per-item results of one shopping-list analysis, in request order.
///
/// Serializes as a JSON object keyed by item name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingListReport {
    items: Vec<(String, BestDealResult)>,
}

impl ShoppingListReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `result` for `item`. An item already in the report keeps its
    /// position and has its result replaced.
    pub fn push(&mut self, item: impl Into<String>, result: BestDealResult) {
        let item = item.into();
        match self.items.iter_mut().find(|(name, _)| *name == item) {
            Some((_, existing)) => *existing = result,
            None => self.items.push((item, result)),
        }
    }

    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|(name, _)| name == item)
    }

    #[must_use]
    pub fn get(&self, item: &str) -> Option<&BestDealResult> {
        self.items
            .iter()
            .find(|(name, _)| name == item)
            .map(|(_, result)| result)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BestDealResult)> {
        self.items.iter().map(|(name, result)| (name.as_str(), result))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Serialize for ShoppingListReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (name, result) in &self.items {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

/// Savings available at one store for the user's cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSavings {
    pub store: String,
    pub category: Option<String>,
    pub credit_card_perks: Vec<Perk>,
    pub best_perk: Decimal,
    pub gift_card_deal: Option<GiftCardDeal>,
    pub user_cards: Vec<CreditCard>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzed(store: &str, final_price: Decimal) -> AnalyzedOffer {
        AnalyzedOffer {
            offer: Offer {
                store: store.to_string(),
                title: "Whole Milk 1 gal".to_string(),
                listed_price: Some("$10.00".to_string()),
                base_price: Decimal::new(1000, 2),
                source_link: None,
                delivery_info: None,
                thumbnail: None,
                extensions: vec![],
            },
            gift_card_discount: Decimal::ZERO,
            gift_card_provider: None,
            price_after_gift_card: Decimal::new(1000, 2),
            credit_card_perk: Decimal::ZERO,
            perk_card: None,
            final_effective_price: final_price,
            breakdown: SavingsBreakdown::default(),
            feed_deals: vec![],
        }
    }

    #[test]
    fn breakdown_display_joins_both_parts() {
        let breakdown = SavingsBreakdown {
            gift_card: Some("4% off via Reloadly gift card".to_string()),
            credit_card: Some("5% discount with Target RedCard".to_string()),
        };
        assert_eq!(
            breakdown.to_string(),
            "4% off via Reloadly gift card, then 5% discount with Target RedCard"
        );
        assert_eq!(
            SavingsBreakdown::default().to_string(),
            "no discounts applied"
        );
    }

    #[test]
    fn analyzed_offer_flattens_offer_fields() {
        let json = serde_json::to_value(analyzed("QFC", Decimal::new(912, 2))).unwrap();
        assert_eq!(json["store"], "QFC");
        assert_eq!(json["final_effective_price"], "9.12");
        assert!(json.get("offer").is_none());
    }

    #[test]
    fn savings_is_base_minus_final() {
        assert_eq!(
            analyzed("QFC", Decimal::new(912, 2)).savings(),
            Decimal::new(88, 2)
        );
    }

    #[test]
    fn report_serializes_in_request_order() {
        let mut report = ShoppingListReport::new();
        report.push("zucchini", BestDealResult::default());
        report.push("apples", BestDealResult::default());
        let rendered = serde_json::to_string(&report).unwrap();
        assert_eq!(
            rendered,
            r#"{"zucchini":{"best_deal":null,"all_deals":[]},"apples":{"best_deal":null,"all_deals":[]}}"#
        );
    }

    #[test]
    fn pushing_an_existing_item_replaces_it_in_place() {
        let mut report = ShoppingListReport::new();
        report.push("milk", BestDealResult::default());
        report.push("eggs", BestDealResult::default());
        let replacement = BestDealResult {
            best_deal: None,
            all_deals: vec![analyzed("QFC", Decimal::new(400, 2))],
        };
        report.push("milk", replacement.clone());

        assert_eq!(report.len(), 2);
        assert!(report.contains("milk"));
        assert_eq!(report.get("milk"), Some(&replacement));
        let keys: Vec<_> = report.iter().map(|(name, _)| name).collect();
        assert_eq!(keys, vec!["milk", "eggs"]);

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json.as_object().unwrap().len(), report.len());
    }

    #[test]
    fn report_lookup_by_item() {
        let mut report = ShoppingListReport::new();
        let result = BestDealResult {
            best_deal: Some(analyzed("Target", Decimal::new(912, 2))),
            all_deals: vec![analyzed("Target", Decimal::new(912, 2))],
        };
        report.push("milk", result.clone());
        assert_eq!(report.get("milk"), Some(&result));
        assert!(report.get("eggs").is_none());
        assert_eq!(report.len(), 1);
    }
}
