//! Externally supplied savings lookup data: credit-card perk tables, the
//! store → category mapping, and the gift-card markdown table.
//!
//! The catalog is loaded from YAML and validated once; every lookup after
//! that is a pure in-memory read.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerkKind {
    Cashback,
    Discount,
}

impl std::fmt::Display for PerkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerkKind::Cashback => write!(f, "cashback"),
            PerkKind::Discount => write!(f, "discount"),
        }
    }
}

/// What a perk is conditioned on. Serialized as a single `store: ...` or
/// `category: ...` key alongside the perk's other fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerkScope {
    /// Exact store name, compared case-insensitively.
    Store(String),
    /// Category from the store → category table.
    Category(String),
}

/// One perk as written under a card in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkTerms {
    #[serde(flatten)]
    pub scope: PerkScope,
    /// Rate in `[0, 1)`, e.g. `0.05` for 5%.
    pub value: Decimal,
    pub kind: PerkKind,
}

/// A perk resolved for a specific card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perk {
    pub card: String,
    #[serde(flatten)]
    pub scope: PerkScope,
    pub value: Decimal,
    pub kind: PerkKind,
}

impl Perk {
    #[must_use]
    pub fn from_terms(card: &str, terms: &PerkTerms) -> Self {
        Self {
            card: card.to_string(),
            scope: terms.scope.clone(),
            value: terms.value,
            kind: terms.kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPerks {
    pub name: String,
    #[serde(default)]
    pub perks: Vec<PerkTerms>,
}

/// A markdown available when paying with a discounted gift card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCardDeal {
    /// Rate in `[0, 1)`.
    pub discount: Decimal,
    pub provider: String,
}

impl GiftCardDeal {
    /// Returns `true` when the discount lies in `[0, 1)`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid_rate(self.discount)
    }
}

/// On-disk shape of the catalog file.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub cards: Vec<CardPerks>,
    #[serde(default)]
    pub store_categories: HashMap<String, String>,
    #[serde(default)]
    pub gift_cards: HashMap<String, GiftCardDeal>,
}

/// Validated, lookup-ready savings data.
#[derive(Debug, Clone, Default)]
pub struct SavingsCatalog {
    /// Keyed by exact card name.
    cards: HashMap<String, Vec<PerkTerms>>,
    /// Keyed by normalized store name.
    store_categories: HashMap<String, String>,
    /// Keyed by normalized store name.
    gift_cards: HashMap<String, GiftCardDeal>,
}

impl SavingsCatalog {
    /// Validates a parsed catalog file and indexes it for lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for blank or duplicate card names,
    /// duplicate stores after normalization, or any rate outside `[0, 1)`.
    pub fn from_file(file: CatalogFile) -> Result<Self, ConfigError> {
        let mut cards = HashMap::new();
        let mut seen_cards = HashSet::new();

        for card in file.cards {
            if card.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "card name must be non-empty".to_string(),
                ));
            }
            if !seen_cards.insert(card.name.clone()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate card: '{}'",
                    card.name
                )));
            }
            for perk in &card.perks {
                if !is_valid_rate(perk.value) {
                    return Err(ConfigError::Validation(format!(
                        "card '{}' has perk value {} outside [0, 1)",
                        card.name, perk.value
                    )));
                }
            }
            cards.insert(card.name, card.perks);
        }

        let mut store_categories = HashMap::new();
        for (store, category) in file.store_categories {
            let key = normalize_store_name(&store);
            if store_categories.insert(key, category).is_some() {
                return Err(ConfigError::Validation(format!(
                    "duplicate store category entry: '{store}'"
                )));
            }
        }

        let mut gift_cards = HashMap::new();
        for (store, deal) in file.gift_cards {
            if !deal.is_valid() {
                return Err(ConfigError::Validation(format!(
                    "gift card for '{store}' has discount {} outside [0, 1)",
                    deal.discount
                )));
            }
            let key = normalize_store_name(&store);
            if gift_cards.insert(key, deal).is_some() {
                return Err(ConfigError::Validation(format!(
                    "duplicate gift card entry: '{store}'"
                )));
            }
        }

        Ok(Self {
            cards,
            store_categories,
            gift_cards,
        })
    }

    /// Perks listed for `card_name`, or `None` for an unknown card.
    #[must_use]
    pub fn perks_for_card(&self, card_name: &str) -> Option<&[PerkTerms]> {
        self.cards.get(card_name).map(Vec::as_slice)
    }

    /// Category for an already-normalized store name.
    #[must_use]
    pub fn category_for(&self, normalized_store: &str) -> Option<&str> {
        self.store_categories
            .get(normalized_store)
            .map(String::as_str)
    }

    /// Gift-card deal for `store`, matched on the normalized name.
    #[must_use]
    pub fn gift_card_for(&self, store: &str) -> Option<&GiftCardDeal> {
        self.gift_cards.get(&normalize_store_name(store))
    }
}

/// Lowercases and trims a store name for table lookups.
#[must_use]
pub fn normalize_store_name(store: &str) -> String {
    store.trim().to_lowercase()
}

/// Discount and perk rates must never reach 100%.
#[must_use]
pub fn is_valid_rate(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate < Decimal::ONE
}

/// Load and validate the savings catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<SavingsCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CatalogFile = serde_yaml::from_str(&content).map_err(|e| ConfigError::FileParse {
        path: path.display().to_string(),
        source: e,
    })?;

    SavingsCatalog::from_file(file)
}
