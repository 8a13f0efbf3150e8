//! Caller-owned user state: credit cards and shopping lists.
//!
//! The engine only ever borrows a [`ShoppingContext`]; it never mutates it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditCard {
    pub name: String,
}

impl CreditCard {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub name: String,
    #[serde(default = "default_urgency")]
    pub urgency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroceryItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_frequency")]
    pub frequency: String,
}

fn default_urgency() -> String {
    "not set".to_string()
}

fn default_quantity() -> u32 {
    1
}

fn default_frequency() -> String {
    "weekly".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShoppingContext {
    #[serde(default)]
    pub credit_cards: Vec<CreditCard>,
    #[serde(default)]
    pub wishlist: Vec<WishlistItem>,
    #[serde(default)]
    pub groceries: Vec<GroceryItem>,
}

impl ShoppingContext {
    #[must_use]
    pub fn with_cards<I, S>(cards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            credit_cards: cards.into_iter().map(CreditCard::new).collect(),
            ..Self::default()
        }
    }

    /// Resolves a requested item against the wishlist, then the grocery list,
    /// case-insensitively. Returns the stored name on a match, otherwise the
    /// requested name unchanged.
    #[must_use]
    pub fn resolve_item_name<'a>(&'a self, requested: &'a str) -> &'a str {
        let wanted = requested.to_lowercase();
        self.wishlist
            .iter()
            .map(|w| w.name.as_str())
            .chain(self.groceries.iter().map(|g| g.name.as_str()))
            .find(|name| name.to_lowercase() == wanted)
            .unwrap_or(requested)
    }
}

/// Load the shopping context from a YAML profile file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_profile(path: &Path) -> Result<ShoppingContext, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    serde_yaml::from_str(&content).map_err(|e| ConfigError::FileParse {
        path: path.display().to_string(),
        source: e,
    })
}
