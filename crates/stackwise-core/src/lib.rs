//! Domain model, lookup catalog, shopping context, and configuration for the
//! `StackWise` savings engine.

mod app_config;
mod catalog;
mod config;
mod offers;
mod profile;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    is_valid_rate, load_catalog, normalize_store_name, CardPerks, CatalogFile, GiftCardDeal, Perk,
    PerkKind, PerkScope, PerkTerms, SavingsCatalog,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use offers::{
    AnalyzedOffer, BestDealResult, FeedDeal, FeedDeals, Offer, SavingsBreakdown,
    ShoppingListReport, StoreSavings,
};
pub use profile::{load_profile, CreditCard, GroceryItem, ShoppingContext, WishlistItem};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    FileParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}
