//! Savings-stacking and best-deal selection for `StackWise`.
//!
//! For every requested item the engine searches prices across stores,
//! normalizes the listings, matches the user's credit-card perks and the
//! store's gift-card markdown, stacks them in order (gift card first, then the
//! best perk), and picks the cheapest offer.

pub mod error;
pub mod gateway;
pub mod normalize;
pub mod perks;
pub mod pipeline;
pub mod select;
pub mod stacking;

pub use error::EngineError;
pub use gateway::{DiscountGateway, DiscountLookup};
pub use normalize::{normalize_offers, parse_price_text};
pub use perks::{best_perk, best_perk_value, match_perks};
pub use pipeline::{DealRequest, SavingsEngine, DEFAULT_MAX_RESULTS};
pub use select::select_best;
pub use stacking::analyze;
