//! Adapters for the external collaborators of the savings engine: the
//! shopping price search, the gift-card table, and supplementary coupon feeds.
//!
//! Each adapter implements one of the traits in [`source`] so the engine can
//! run them concurrently and swap them for fakes in tests.

pub mod coupons;
pub mod error;
pub mod gift_cards;
pub mod options;
pub mod shopping;
pub mod source;

mod retry;

pub use coupons::CouponApiClient;
pub use error::SourceError;
pub use gift_cards::CatalogGiftCards;
pub use options::ClientOptions;
pub use shopping::{RawOfferRecord, ShoppingClient};
pub use source::{DealFeed, GiftCardSource, PriceSource};
