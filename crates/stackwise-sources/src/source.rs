//! Source traits consumed by the engine.
//!
//! Methods return boxed futures so the engine can hold heterogeneous sources
//! behind trait objects and poll them concurrently.

use futures::future::BoxFuture;
use stackwise_core::{FeedDeal, GiftCardDeal};

use crate::error::SourceError;
use crate::shopping::RawOfferRecord;

/// The mandatory price search provider.
pub trait PriceSource: Send + Sync {
    /// Raw offers for `item` near `location`, at most `limit` per result
    /// section, in provider order.
    ///
    /// Returns [`SourceError::MissingCredential`] without any I/O when the
    /// provider credential is not configured.
    fn search<'a>(
        &'a self,
        item: &'a str,
        location: &'a str,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<RawOfferRecord>, SourceError>>;
}

/// Gift-card markdown lookup, keyed by store name.
pub trait GiftCardSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn gift_card_deal<'a>(
        &'a self,
        store: &'a str,
    ) -> BoxFuture<'a, Result<Option<GiftCardDeal>, SourceError>>;
}

/// A supplementary coupon / cashback feed. Deals are informational and never
/// change an offer's effective price.
pub trait DealFeed: Send + Sync {
    fn name(&self) -> &'static str;

    /// Starts any up-front download in the background so later lookups find
    /// it ready. Must not block; the default does nothing.
    fn prefetch(&self) {}

    /// Returns an empty list without I/O when the feed's credential is not
    /// configured.
    fn deals_for_store<'a>(
        &'a self,
        store: &'a str,
    ) -> BoxFuture<'a, Result<Vec<FeedDeal>, SourceError>>;
}
