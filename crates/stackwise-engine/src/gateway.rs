//! Concurrent, fault-isolated lookups against the discount sources.
//!
//! Every source call is bounded by the same timeout. Errors, timeouts, and
//! out-of-range discounts are logged at `warn` and degrade to "no discount";
//! nothing from a discount source ever fails an analysis.

use std::time::Duration;

use futures::future::join_all;
use stackwise_core::{FeedDeals, GiftCardDeal};
use stackwise_sources::{DealFeed, GiftCardSource};

/// What the discount sources offered for one store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountLookup {
    pub gift_card: Option<GiftCardDeal>,
    /// Only feeds that returned at least one deal, in registration order.
    pub feed_deals: Vec<FeedDeals>,
}

pub struct DiscountGateway {
    gift_cards: Box<dyn GiftCardSource>,
    feeds: Vec<Box<dyn DealFeed>>,
    timeout: Duration,
}

impl DiscountGateway {
    #[must_use]
    pub fn new(gift_cards: Box<dyn GiftCardSource>, timeout: Duration) -> Self {
        Self {
            gift_cards,
            feeds: Vec::new(),
            timeout,
        }
    }

    /// Registers a supplementary deal feed.
    #[must_use]
    pub fn with_feed(mut self, feed: Box<dyn DealFeed>) -> Self {
        self.feeds.push(feed);
        self
    }

    /// Lets every feed start its up-front work (such as a bulk download) in
    /// the background, outside the per-lookup timeout.
    pub fn prefetch_feeds(&self) {
        for feed in &self.feeds {
            feed.prefetch();
        }
    }

    /// Queries the gift-card source and every feed concurrently and waits for
    /// all of them. A blank store skips every source.
    pub async fn lookup(&self, store: &str) -> DiscountLookup {
        if store.trim().is_empty() {
            return DiscountLookup::default();
        }

        let (gift_card, feed_deals) =
            futures::join!(self.gift_card_deal(store), self.feed_deals(store));

        DiscountLookup {
            gift_card,
            feed_deals,
        }
    }

    async fn gift_card_deal(&self, store: &str) -> Option<GiftCardDeal> {
        let source = self.gift_cards.name();
        match tokio::time::timeout(self.timeout, self.gift_cards.gift_card_deal(store)).await {
            Ok(Ok(Some(deal))) if deal.is_valid() => Some(deal),
            Ok(Ok(Some(deal))) => {
                tracing::warn!(
                    store,
                    source,
                    discount = %deal.discount,
                    "gift card discount outside [0, 1), ignoring"
                );
                None
            }
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                tracing::warn!(store, source, error = %e, "gift card source unavailable");
                None
            }
            Err(_) => {
                tracing::warn!(store, source, timeout = ?self.timeout, "gift card source timed out");
                None
            }
        }
    }

    async fn feed_deals(&self, store: &str) -> Vec<FeedDeals> {
        let lookups = self.feeds.iter().map(|feed| async move {
            let source = feed.name();
            match tokio::time::timeout(self.timeout, feed.deals_for_store(store)).await {
                Ok(Ok(deals)) if deals.is_empty() => None,
                Ok(Ok(deals)) => {
                    tracing::debug!(store, source, count = deals.len(), "collected feed deals");
                    Some(FeedDeals {
                        source: source.to_string(),
                        deals,
                    })
                }
                Ok(Err(e)) => {
                    tracing::warn!(store, source, error = %e, "deal feed unavailable");
                    None
                }
                Err(_) => {
                    tracing::warn!(store, source, timeout = ?self.timeout, "deal feed timed out");
                    None
                }
            }
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }
}
