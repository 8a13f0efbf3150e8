//! Shopping-list orchestration.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use stackwise_core::{
    normalize_store_name, AnalyzedOffer, BestDealResult, Offer, SavingsCatalog, ShoppingContext,
    ShoppingListReport, StoreSavings,
};
use stackwise_sources::{PriceSource, SourceError};

use crate::error::EngineError;
use crate::gateway::DiscountGateway;
use crate::normalize::normalize_offers;
use crate::perks::{best_perk_value, match_perks};
use crate::select::select_best;
use crate::stacking::analyze;

/// Results requested per item when the caller does not say otherwise.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Items to price near one location.
#[derive(Debug, Clone)]
pub struct DealRequest {
    pub items: Vec<String>,
    pub location: String,
    /// Passed to the price provider as its per-section result limit.
    pub max_results: u32,
}

impl DealRequest {
    pub fn new<I, S>(items: I, location: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            location: location.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] for an empty item list, a blank
    /// item name, a blank location, or a zero result limit.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.items.is_empty() {
            return Err(EngineError::InvalidRequest(
                "at least one item is required".to_string(),
            ));
        }
        if let Some(pos) = self.items.iter().position(|i| i.trim().is_empty()) {
            return Err(EngineError::InvalidRequest(format!(
                "item #{} has a blank name",
                pos + 1
            )));
        }
        if self.location.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "location must be non-empty".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(EngineError::InvalidRequest(
                "max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Prices items, stacks discounts, and picks the best deal per item.
///
/// The engine never mutates the [`ShoppingContext`] it is handed.
pub struct SavingsEngine {
    prices: Box<dyn PriceSource>,
    gateway: DiscountGateway,
    catalog: Arc<SavingsCatalog>,
    max_concurrent_offers: usize,
}

impl SavingsEngine {
    /// `max_concurrent_offers` bounds how many offers of one item have their
    /// discount lookups in flight at once; zero is treated as one.
    #[must_use]
    pub fn new(
        prices: Box<dyn PriceSource>,
        gateway: DiscountGateway,
        catalog: Arc<SavingsCatalog>,
        max_concurrent_offers: usize,
    ) -> Self {
        Self {
            prices,
            gateway,
            catalog,
            max_concurrent_offers: max_concurrent_offers.max(1),
        }
    }

    /// Analyzes every requested item in request order.
    ///
    /// Each item name is first resolved against the context's wishlist and
    /// grocery list; the report is keyed by the resolved name, and a name that
    /// resolves to one already analyzed is searched only once. An item with no
    /// priced offers gets an empty [`BestDealResult`].
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidRequest`] before any I/O if the request is
    ///   malformed.
    /// - [`EngineError::ConfigurationMissing`] if the price provider has no
    ///   credential.
    /// - [`EngineError::PriceSearch`] if the price provider fails for an item.
    ///   Discount source failures never surface here.
    pub async fn analyze_shopping_list(
        &self,
        request: &DealRequest,
        context: &ShoppingContext,
    ) -> Result<ShoppingListReport, EngineError> {
        request.validate()?;
        self.gateway.prefetch_feeds();

        let mut report = ShoppingListReport::new();
        for requested in &request.items {
            let item = context.resolve_item_name(requested.trim());
            if report.contains(item) {
                tracing::debug!(item, requested = %requested, "item already analyzed, skipping");
                continue;
            }
            let result = self
                .best_deal_for_item(item, &request.location, request.max_results, context)
                .await?;
            report.push(item, result);
        }

        tracing::info!(
            items = report.len(),
            location = %request.location,
            "shopping list analyzed"
        );
        Ok(report)
    }

    /// Searches, normalizes, stacks, and selects for a single item.
    ///
    /// # Errors
    ///
    /// Same as [`SavingsEngine::analyze_shopping_list`], minus request
    /// validation.
    pub async fn best_deal_for_item(
        &self,
        item: &str,
        location: &str,
        limit: u32,
        context: &ShoppingContext,
    ) -> Result<BestDealResult, EngineError> {
        let records = self
            .prices
            .search(item, location, limit)
            .await
            .map_err(|e| match e {
                SourceError::MissingCredential(var) => {
                    EngineError::ConfigurationMissing(var.to_string())
                }
                source => EngineError::PriceSearch {
                    item: item.to_string(),
                    source,
                },
            })?;

        let offers = normalize_offers(records);
        tracing::debug!(item, offers = offers.len(), "offers normalized");

        let analyzed: Vec<AnalyzedOffer> = stream::iter(offers)
            .map(|offer| self.analyze_offer(offer, context))
            .buffered(self.max_concurrent_offers)
            .collect()
            .await;

        let result = select_best(analyzed);
        match &result.best_deal {
            Some(best) => tracing::info!(
                item,
                offers = result.all_deals.len(),
                store = %best.offer.store,
                price = %best.final_effective_price,
                "best deal selected"
            ),
            None => tracing::info!(item, "no priced offers found"),
        }
        Ok(result)
    }

    async fn analyze_offer(&self, offer: Offer, context: &ShoppingContext) -> AnalyzedOffer {
        let perks = match_perks(&offer.store, &context.credit_cards, &self.catalog);
        let discounts = self.gateway.lookup(&offer.store).await;

        let mut analyzed = analyze(offer, discounts.gift_card.as_ref(), &perks);
        analyzed.feed_deals = discounts.feed_deals;
        analyzed
    }

    /// Perks and gift-card deal available at `store` for the user's cards.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if `store` is blank.
    pub async fn store_savings(
        &self,
        store: &str,
        context: &ShoppingContext,
    ) -> Result<StoreSavings, EngineError> {
        let store = store.trim();
        if store.is_empty() {
            return Err(EngineError::InvalidRequest(
                "store must be non-empty".to_string(),
            ));
        }

        let credit_card_perks = match_perks(store, &context.credit_cards, &self.catalog);
        let discounts = self.gateway.lookup(store).await;

        Ok(StoreSavings {
            store: store.to_string(),
            category: self
                .catalog
                .category_for(&normalize_store_name(store))
                .map(str::to_string),
            best_perk: best_perk_value(&credit_card_perks),
            credit_card_perks,
            gift_card_deal: discounts.gift_card,
            user_cards: context.credit_cards.clone(),
        })
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
