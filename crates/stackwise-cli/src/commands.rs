//! Command handlers: wire configuration, catalog, profile, and sources into
//! a [`SavingsEngine`] and print its results as JSON on stdout.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use stackwise_core::{AppConfig, ShoppingContext};
use stackwise_engine::{DealRequest, DiscountGateway, SavingsEngine};
use stackwise_sources::{CatalogGiftCards, ClientOptions, CouponApiClient, ShoppingClient};

pub(crate) async fn run_analyze(
    config: &AppConfig,
    items: Vec<String>,
    location: String,
    max_results: u32,
    cards: Vec<String>,
) -> anyhow::Result<()> {
    let context = load_context(config, cards)?;
    let engine = build_engine(config)?;
    let request = DealRequest::new(items, location).with_max_results(max_results);

    let report = engine.analyze_shopping_list(&request, &context).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) async fn run_savings(
    config: &AppConfig,
    store: &str,
    cards: Vec<String>,
) -> anyhow::Result<()> {
    let context = load_context(config, cards)?;
    let engine = build_engine(config)?;

    let savings = engine.store_savings(store, &context).await?;
    println!("{}", serde_json::to_string_pretty(&savings)?);
    Ok(())
}

fn build_engine(config: &AppConfig) -> anyhow::Result<SavingsEngine> {
    let catalog = Arc::new(
        stackwise_core::load_catalog(&config.catalog_path)
            .with_context(|| format!("loading catalog {}", config.catalog_path.display()))?,
    );
    tracing::debug!(path = %config.catalog_path.display(), "savings catalog loaded");

    let options = ClientOptions::from_app_config(config);
    let prices = ShoppingClient::new(config.serpapi_api_key.clone(), &options)
        .context("failed to build shopping client")?
        .with_locale(&config.search_country, &config.search_language);
    let coupons = CouponApiClient::new(
        config.couponapi_api_key.clone(),
        config.coupon_lookback_days,
        &options,
    )
    .context("failed to build coupon feed client")?;

    let gateway = DiscountGateway::new(
        Box::new(CatalogGiftCards::new(Arc::clone(&catalog))),
        Duration::from_millis(config.source_timeout_ms),
    )
    .with_feed(Box::new(coupons));

    Ok(SavingsEngine::new(
        Box::new(prices),
        gateway,
        catalog,
        config.max_concurrent_offers,
    ))
}

/// Loads the profile when it exists. Cards given on the command line replace
/// the profile's cards.
fn load_context(config: &AppConfig, cards: Vec<String>) -> anyhow::Result<ShoppingContext> {
    let mut context = if config.profile_path.exists() {
        stackwise_core::load_profile(&config.profile_path)
            .with_context(|| format!("loading profile {}", config.profile_path.display()))?
    } else {
        tracing::warn!(
            path = %config.profile_path.display(),
            "profile not found, continuing without saved cards or lists"
        );
        ShoppingContext::default()
    };

    if !cards.is_empty() {
        context.credit_cards = ShoppingContext::with_cards(cards).credit_cards;
    }
    Ok(context)
}

