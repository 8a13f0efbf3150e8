//! Raw price-provider records → canonical [`Offer`]s.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use stackwise_core::Offer;
use stackwise_sources::RawOfferRecord;

static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<sign>-)?[$€£¥]?\s*(?P<amount>\d[\d,]*(?:\.\d+)?(?:[eE][+-]?\d+)?)")
        .expect("valid regex")
});

/// Normalizes records in encounter order. Records without a usable
/// non-negative price are dropped.
#[must_use]
pub fn normalize_offers(records: Vec<RawOfferRecord>) -> Vec<Offer> {
    records.into_iter().filter_map(normalize_offer).collect()
}

fn normalize_offer(record: RawOfferRecord) -> Option<Offer> {
    let base_price = record
        .extracted_price
        .as_ref()
        .and_then(price_from_value)
        .or_else(|| record.price.as_deref().and_then(parse_price_text));

    let Some(base_price) = base_price else {
        tracing::debug!(
            store = record.store.as_deref().unwrap_or_default(),
            title = record.title.as_deref().unwrap_or_default(),
            price = record.price.as_deref().unwrap_or_default(),
            "missing price data, dropping offer"
        );
        return None;
    };

    Some(Offer {
        store: record.store.unwrap_or_default(),
        title: record.title.unwrap_or_default(),
        listed_price: record.price,
        base_price,
        source_link: record.link,
        delivery_info: record.delivery,
        thumbnail: record.thumbnail,
        extensions: record.extensions,
    })
}

fn price_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_price_text(&n.to_string()),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

/// Parses the first amount in a display price such as `"$1,299.99"` or
/// `"USD 4.50"`.
///
/// Returns `None` when there is no amount, the amount is negative, or it does
/// not fit a `Decimal`.
#[must_use]
pub fn parse_price_text(text: &str) -> Option<Decimal> {
    let captures = PRICE_PATTERN.captures(text)?;
    if captures.name("sign").is_some() {
        return None;
    }
    let amount = captures.name("amount")?.as_str().replace(',', "");

    let parsed = if amount.contains(['e', 'E']) {
        Decimal::from_scientific(&amount).ok()?
    } else {
        Decimal::from_str(&amount).ok()?
    };

    (parsed >= Decimal::ZERO).then_some(parsed)
}
