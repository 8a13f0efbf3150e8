//! Gift card first, then the best credit-card perk on the reduced price.

use rust_decimal::Decimal;
use stackwise_core::{is_valid_rate, AnalyzedOffer, GiftCardDeal, Offer, Perk, SavingsBreakdown};

use crate::perks::best_perk;

const CENTS: u32 = 2;

/// Applies `gift_card` and the best of `perks` to `offer`.
///
/// Both prices are rounded to cents independently from the exact product, so
/// `final_effective_price` never inherits the rounding of
/// `price_after_gift_card`. Rates outside `[0, 1)` and zero rates count as no
/// discount.
#[must_use]
pub fn analyze(offer: Offer, gift_card: Option<&GiftCardDeal>, perks: &[Perk]) -> AnalyzedOffer {
    let gift_card = gift_card.filter(|d| is_valid_rate(d.discount) && d.discount > Decimal::ZERO);
    let perk = best_perk(perks).filter(|p| is_valid_rate(p.value) && p.value > Decimal::ZERO);

    let gift_rate = gift_card.map_or(Decimal::ZERO, |d| d.discount);
    let perk_rate = perk.map_or(Decimal::ZERO, |p| p.value);

    let after_gift = offer.base_price * (Decimal::ONE - gift_rate);
    let after_perk = after_gift * (Decimal::ONE - perk_rate);

    let breakdown = SavingsBreakdown {
        gift_card: gift_card
            .map(|d| format!("{}% off via {} gift card", percent(d.discount), d.provider)),
        credit_card: perk.map(|p| format!("{}% {} with {}", percent(p.value), p.kind, p.card)),
    };

    AnalyzedOffer {
        gift_card_discount: gift_rate,
        gift_card_provider: gift_card.map(|d| d.provider.clone()),
        price_after_gift_card: after_gift.round_dp(CENTS),
        credit_card_perk: perk_rate,
        perk_card: perk.map(|p| p.card.clone()),
        final_effective_price: after_perk.round_dp(CENTS),
        breakdown,
        feed_deals: Vec::new(),
        offer,
    }
}

fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}
