use stackwise_core::{AnalyzedOffer, BestDealResult};

/// Picks the offer with the lowest `final_effective_price`. On a tie the
/// earliest offer wins. `all_deals` keeps the input order.
#[must_use]
pub fn select_best(all_deals: Vec<AnalyzedOffer>) -> BestDealResult {
    let mut best: Option<&AnalyzedOffer> = None;
    for candidate in &all_deals {
        if best.is_none_or(|b| candidate.final_effective_price < b.final_effective_price) {
            best = Some(candidate);
        }
    }
    let best_deal = best.cloned();

    BestDealResult {
        best_deal,
        all_deals,
    }
}
