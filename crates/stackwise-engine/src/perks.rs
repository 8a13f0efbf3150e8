//! Credit-card perk matching against the catalog.

use rust_decimal::Decimal;
use stackwise_core::{
    normalize_store_name, CreditCard, Perk, PerkScope, PerkTerms, SavingsCatalog,
};

/// Perks from the user's cards that apply at `store`, in card order and then
/// perk order.
///
/// A store-scoped perk applies when its store equals `store` after
/// normalization. A category-scoped perk applies when the store maps to that
/// category. Stores without a category only ever match store-scoped perks, and
/// a blank store matches nothing. Unknown cards are skipped.
#[must_use]
pub fn match_perks(store: &str, cards: &[CreditCard], catalog: &SavingsCatalog) -> Vec<Perk> {
    let normalized = normalize_store_name(store);
    if normalized.is_empty() {
        return Vec::new();
    }
    let category = catalog.category_for(&normalized);

    let mut matched = Vec::new();
    for card in cards {
        let Some(terms) = catalog.perks_for_card(&card.name) else {
            tracing::debug!(card = %card.name, "card not in perk catalog, skipping");
            continue;
        };
        matched.extend(
            terms
                .iter()
                .filter(|t| applies(t, &normalized, category))
                .map(|t| Perk::from_terms(&card.name, t)),
        );
    }
    matched
}

fn applies(terms: &PerkTerms, normalized_store: &str, category: Option<&str>) -> bool {
    match &terms.scope {
        PerkScope::Store(name) => normalize_store_name(name) == normalized_store,
        PerkScope::Category(wanted) => category.is_some_and(|c| c.eq_ignore_ascii_case(wanted)),
    }
}

/// The highest-valued perk; the first one reaching the maximum wins.
#[must_use]
pub fn best_perk(perks: &[Perk]) -> Option<&Perk> {
    perks.iter().fold(None, |best: Option<&Perk>, perk| match best {
        Some(b) if b.value >= perk.value => Some(b),
        _ => Some(perk),
    })
}

/// Value of [`best_perk`], or zero when nothing matched.
#[must_use]
pub fn best_perk_value(perks: &[Perk]) -> Decimal {
    best_perk(perks).map_or(Decimal::ZERO, |p| p.value)
}
