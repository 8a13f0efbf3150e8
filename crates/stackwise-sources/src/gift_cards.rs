//! Gift-card deals served from the savings catalog.

use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use stackwise_core::{GiftCardDeal, SavingsCatalog};

use crate::error::SourceError;
use crate::source::GiftCardSource;

/// Looks up gift-card markdowns in the catalog's gift-card table.
#[derive(Debug, Clone)]
pub struct CatalogGiftCards {
    catalog: Arc<SavingsCatalog>,
}

impl CatalogGiftCards {
    #[must_use]
    pub fn new(catalog: Arc<SavingsCatalog>) -> Self {
        Self { catalog }
    }
}

impl GiftCardSource for CatalogGiftCards {
    fn name(&self) -> &'static str {
        "gift_card_table"
    }

    fn gift_card_deal<'a>(
        &'a self,
        store: &'a str,
    ) -> BoxFuture<'a, Result<Option<GiftCardDeal>, SourceError>> {
        future::ready(Ok(self.catalog.gift_card_for(store).cloned())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stackwise_core::CatalogFile;

    fn source() -> CatalogGiftCards {
        let mut file = CatalogFile::default();
        file.gift_cards.insert(
            "Starbucks".to_string(),
            GiftCardDeal {
                discount: Decimal::new(7, 2),
                provider: "Reloadly".to_string(),
            },
        );
        CatalogGiftCards::new(Arc::new(SavingsCatalog::from_file(file).unwrap()))
    }

    #[tokio::test]
    async fn finds_deal_case_insensitively() {
        let deal = source().gift_card_deal("STARBUCKS").await.unwrap().unwrap();
        assert_eq!(deal.discount, Decimal::new(7, 2));
        assert_eq!(deal.provider, "Reloadly");
    }

    #[tokio::test]
    async fn unknown_store_has_no_deal() {
        assert!(source().gift_card_deal("QFC").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_store_has_no_deal() {
        assert!(source().gift_card_deal("").await.unwrap().is_none());
    }
}
