use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsThresholds;
use crate::domain::deal::{Deal, DealId};
use crate::domain::product::ProductGroup;
use crate::domain::snapshot::Snapshot;
use crate::errors::DomainError;
use crate::recommendations::{Recommendation, RecommendationEngine};

/// Recommendations for one deal, with enough context to render them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DealRecommendations {
    pub deal_id: DealId,
    pub title: String,
    pub customer: String,
    pub product: ProductGroup,
    pub value: Decimal,
    pub recommendations: Vec<Recommendation>,
}

pub struct ProductRecommendationService;

impl ProductRecommendationService {
    pub fn for_deal(
        deal: &Deal,
        as_of: DateTime<Utc>,
        thresholds: &AnalyticsThresholds,
    ) -> DealRecommendations {
        let engine = RecommendationEngine::new(thresholds);
        describe(deal, engine.recommend(deal, as_of))
    }

    pub fn for_deal_id(
        snapshot: &Snapshot,
        id: &DealId,
        thresholds: &AnalyticsThresholds,
    ) -> Result<DealRecommendations, DomainError> {
        let deal = snapshot.deal(id).ok_or_else(|| DomainError::DealNotFound(id.clone()))?;
        Ok(Self::for_deal(deal, snapshot.as_of, thresholds))
    }

    /// Every open deal in the snapshot, ordered by deal id.
    pub fn for_pipeline(
        snapshot: &Snapshot,
        thresholds: &AnalyticsThresholds,
    ) -> Vec<DealRecommendations> {
        let engine = RecommendationEngine::new(thresholds);
        let mut rows: Vec<DealRecommendations> = snapshot
            .deals
            .iter()
            .filter(|deal| deal.is_open())
            .map(|deal| describe(deal, engine.recommend(deal, snapshot.as_of)))
            .collect();
        rows.sort_by(|a, b| a.deal_id.cmp(&b.deal_id));
        rows
    }
}

fn describe(deal: &Deal, recommendations: Vec<Recommendation>) -> DealRecommendations {
    DealRecommendations {
        deal_id: deal.id.clone(),
        title: deal.title.clone(),
        customer: deal.customer.clone(),
        product: deal.product.clone(),
        value: deal.value,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::ProductRecommendationService;
    use crate::config::AnalyticsThresholds;
    use crate::domain::deal::DealId;
    use crate::domain::product::ProductGroup;
    use crate::domain::snapshot::Snapshot;
    use crate::domain::stage::Stage;
    use crate::errors::DomainError;
    use crate::fixtures::{as_of, deal};

    fn snapshot() -> Snapshot {
        Snapshot::new(as_of()).with_deals(vec![
            deal("d-2").product(ProductGroup::Quest).build(),
            deal("d-1").product(ProductGroup::EnRoute).value(2_000_000).aging(10).build(),
            deal("d-3").stage(Stage::Won).build(),
        ])
    }

    #[test]
    fn looks_up_a_deal_by_id() {
        let thresholds = AnalyticsThresholds::default();
        let id = DealId("d-1".into());
        let found = ProductRecommendationService::for_deal_id(&snapshot(), &id, &thresholds)
            .expect("deal exists");

        assert_eq!(found.product, ProductGroup::EnRoute);
        assert_eq!(found.recommendations.len(), 4);
    }

    #[test]
    fn unknown_deal_id_is_reported() {
        let missing = DealId("nope".into());
        let result = ProductRecommendationService::for_deal_id(
            &snapshot(),
            &missing,
            &AnalyticsThresholds::default(),
        );

        assert_eq!(result, Err(DomainError::DealNotFound(missing)));
    }

    #[test]
    fn pipeline_covers_open_deals_in_id_order() {
        let thresholds = AnalyticsThresholds::default();
        let rows = ProductRecommendationService::for_pipeline(&snapshot(), &thresholds);

        let ids: Vec<&str> = rows.iter().map(|row| row.deal_id.0.as_str()).collect();
        assert_eq!(ids, vec!["d-1", "d-2"]);
    }
}
