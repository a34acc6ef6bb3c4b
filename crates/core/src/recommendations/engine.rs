//! Recommendation Engine implementation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::types::*;
use crate::config::AnalyticsThresholds;
use crate::domain::deal::Deal;
use crate::domain::product::ProductGroup;
use crate::narrative::NarrativeMessage;

/// Directed product affinities used by the cross-sell rule.
const AFFINITIES: &[(ProductGroup, &[ProductGroup])] = &[
    (ProductGroup::EnRoute, &[ProductGroup::Quest, ProductGroup::Stokbar]),
    (ProductGroup::Quest, &[ProductGroup::EnRoute]),
    (ProductGroup::Stokbar, &[ProductGroup::EnRoute, ProductGroup::Hosting]),
    (ProductGroup::ServiceCore, &[ProductGroup::Quest]),
    (ProductGroup::Varuna, &[ProductGroup::ServiceCore]),
    (ProductGroup::Hosting, &[ProductGroup::ServiceCore]),
    (ProductGroup::Unidox, &[ProductGroup::Varuna]),
];

/// Products the given product cross-sells into. Empty for unknown products.
pub fn affinities(product: &ProductGroup) -> &'static [ProductGroup] {
    AFFINITIES
        .iter()
        .find(|(source, _)| source == product)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Rule-based recommendation engine
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    benchmark_value_above: Decimal,
    reactivation_aging_days: i64,
    max_recommendations: usize,
}

impl RecommendationEngine {
    pub fn new(thresholds: &AnalyticsThresholds) -> Self {
        Self {
            benchmark_value_above: thresholds.benchmark_value_above,
            reactivation_aging_days: thresholds.reactivation_aging_days,
            max_recommendations: thresholds.max_recommendations,
        }
    }

    /// Recommendations for `deal`, highest confidence first.
    ///
    /// Each rule is evaluated independently and emits its record whenever its own
    /// condition holds, so one product may appear under two kinds. Within a tier
    /// the rule order is preserved.
    pub fn recommend(&self, deal: &Deal, as_of: DateTime<Utc>) -> Vec<Recommendation> {
        let mut candidates = Vec::new();

        for target in affinities(&deal.product) {
            candidates.push(self.build(deal, target.clone(), RecommendationKind::CrossSell, None));
        }

        if deal.value > self.benchmark_value_above {
            let kind = RecommendationKind::Benchmark;
            candidates.push(self.build(deal, ProductGroup::Varuna, kind, None));
        }

        candidates.push(self.build(deal, ProductGroup::Hosting, RecommendationKind::Upsell, None));

        let aging = deal.aging_days(as_of);
        if aging > self.reactivation_aging_days {
            candidates.push(self.build(
                deal,
                ProductGroup::ServiceCore,
                RecommendationKind::Reactivation,
                Some(aging),
            ));
        }

        // sort_by is stable, so equal tiers keep rule order
        candidates.sort_by(|a, b| b.confidence.tier().cmp(&a.confidence.tier()));
        candidates.truncate(self.max_recommendations);
        candidates
    }

    fn build(
        &self,
        deal: &Deal,
        product: ProductGroup,
        kind: RecommendationKind,
        aging_days: Option<i64>,
    ) -> Recommendation {
        let confidence = match kind {
            RecommendationKind::CrossSell | RecommendationKind::Upsell => ConfidenceLevel::High,
            RecommendationKind::Benchmark => ConfidenceLevel::Medium,
            RecommendationKind::Reactivation => ConfidenceLevel::Low,
        };

        let summary = NarrativeMessage::new(format!("{}.summary", kind.key()))
            .with_param("product", &product)
            .with_param("source_product", &deal.product);
        let mut detail = NarrativeMessage::new(format!("{}.detail", kind.key()))
            .with_param("product", &product)
            .with_param("source_product", &deal.product)
            .with_param("customer", &deal.customer)
            .with_param("value", deal.value.round_dp(0));
        if let Some(days) = aging_days {
            detail = detail.with_param("aging_days", days);
        }

        Recommendation { product, kind, confidence, impact: kind.impact(), summary, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::{affinities, RecommendationEngine};
    use crate::config::AnalyticsThresholds;
    use crate::domain::deal::Deal;
    use crate::domain::product::ProductGroup;
    use crate::fixtures::{as_of, deal};
    use crate::recommendations::{ConfidenceLevel, RecommendationKind};

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(&AnalyticsThresholds::default())
    }

    fn products(deal: &Deal) -> Vec<(ProductGroup, ConfidenceLevel)> {
        engine()
            .recommend(deal, as_of())
            .into_iter()
            .map(|recommendation| (recommendation.product, recommendation.confidence))
            .collect()
    }

    #[test]
    fn enroute_large_deal_gets_cross_sell_upsell_and_benchmark() {
        let deal = deal("1").product(ProductGroup::EnRoute).value(2_000_000).aging(10).build();

        assert_eq!(
            products(&deal),
            vec![
                (ProductGroup::Quest, ConfidenceLevel::High),
                (ProductGroup::Stokbar, ConfidenceLevel::High),
                (ProductGroup::Hosting, ConfidenceLevel::High),
                (ProductGroup::Varuna, ConfidenceLevel::Medium),
            ]
        );
    }

    #[test]
    fn benchmark_needs_value_strictly_above_threshold() {
        let at_threshold = deal("1").value(1_000_000).build();
        let below = deal("2").value(800_000).build();

        for deal in [at_threshold, below] {
            let kinds: Vec<_> =
                engine().recommend(&deal, as_of()).into_iter().map(|rec| rec.kind).collect();
            assert!(!kinds.contains(&RecommendationKind::Benchmark));
        }
    }

    #[test]
    fn aging_deal_gets_low_confidence_reactivation_last() {
        let deal = deal("1").product(ProductGroup::Quest).aging(61).build();
        let recommendations = engine().recommend(&deal, as_of());

        let last = recommendations.last().map(|rec| (rec.kind, rec.confidence));
        assert_eq!(last, Some((RecommendationKind::Reactivation, ConfidenceLevel::Low)));
        assert_eq!(
            recommendations.last().and_then(|rec| rec.detail.params.get("aging_days").cloned()),
            Some("61".to_string())
        );

        let fresh = deal_with_aging(60);
        assert!(engine()
            .recommend(&fresh, as_of())
            .iter()
            .all(|rec| rec.kind != RecommendationKind::Reactivation));
    }

    fn deal_with_aging(days: i64) -> Deal {
        deal("fresh").product(ProductGroup::Quest).aging(days).build()
    }

    fn kinds(deal: &Deal) -> Vec<(RecommendationKind, ProductGroup)> {
        engine()
            .recommend(deal, as_of())
            .into_iter()
            .map(|recommendation| (recommendation.kind, recommendation.product))
            .collect()
    }

    #[test]
    fn cross_sell_fires_for_every_affinity() {
        for (product, targets) in [
            (ProductGroup::Stokbar, vec![ProductGroup::EnRoute, ProductGroup::Hosting]),
            (ProductGroup::Varuna, vec![ProductGroup::ServiceCore]),
            (ProductGroup::Hosting, vec![ProductGroup::ServiceCore]),
        ] {
            let found: Vec<ProductGroup> = kinds(&deal("1").product(product).build())
                .into_iter()
                .filter(|(kind, _)| *kind == RecommendationKind::CrossSell)
                .map(|(_, product)| product)
                .collect();
            assert_eq!(found, targets);
        }
    }

    #[test]
    fn upsell_fires_for_every_product_but_hosting() {
        // Stokbar already cross-sells into Hosting; the upsell is still emitted
        let stokbar = kinds(&deal("1").product(ProductGroup::Stokbar).build());
        assert_eq!(
            stokbar,
            vec![
                (RecommendationKind::CrossSell, ProductGroup::EnRoute),
                (RecommendationKind::CrossSell, ProductGroup::Hosting),
                (RecommendationKind::Upsell, ProductGroup::Hosting),
            ]
        );

        let hosting = kinds(&deal("2").product(ProductGroup::Hosting).build());
        assert!(hosting.iter().all(|(kind, _)| *kind != RecommendationKind::Upsell));
    }

    #[test]
    fn benchmark_fires_above_threshold_except_for_varuna() {
        let quest = kinds(&deal("1").product(ProductGroup::Quest).value(1_500_000).build());
        assert!(quest.contains(&(RecommendationKind::Benchmark, ProductGroup::Varuna)));

        let varuna = kinds(&deal("2").product(ProductGroup::Varuna).value(5_000_000).build());
        assert!(varuna.iter().all(|(kind, _)| *kind != RecommendationKind::Benchmark));
    }

    #[test]
    fn reactivation_fires_on_aging_alone() {
        let service_core = kinds(&deal("1").product(ProductGroup::ServiceCore).aging(90).build());
        assert_eq!(
            service_core,
            vec![
                (RecommendationKind::CrossSell, ProductGroup::Quest),
                (RecommendationKind::Upsell, ProductGroup::Hosting),
                (RecommendationKind::Reactivation, ProductGroup::ServiceCore),
            ]
        );

        // Varuna cross-sells into ServiceCore and reactivation adds it again at Low
        let varuna = products(&deal("2").product(ProductGroup::Varuna).aging(90).build());
        let service_core: Vec<_> = varuna
            .into_iter()
            .filter(|(product, _)| *product == ProductGroup::ServiceCore)
            .collect();
        assert_eq!(
            service_core,
            vec![
                (ProductGroup::ServiceCore, ConfidenceLevel::High),
                (ProductGroup::ServiceCore, ConfidenceLevel::Low),
            ]
        );
    }

    #[test]
    fn list_is_bounded_and_sorted_by_tier() {
        let thresholds = AnalyticsThresholds::default();
        let all = [
            ProductGroup::EnRoute,
            ProductGroup::Quest,
            ProductGroup::Stokbar,
            ProductGroup::ServiceCore,
            ProductGroup::Varuna,
            ProductGroup::Hosting,
            ProductGroup::Unidox,
            ProductGroup::Other("Legacy".to_string()),
        ];
        for product in all {
            let deal = deal("x").product(product).value(9_000_000).aging(400).build();
            let recommendations = engine().recommend(&deal, as_of());

            assert!(recommendations.len() <= thresholds.max_recommendations);
            assert!(recommendations
                .windows(2)
                .all(|pair| pair[0].confidence.tier() >= pair[1].confidence.tier()));
        }
    }

    #[test]
    fn truncates_to_configured_maximum() {
        let thresholds = AnalyticsThresholds { max_recommendations: 2, ..Default::default() };
        let deal = deal("1").value(2_000_000).aging(90).build();

        assert_eq!(RecommendationEngine::new(&thresholds).recommend(&deal, as_of()).len(), 2);
    }

    #[test]
    fn unknown_products_have_no_affinities() {
        assert!(affinities(&ProductGroup::Other("Pilot".to_string())).is_empty());
        assert_eq!(affinities(&ProductGroup::Quest), &[ProductGroup::EnRoute]);
    }

    #[test]
    fn messages_are_keys_with_params() {
        let deal = deal("1").product(ProductGroup::Unidox).customer("Globex").build();
        let recommendations = engine().recommend(&deal, as_of());
        let first = &recommendations[0];

        assert_eq!(first.product, ProductGroup::Varuna);
        assert_eq!(first.summary.key, "recommendation.cross_sell.summary");
        assert_eq!(first.detail.params.get("customer").map(String::as_str), Some("Globex"));
        assert_eq!(first.detail.params.get("source_product").map(String::as_str), Some("Unidox"));
    }
}
