use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsThresholds;
use crate::domain::snapshot::Snapshot;
use crate::metrics::{
    contract_summary, pipeline_funnel, stage_totals, ContractSummary, Dimension, FunnelReport,
    GroupedMetric, MetricAggregator, SortMetric, StageTotals,
};
use crate::narrative::{NarrativeFormatter, NarrativeMessage, NarrativeSummary};

/// Company-wide pipeline overview.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveBrief {
    pub as_of: DateTime<Utc>,
    pub totals: StageTotals,
    pub conversion_rate: f64,
    pub win_rate: f64,
    pub average_deal_value: Decimal,
    pub weighted_pipeline: Decimal,
    pub top_products: Vec<GroupedMetric>,
    pub top_sources: Vec<GroupedMetric>,
    pub top_customers: Vec<GroupedMetric>,
    pub stages: Vec<GroupedMetric>,
    pub funnel: FunnelReport,
    pub contracts: ContractSummary,
    pub narrative: NarrativeSummary,
    pub messages: Vec<NarrativeMessage>,
}

pub struct ExecutiveBriefService;

impl ExecutiveBriefService {
    pub fn build(snapshot: &Snapshot, thresholds: &AnalyticsThresholds) -> ExecutiveBrief {
        let deals = &snapshot.deals;
        let totals = stage_totals(deals);
        let aggregator = MetricAggregator::new(thresholds.top_group_limit);
        let formatter = NarrativeFormatter::new(thresholds);
        let narrative = formatter.summarize_totals(&totals, deals);
        let messages = formatter.messages(&narrative);
        let group = |dimension, metric| aggregator.group(deals, &snapshot.users, dimension, metric);

        ExecutiveBrief {
            as_of: snapshot.as_of,
            conversion_rate: totals.conversion_rate(),
            win_rate: totals.win_rate(),
            average_deal_value: totals.average_deal_value(),
            weighted_pipeline: totals.open_weighted_value,
            top_products: group(Dimension::Product, SortMetric::Value),
            top_sources: group(Dimension::Source, SortMetric::Count),
            top_customers: group(Dimension::Customer, SortMetric::Value),
            stages: group(Dimension::Stage, SortMetric::Count),
            funnel: pipeline_funnel(deals),
            contracts: contract_summary(
                &snapshot.contracts,
                snapshot.as_of,
                thresholds.renewal_window_days,
            ),
            totals,
            narrative,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::ExecutiveBriefService;
    use crate::config::AnalyticsThresholds;
    use crate::domain::product::ProductGroup;
    use crate::domain::snapshot::Snapshot;
    use crate::domain::stage::Stage;
    use crate::fixtures::{as_of, deal};
    use crate::narrative::{ConversionTrend, PipelineStrength};

    #[test]
    fn empty_snapshot_produces_a_zeroed_brief() {
        let snapshot = Snapshot::new(as_of());
        let brief = ExecutiveBriefService::build(&snapshot, &AnalyticsThresholds::default());

        assert_eq!(brief.totals.total.count, 0);
        assert_eq!(brief.conversion_rate, 0.0);
        assert_eq!(brief.average_deal_value, Decimal::ZERO);
        assert!(brief.top_products.is_empty());
        assert!(brief.top_customers.is_empty());
        assert_eq!(brief.narrative.top_product, None);
        assert_eq!(brief.narrative.pipeline_strength, PipelineStrength::Weak);
        assert_eq!(brief.messages.len(), 5);
    }

    #[test]
    fn brief_combines_totals_breakdowns_and_narrative() {
        let snapshot = Snapshot::new(as_of()).with_deals(vec![
            deal("1").product(ProductGroup::Quest).stage(Stage::Won).value(400_000).build(),
            deal("2").product(ProductGroup::Quest).stage(Stage::Lost).value(100_000).build(),
            deal("3")
                .product(ProductGroup::Varuna)
                .stage(Stage::Proposal)
                .value(1_000_000)
                .probability(40)
                .build(),
        ]);
        let brief = ExecutiveBriefService::build(&snapshot, &AnalyticsThresholds::default());

        assert_eq!(brief.totals.total.count, 3);
        assert_eq!(brief.conversion_rate, 50.0);
        assert_eq!(brief.narrative.trend, ConversionTrend::Increasing);
        assert_eq!(brief.weighted_pipeline, Decimal::from(400_000));
        assert_eq!(brief.average_deal_value, Decimal::from(500_000));
        assert_eq!(brief.top_products[0].label, "Varuna");
        assert_eq!(brief.narrative.top_product, Some(ProductGroup::Quest));
    }
}
