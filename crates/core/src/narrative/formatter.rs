use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::NarrativeMessage;
use crate::config::AnalyticsThresholds;
use crate::domain::deal::Deal;
use crate::domain::product::ProductGroup;
use crate::metrics::{stage_totals, StageTotals};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeStatus {
    High,
    Stable,
}

impl VolumeStatus {
    pub fn key(&self) -> &'static str {
        match self {
            Self::High => "narrative.status.high",
            Self::Stable => "narrative.status.stable",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionTrend {
    Increasing,
    Stable,
    Decreasing,
}

impl ConversionTrend {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Increasing => "narrative.trend.increasing",
            Self::Stable => "narrative.trend.stable",
            Self::Decreasing => "narrative.trend.decreasing",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossStatus {
    NeedsAttention,
    UnderControl,
}

impl LossStatus {
    pub fn key(&self) -> &'static str {
        match self {
            Self::NeedsAttention => "narrative.loss.needs_attention",
            Self::UnderControl => "narrative.loss.under_control",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStrength {
    Strong,
    Stable,
    Weak,
}

impl PipelineStrength {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Strong => "narrative.pipeline.strong",
            Self::Stable => "narrative.pipeline.stable",
            Self::Weak => "narrative.pipeline.weak",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSummary {
    pub status: VolumeStatus,
    pub trend: ConversionTrend,
    pub loss_status: LossStatus,
    pub pipeline_strength: PipelineStrength,
    pub top_product: Option<ProductGroup>,
    pub deal_count: usize,
    pub conversion_rate: f64,
    pub lost_count: usize,
    pub open_value: Decimal,
    pub top_product_count: usize,
}

#[derive(Clone, Debug)]
pub struct NarrativeFormatter {
    thresholds: AnalyticsThresholds,
}

impl NarrativeFormatter {
    pub fn new(thresholds: &AnalyticsThresholds) -> Self {
        Self { thresholds: thresholds.clone() }
    }

    pub fn summarize(&self, deals: &[Deal]) -> NarrativeSummary {
        self.summarize_totals(&stage_totals(deals), deals)
    }

    /// Same as [`Self::summarize`] but reuses totals the caller already holds.
    pub fn summarize_totals(&self, totals: &StageTotals, deals: &[Deal]) -> NarrativeSummary {
        let thresholds = &self.thresholds;
        let conversion_rate = totals.conversion_rate();
        let (top_product, top_product_count) = match top_product(deals) {
            Some((product, count)) => (Some(product), count),
            None => (None, 0),
        };

        let status = if totals.total.count > thresholds.status_high_deal_count {
            VolumeStatus::High
        } else {
            VolumeStatus::Stable
        };

        let trend = if conversion_rate > thresholds.trend_increasing_conversion {
            ConversionTrend::Increasing
        } else if conversion_rate > thresholds.trend_stable_conversion {
            ConversionTrend::Stable
        } else {
            ConversionTrend::Decreasing
        };

        let loss_status = if totals.lost.count > thresholds.loss_attention_count {
            LossStatus::NeedsAttention
        } else {
            LossStatus::UnderControl
        };

        let pipeline_strength = if totals.open.value > thresholds.pipeline_strong_value {
            PipelineStrength::Strong
        } else if totals.open.value > thresholds.pipeline_stable_value {
            PipelineStrength::Stable
        } else {
            PipelineStrength::Weak
        };

        NarrativeSummary {
            status,
            trend,
            loss_status,
            pipeline_strength,
            top_product,
            deal_count: totals.total.count,
            conversion_rate,
            lost_count: totals.lost.count,
            open_value: totals.open.value,
            top_product_count,
        }
    }

    /// One message per classification, in reading order.
    pub fn messages(&self, summary: &NarrativeSummary) -> Vec<NarrativeMessage> {
        let top_product = match &summary.top_product {
            Some(product) => NarrativeMessage::new("narrative.top_product")
                .with_param("product", product)
                .with_param("count", summary.top_product_count),
            None => NarrativeMessage::new("narrative.top_product.none"),
        };

        vec![
            NarrativeMessage::new(summary.status.key())
                .with_param("deal_count", summary.deal_count),
            NarrativeMessage::new(summary.trend.key())
                .with_param("conversion_rate", format!("{:.1}", summary.conversion_rate)),
            NarrativeMessage::new(summary.loss_status.key())
                .with_param("lost_count", summary.lost_count),
            NarrativeMessage::new(summary.pipeline_strength.key())
                .with_param("open_value", summary.open_value.round_dp(0)),
            top_product,
        ]
    }
}

/// Most frequent product; ties go to the alphabetically first name.
fn top_product(deals: &[Deal]) -> Option<(ProductGroup, usize)> {
    let mut counts: BTreeMap<&str, (&ProductGroup, usize)> = BTreeMap::new();
    for deal in deals {
        counts.entry(deal.product.name()).or_insert((&deal.product, 0)).1 += 1;
    }

    // BTreeMap iterates names ascending, so keeping only strictly larger counts
    // leaves the first name among equals.
    let mut best: Option<(&ProductGroup, usize)> = None;
    for (product, count) in counts.into_values() {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((product, count));
        }
    }
    best.map(|(product, count)| (product.clone(), count))
}
