//! Metric Aggregator
//!
//! Groups deals by a dimension and computes counts, sums and rates. Every
//! function here is total: empty input yields empty or zeroed output.

mod contracts;
mod funnel;

pub use contracts::{contract_summary, ContractSummary};
pub use funnel::{pipeline_funnel, FunnelReport, FunnelStage};

use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::deal::Deal;
use crate::domain::stage::StageBucket;
use crate::domain::user::{User, UNKNOWN_USER_NAME};

/// Key used for deals whose owner reference is missing.
pub const UNASSIGNED_OWNER_KEY: &str = "unassigned";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Stage,
    Product,
    Source,
    Owner,
    Customer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMetric {
    Count,
    Value,
}

/// One row of a grouped breakdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupedMetric {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub value: Decimal,
    pub weighted_value: Decimal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketTotal {
    pub count: usize,
    pub value: Decimal,
}

impl BucketTotal {
    fn add(&mut self, value: Decimal) {
        self.count += 1;
        self.value = self.value.saturating_add(value);
    }
}

/// Won / lost / open partition of a deal set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTotals {
    pub won: BucketTotal,
    pub lost: BucketTotal,
    pub open: BucketTotal,
    pub total: BucketTotal,
    pub open_weighted_value: Decimal,
}

impl StageTotals {
    /// Won share of closed deals, in percent. Zero when nothing has closed.
    pub fn conversion_rate(&self) -> f64 {
        percentage(self.won.count, self.won.count + self.lost.count)
    }

    /// Won share of every deal, in percent. Zero for an empty set.
    pub fn win_rate(&self) -> f64 {
        percentage(self.won.count, self.total.count)
    }

    pub fn average_deal_value(&self) -> Decimal {
        if self.total.count == 0 {
            return Decimal::ZERO;
        }
        self.total.value / Decimal::from(self.total.count)
    }
}

/// `part / whole × 100`, or zero when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

pub fn stage_totals(deals: &[Deal]) -> StageTotals {
    let mut totals = StageTotals::default();
    for deal in deals {
        totals.total.add(deal.value);
        match deal.bucket() {
            StageBucket::Won => totals.won.add(deal.value),
            StageBucket::Lost => totals.lost.add(deal.value),
            StageBucket::Open => {
                totals.open.add(deal.value);
                totals.open_weighted_value =
                    totals.open_weighted_value.saturating_add(deal.weighted_value());
            }
        }
    }
    totals
}

#[derive(Clone, Debug)]
pub struct MetricAggregator {
    limit: usize,
}

impl MetricAggregator {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Groups `deals` by `dimension`, sorted descending by `metric` and cut to the limit.
    ///
    /// Ties fall back to the other metric (descending), then to the label
    /// (ascending), so the output never depends on input order.
    pub fn group(
        &self,
        deals: &[Deal],
        users: &[User],
        dimension: Dimension,
        metric: SortMetric,
    ) -> Vec<GroupedMetric> {
        let mut groups: HashMap<String, GroupedMetric> = HashMap::new();

        for deal in deals {
            let (key, label) = group_key(deal, users, dimension);
            let entry = groups.entry(key.clone()).or_insert_with(|| GroupedMetric {
                key,
                label,
                count: 0,
                value: Decimal::ZERO,
                weighted_value: Decimal::ZERO,
            });
            entry.count += 1;
            entry.value = entry.value.saturating_add(deal.value);
            entry.weighted_value = entry.weighted_value.saturating_add(deal.weighted_value());
        }

        let mut rows: Vec<GroupedMetric> = groups.into_values().collect();
        rows.sort_by(|a, b| compare_rows(a, b, metric));
        rows.truncate(self.limit);
        rows
    }
}

fn compare_rows(a: &GroupedMetric, b: &GroupedMetric, metric: SortMetric) -> Ordering {
    let primary = match metric {
        SortMetric::Count => b.count.cmp(&a.count).then_with(|| b.value.cmp(&a.value)),
        SortMetric::Value => b.value.cmp(&a.value).then_with(|| b.count.cmp(&a.count)),
    };
    primary.then_with(|| a.label.cmp(&b.label)).then_with(|| a.key.cmp(&b.key))
}

fn group_key(deal: &Deal, users: &[User], dimension: Dimension) -> (String, String) {
    match dimension {
        Dimension::Stage => (deal.stage.as_str().to_string(), deal.stage.as_str().to_string()),
        Dimension::Product => (deal.product.name().to_string(), deal.product.name().to_string()),
        Dimension::Source => {
            let source = deal.source.trim();
            let source = if source.is_empty() { "direct" } else { source };
            (source.to_lowercase(), source.to_string())
        }
        Dimension::Customer => (deal.customer.trim().to_string(), deal.customer.trim().to_string()),
        Dimension::Owner => match &deal.owner_id {
            Some(owner) => {
                let name = users
                    .iter()
                    .find(|user| user.id == *owner)
                    .map(|user| user.name.clone())
                    .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string());
                (owner.0.clone(), name)
            }
            None => (UNASSIGNED_OWNER_KEY.to_string(), UNKNOWN_USER_NAME.to_string()),
        },
    }
}
