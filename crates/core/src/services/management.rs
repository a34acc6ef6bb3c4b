use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsThresholds;
use crate::domain::deal::{Deal, DealId};
use crate::domain::product::ProductGroup;
use crate::domain::snapshot::Snapshot;
use crate::scoring::{
    build_leaderboard, deal_health, team_totals, HealthAssessment, HealthStatus,
    LeaderboardEntry, TeamTotals,
};

/// An open deal flagged for a manager's attention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchedDeal {
    pub deal_id: DealId,
    pub title: String,
    pub customer: String,
    pub product: ProductGroup,
    pub owner_name: String,
    pub value: Decimal,
    pub health: HealthAssessment,
    pub days_since_activity: i64,
    pub aging_days: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManagementReport {
    pub as_of: DateTime<Utc>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub team: TeamTotals,
    /// Open deals classified at risk, largest first.
    pub at_risk: Vec<WatchedDeal>,
    /// Open deals without activity for the stale window, longest silence first.
    pub stale: Vec<WatchedDeal>,
}

pub struct ManagementIntelligenceService;

impl ManagementIntelligenceService {
    pub fn build(snapshot: &Snapshot, thresholds: &AnalyticsThresholds) -> ManagementReport {
        let watched: Vec<WatchedDeal> = snapshot
            .deals
            .iter()
            .filter(|deal| deal.is_open())
            .map(|deal| watch(snapshot, deal, thresholds))
            .collect();

        let mut at_risk: Vec<WatchedDeal> = watched
            .iter()
            .filter(|deal| deal.health.status == HealthStatus::AtRisk)
            .cloned()
            .collect();
        at_risk.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.deal_id.cmp(&b.deal_id)));

        let mut stale: Vec<WatchedDeal> = watched
            .into_iter()
            .filter(|deal| deal.days_since_activity >= thresholds.stale_activity_days)
            .collect();
        stale.sort_by(|a, b| {
            b.days_since_activity
                .cmp(&a.days_since_activity)
                .then_with(|| a.deal_id.cmp(&b.deal_id))
        });

        ManagementReport {
            as_of: snapshot.as_of,
            leaderboard: build_leaderboard(snapshot, thresholds),
            team: team_totals(&snapshot.deals),
            at_risk,
            stale,
        }
    }
}

fn watch(snapshot: &Snapshot, deal: &Deal, thresholds: &AnalyticsThresholds) -> WatchedDeal {
    WatchedDeal {
        deal_id: deal.id.clone(),
        title: deal.title.clone(),
        customer: deal.customer.clone(),
        product: deal.product.clone(),
        owner_name: snapshot.user_name(deal.owner_id.as_ref()),
        value: deal.value,
        health: deal_health(deal, snapshot.as_of, thresholds),
        days_since_activity: deal.days_since_activity(snapshot.as_of),
        aging_days: deal.aging_days(snapshot.as_of),
    }
}
