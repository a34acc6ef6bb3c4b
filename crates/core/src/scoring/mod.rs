//! Scoring Engine
//!
//! Composite representative scores, deal health classification and the
//! gamified leaderboard built on top of them.

mod health;
mod leaderboard;

pub use health::{classify_health, deal_health, HealthAssessment, HealthStatus};
pub use leaderboard::{
    build_leaderboard, team_totals, Badge, LeaderboardEntry, MonthlyPoint, TeamTotals,
    TREND_MONTHS,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsThresholds;
use crate::domain::deal::Deal;
use crate::domain::stage::StageBucket;
use crate::metrics::{percentage, to_f64};

/// Raw per-representative figures the composite score is derived from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RepPerformance {
    pub deal_count: usize,
    pub won_count: usize,
    pub lost_count: usize,
    /// Sum of won deal values.
    pub revenue: Decimal,
    /// Won deals over all deals, in percent. Zero without deals.
    pub win_rate: f64,
}

impl RepPerformance {
    pub fn from_deals<'a>(deals: impl IntoIterator<Item = &'a Deal>) -> Self {
        let mut performance = Self::default();
        for deal in deals {
            performance.deal_count += 1;
            match deal.bucket() {
                StageBucket::Won => {
                    performance.won_count += 1;
                    performance.revenue = performance.revenue.saturating_add(deal.value);
                }
                StageBucket::Lost => performance.lost_count += 1,
                StageBucket::Open => {}
            }
        }
        performance.win_rate = percentage(performance.won_count, performance.deal_count);
        performance
    }
}

/// Normalized sub-scores, each in `0.0..=100.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub revenue: f64,
    pub win_rate: f64,
    pub activity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub revenue: f64,
    pub win_rate: f64,
    pub activity: f64,
}

impl From<&AnalyticsThresholds> for ScoringWeights {
    fn from(thresholds: &AnalyticsThresholds) -> Self {
        Self {
            revenue: thresholds.weight_revenue,
            win_rate: thresholds.weight_win_rate,
            activity: thresholds.weight_activity,
        }
    }
}

/// Composite score calculator for sales representatives.
#[derive(Clone, Debug)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
    revenue_target: f64,
    win_rate_multiplier: f64,
    activity_target_wins: f64,
}

impl ScoreCalculator {
    pub fn new(thresholds: &AnalyticsThresholds) -> Self {
        Self {
            weights: ScoringWeights::from(thresholds),
            revenue_target: to_f64(thresholds.revenue_target),
            win_rate_multiplier: thresholds.win_rate_multiplier,
            activity_target_wins: f64::from(thresholds.activity_target_wins),
        }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn component_scores(&self, performance: &RepPerformance) -> ComponentScores {
        ComponentScores {
            revenue: clamp_score(ratio(to_f64(performance.revenue), self.revenue_target) * 100.0),
            win_rate: clamp_score(performance.win_rate * self.win_rate_multiplier),
            activity: clamp_score(
                ratio(performance.won_count as f64, self.activity_target_wins) * 100.0,
            ),
        }
    }

    /// Weighted blend of the clamped sub-scores; always in `0.0..=100.0`.
    pub fn composite(&self, components: &ComponentScores) -> f64 {
        let total = components.revenue * self.weights.revenue
            + components.win_rate * self.weights.win_rate
            + components.activity * self.weights.activity;

        clamp_score(total)
    }

    pub fn score(&self, performance: &RepPerformance) -> (ComponentScores, f64) {
        let components = self.component_scores(performance);
        (components, self.composite(&components))
    }
}

fn ratio(value: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    value / target
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}
