use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsThresholds;
use crate::domain::deal::Deal;
use crate::domain::stage::StageBucket;

const WEIGHT_PROBABILITY: f64 = 0.5;
const WEIGHT_RECENCY: f64 = 0.3;
const WEIGHT_FRESHNESS: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    AtRisk,
    Normal,
    Healthy,
}

impl HealthStatus {
    pub fn key(&self) -> &'static str {
        match self {
            Self::AtRisk => "health.at_risk",
            Self::Normal => "health.normal",
            Self::Healthy => "health.healthy",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub score: u8,
    pub status: HealthStatus,
    /// False when the score came from the deal record rather than being computed.
    pub computed: bool,
}

/// `< at_risk_below` is at risk, `> healthy_above` is healthy, anything else normal.
pub fn classify_health(score: u8, thresholds: &AnalyticsThresholds) -> HealthStatus {
    if score < thresholds.health_at_risk_below {
        HealthStatus::AtRisk
    } else if score > thresholds.health_healthy_above {
        HealthStatus::Healthy
    } else {
        HealthStatus::Normal
    }
}

/// Health of a deal as of `as_of`.
///
/// A score carried on the record wins. Otherwise won deals are 100, lost deals
/// 0, and open deals blend win probability, activity recency and time in stage.
pub fn deal_health(
    deal: &Deal,
    as_of: DateTime<Utc>,
    thresholds: &AnalyticsThresholds,
) -> HealthAssessment {
    let (score, computed) = match deal.health_score {
        Some(stored) => (stored.min(100), false),
        None => (computed_score(deal, as_of, thresholds), true),
    };

    HealthAssessment { score, status: classify_health(score, thresholds), computed }
}

fn computed_score(deal: &Deal, as_of: DateTime<Utc>, thresholds: &AnalyticsThresholds) -> u8 {
    match deal.bucket() {
        StageBucket::Won => return 100,
        StageBucket::Lost => return 0,
        StageBucket::Open => {}
    }

    // Recency reaches zero after twice the stale window without activity.
    let silent_days = deal.days_since_activity(as_of) as f64;
    let recency_window = (thresholds.stale_activity_days.max(1) * 2) as f64;
    let recency = (100.0 - silent_days / recency_window * 100.0).clamp(0.0, 100.0);

    let aging = deal.aging_days(as_of) as f64;
    let aging_window = thresholds.reactivation_aging_days.max(1) as f64;
    let freshness = (100.0 - aging / aging_window * 100.0).clamp(0.0, 100.0);

    let blended = f64::from(deal.probability.min(100)) * WEIGHT_PROBABILITY
        + recency * WEIGHT_RECENCY
        + freshness * WEIGHT_FRESHNESS;

    blended.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::{classify_health, deal_health, HealthStatus};
    use crate::config::AnalyticsThresholds;
    use crate::domain::stage::Stage;
    use crate::fixtures::{as_of, deal};

    #[test]
    fn classification_thresholds_are_strict() {
        let thresholds = AnalyticsThresholds::default();
        assert_eq!(classify_health(49, &thresholds), HealthStatus::AtRisk);
        assert_eq!(classify_health(50, &thresholds), HealthStatus::Normal);
        assert_eq!(classify_health(80, &thresholds), HealthStatus::Normal);
        assert_eq!(classify_health(81, &thresholds), HealthStatus::Healthy);
    }

    #[test]
    fn stored_score_wins_over_computation() {
        let thresholds = AnalyticsThresholds::default();
        let deal = deal("1").health(92).probability(5).build();
        let health = deal_health(&deal, as_of(), &thresholds);

        assert_eq!(health.score, 92);
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(!health.computed);
    }

    #[test]
    fn terminal_stages_pin_the_score() {
        let thresholds = AnalyticsThresholds::default();
        let won = deal_health(&deal("1").stage(Stage::Won).build(), as_of(), &thresholds);
        let lost = deal_health(&deal("2").stage(Stage::Lost).build(), as_of(), &thresholds);

        assert_eq!(won.score, 100);
        assert_eq!(lost.score, 0);
        assert_eq!(lost.status, HealthStatus::AtRisk);
    }

    #[test]
    fn open_deal_blends_probability_recency_and_freshness() {
        let thresholds = AnalyticsThresholds::default();
        // probability 80 -> 40, activity 0 days ago -> 30, aging 30 of 60 -> 10
        let active = deal("1").probability(80).aging(30).last_activity_days_ago(0).build();
        assert_eq!(deal_health(&active, as_of(), &thresholds).score, 80);

        // probability 20 -> 10, silent 60 days -> 0, aging 90 -> 0
        let stalled = deal("2").probability(20).aging(90).last_activity_days_ago(60).build();
        let health = deal_health(&stalled, as_of(), &thresholds);
        assert_eq!(health.score, 10);
        assert_eq!(health.status, HealthStatus::AtRisk);
        assert!(health.computed);
    }
}
