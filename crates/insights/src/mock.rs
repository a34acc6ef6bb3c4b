use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use dealscope_core::config::{AnalyticsThresholds, InsightsConfig};
use dealscope_core::domain::deal::Deal;
use dealscope_core::narrative::NarrativeMessage;
use dealscope_core::recommendations::Recommendation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::provider::{
    deal_risks, email_for, next_steps, DealAnalysis, EmailDraft, GrowthInsight, GrowthRequest,
    InsightProvider,
};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

/// Growth estimates are drawn from this range, in percent.
const GROWTH_RANGE: std::ops::Range<f64> = -5.0..25.0;
/// Maximum drift applied to a deal's stated probability.
const LIKELIHOOD_JITTER: i16 = 10;

/// Stand-in for a remote model: waits, then answers with seeded random figures.
pub struct MockInsightProvider {
    delay: Duration,
    rng: Mutex<StdRng>,
    thresholds: AnalyticsThresholds,
}

impl Default for MockInsightProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY, None)
    }
}

impl MockInsightProvider {
    pub fn new(delay: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { delay, rng: Mutex::new(rng), thresholds: AnalyticsThresholds::default() }
    }

    /// Risk thresholds applied when analyzing deals.
    pub fn with_thresholds(mut self, thresholds: AnalyticsThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn from_config(config: &InsightsConfig) -> Self {
        Self::new(Duration::from_millis(config.simulated_delay_ms), config.seed)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    async fn simulate_latency(&self, operation: &'static str, request_id: &str) {
        debug!(
            event_name = "insights.mock.waiting",
            operation,
            request_id,
            delay_ms = self.delay.as_millis() as u64,
            "simulating insight provider latency"
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl InsightProvider for MockInsightProvider {
    async fn growth(&self, request: &GrowthRequest) -> Result<GrowthInsight> {
        let request_id = request_id();
        self.simulate_latency("growth", &request_id).await;

        let raw = self.rng.lock().await.gen_range(GROWTH_RANGE);
        let growth_percent = (raw * 10.0).round() / 10.0;
        info!(
            event_name = "insights.mock.growth",
            request_id = %request_id,
            period = %request.period,
            growth_percent,
            "growth insight generated"
        );

        Ok(GrowthInsight {
            headline: NarrativeMessage::new("insight.growth.headline")
                .with_param("period", &request.period)
                .with_param("growth", format!("{growth_percent:.1}"))
                .with_param("deal_count", request.deal_count),
            request_id,
            growth_percent,
        })
    }

    async fn analyze_deal(
        &self,
        deal: &Deal,
        recommendations: &[Recommendation],
    ) -> Result<DealAnalysis> {
        let request_id = request_id();
        self.simulate_latency("analyze_deal", &request_id).await;

        let drift = self.rng.lock().await.gen_range(-LIKELIHOOD_JITTER..=LIKELIHOOD_JITTER);
        let win_likelihood = (i16::from(deal.probability) + drift).clamp(0, 100) as u8;
        info!(
            event_name = "insights.mock.analysis",
            request_id = %request_id,
            deal_id = %deal.id,
            win_likelihood,
            recommendation_count = recommendations.len(),
            "deal analysis generated"
        );

        Ok(DealAnalysis {
            deal_id: deal.id.clone(),
            win_likelihood,
            summary: NarrativeMessage::new("insight.analysis.summary")
                .with_param("customer", &deal.customer)
                .with_param("product", &deal.product)
                .with_param("likelihood", win_likelihood),
            risks: deal_risks(deal, &self.thresholds),
            next_steps: next_steps(recommendations),
            request_id,
        })
    }

    async fn draft_email(&self, deal: &Deal) -> Result<EmailDraft> {
        let request_id = request_id();
        self.simulate_latency("draft_email", &request_id).await;
        info!(
            event_name = "insights.mock.email",
            request_id = %request_id,
            deal_id = %deal.id,
            "follow-up email drafted"
        );

        Ok(email_for(request_id, deal))
    }
}
