use anyhow::Result;
use async_trait::async_trait;
use dealscope_core::config::AnalyticsThresholds;
use dealscope_core::domain::deal::Deal;
use dealscope_core::narrative::NarrativeMessage;
use dealscope_core::recommendations::Recommendation;

use crate::provider::{
    deal_risks, email_for, next_steps, DealAnalysis, EmailDraft, GrowthInsight, GrowthRequest,
    InsightProvider,
};

const STATIC_REQUEST_ID: &str = "static";

/// Provider that answers immediately with the same figures every time.
#[derive(Clone, Debug)]
pub struct StaticInsightProvider {
    pub growth_percent: f64,
    pub thresholds: AnalyticsThresholds,
}

impl Default for StaticInsightProvider {
    fn default() -> Self {
        Self { growth_percent: 12.5, thresholds: AnalyticsThresholds::default() }
    }
}

#[async_trait]
impl InsightProvider for StaticInsightProvider {
    async fn growth(&self, request: &GrowthRequest) -> Result<GrowthInsight> {
        Ok(GrowthInsight {
            request_id: STATIC_REQUEST_ID.to_string(),
            growth_percent: self.growth_percent,
            headline: NarrativeMessage::new("insight.growth.headline")
                .with_param("period", &request.period)
                .with_param("growth", format!("{:.1}", self.growth_percent))
                .with_param("deal_count", request.deal_count),
        })
    }

    async fn analyze_deal(
        &self,
        deal: &Deal,
        recommendations: &[Recommendation],
    ) -> Result<DealAnalysis> {
        Ok(DealAnalysis {
            request_id: STATIC_REQUEST_ID.to_string(),
            deal_id: deal.id.clone(),
            win_likelihood: deal.probability.min(100),
            summary: NarrativeMessage::new("insight.analysis.summary")
                .with_param("customer", &deal.customer)
                .with_param("product", &deal.product)
                .with_param("likelihood", deal.probability.min(100)),
            risks: deal_risks(deal, &self.thresholds),
            next_steps: next_steps(recommendations),
        })
    }

    async fn draft_email(&self, deal: &Deal) -> Result<EmailDraft> {
        Ok(email_for(STATIC_REQUEST_ID.to_string(), deal))
    }
}
