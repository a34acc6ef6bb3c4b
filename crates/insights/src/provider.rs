use anyhow::Result;
use async_trait::async_trait;
use dealscope_core::config::AnalyticsThresholds;
use dealscope_core::domain::deal::{Deal, DealId};
use dealscope_core::narrative::NarrativeMessage;
use dealscope_core::recommendations::Recommendation;
use dealscope_core::scoring::{classify_health, HealthStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Figures a growth estimate is based on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowthRequest {
    /// Free-form period name, echoed back in the headline.
    pub period: String,
    pub won_revenue: Decimal,
    pub deal_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowthInsight {
    pub request_id: String,
    /// Estimated period-over-period growth, in percent.
    pub growth_percent: f64,
    pub headline: NarrativeMessage,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DealAnalysis {
    pub request_id: String,
    pub deal_id: DealId,
    /// Estimated chance of closing, in percent.
    pub win_likelihood: u8,
    pub summary: NarrativeMessage,
    pub risks: Vec<NarrativeMessage>,
    pub next_steps: Vec<NarrativeMessage>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub request_id: String,
    pub deal_id: DealId,
    pub subject: NarrativeMessage,
    pub body: NarrativeMessage,
}

/// Source of non-deterministic commentary on top of the analytics reports.
///
/// Each call is a single awaitable unit: it either returns a complete result
/// or an error, never a partial one.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn growth(&self, request: &GrowthRequest) -> Result<GrowthInsight>;

    async fn analyze_deal(
        &self,
        deal: &Deal,
        recommendations: &[Recommendation],
    ) -> Result<DealAnalysis>;

    async fn draft_email(&self, deal: &Deal) -> Result<EmailDraft>;
}

/// Risk messages that follow from the deal record alone.
pub(crate) fn deal_risks(deal: &Deal, thresholds: &AnalyticsThresholds) -> Vec<NarrativeMessage> {
    let mut risks = Vec::new();
    if deal.probability < thresholds.risk_probability_below {
        risks.push(
            NarrativeMessage::new("insight.risk.low_probability")
                .with_param("probability", deal.probability),
        );
    }
    if deal.owner_id.is_none() {
        risks.push(NarrativeMessage::new("insight.risk.unassigned"));
    }
    let at_risk = |score: &u8| classify_health(*score, thresholds) == HealthStatus::AtRisk;
    if let Some(health) = deal.health_score.filter(at_risk) {
        risks.push(NarrativeMessage::new("insight.risk.low_health").with_param("health", health));
    }
    risks
}

pub(crate) fn next_steps(recommendations: &[Recommendation]) -> Vec<NarrativeMessage> {
    recommendations
        .iter()
        .map(|recommendation| {
            NarrativeMessage::new("insight.next_step")
                .with_param("product", &recommendation.product)
                .with_param("kind", recommendation.kind.key())
        })
        .collect()
}

pub(crate) fn email_for(request_id: String, deal: &Deal) -> EmailDraft {
    EmailDraft {
        request_id,
        deal_id: deal.id.clone(),
        subject: NarrativeMessage::new("insight.email.subject")
            .with_param("product", &deal.product)
            .with_param("customer", &deal.customer),
        body: NarrativeMessage::new("insight.email.body")
            .with_param("customer", &deal.customer)
            .with_param("product", &deal.product)
            .with_param("title", &deal.title),
    }
}
