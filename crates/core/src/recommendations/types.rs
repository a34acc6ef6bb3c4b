//! Types for the Recommendation Engine

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductGroup;
use crate::narrative::NarrativeMessage;

/// Rule that produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Product commonly bought alongside the deal's product
    CrossSell,
    /// Large deal worth comparing against the premium line
    Benchmark,
    /// Managed hosting on top of the licensed product
    Upsell,
    /// Long-running deal that needs a service touchpoint
    Reactivation,
}

impl RecommendationKind {
    /// Prefix of the message keys this kind renders with
    pub fn key(&self) -> &'static str {
        match self {
            RecommendationKind::CrossSell => "recommendation.cross_sell",
            RecommendationKind::Benchmark => "recommendation.benchmark",
            RecommendationKind::Upsell => "recommendation.upsell",
            RecommendationKind::Reactivation => "recommendation.reactivation",
        }
    }

    /// Expected business impact of acting on this kind of suggestion
    pub fn impact(&self) -> ImpactLevel {
        match self {
            RecommendationKind::CrossSell | RecommendationKind::Upsell => ImpactLevel::Medium,
            RecommendationKind::Benchmark | RecommendationKind::Reactivation => ImpactLevel::High,
        }
    }
}

/// Confidence level for a recommendation; only used for ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Ordinal tier: High=3, Medium=2, Low=1
    pub fn tier(&self) -> u8 {
        match self {
            ConfidenceLevel::High => 3,
            ConfidenceLevel::Medium => 2,
            ConfidenceLevel::Low => 1,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "confidence.high",
            ConfidenceLevel::Medium => "confidence.medium",
            ConfidenceLevel::Low => "confidence.low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn key(&self) -> &'static str {
        match self {
            ImpactLevel::High => "impact.high",
            ImpactLevel::Medium => "impact.medium",
            ImpactLevel::Low => "impact.low",
        }
    }
}

/// A product suggestion for one deal
///
/// Text is carried as message keys; a translator turns them into sentences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Suggested product
    pub product: ProductGroup,
    /// Rule that fired
    pub kind: RecommendationKind,
    pub confidence: ConfidenceLevel,
    pub impact: ImpactLevel,
    /// One-line justification
    pub summary: NarrativeMessage,
    /// Longer justification
    pub detail: NarrativeMessage,
}
