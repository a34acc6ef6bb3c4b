pub mod config;
pub mod domain;
pub mod errors;
pub mod metrics;
pub mod narrative;
pub mod recommendations;
pub mod scoring;
pub mod services;

#[cfg(test)]
mod fixtures;

pub use config::{AnalyticsThresholds, AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::deal::{Deal, DealId};
pub use domain::product::ProductGroup;
pub use domain::snapshot::Snapshot;
pub use domain::stage::{Locale, Stage, StageBucket};
pub use domain::user::{User, UserId};
pub use errors::{ApplicationError, DomainError, SnapshotError};
pub use metrics::{Dimension, GroupedMetric, MetricAggregator, SortMetric, StageTotals};
pub use narrative::{KeyEchoTranslator, NarrativeFormatter, NarrativeMessage, Translate};
pub use recommendations::{ConfidenceLevel, Recommendation, RecommendationEngine};
pub use scoring::{LeaderboardEntry, ScoreCalculator};
pub use services::{
    DealRecommendations, ExecutiveBrief, ExecutiveBriefService, ManagementIntelligenceService,
    ManagementReport, ProductRecommendationService,
};
