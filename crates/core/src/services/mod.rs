//! Report builders that compose the aggregation, scoring, recommendation and
//! narrative modules over a [`Snapshot`](crate::domain::snapshot::Snapshot).
//!
//! Each builder is a pure function of the snapshot and thresholds.

mod executive;
mod management;
mod recommendation;

pub use executive::{ExecutiveBrief, ExecutiveBriefService};
pub use management::{ManagementIntelligenceService, ManagementReport, WatchedDeal};
pub use recommendation::{DealRecommendations, ProductRecommendationService};
