//! Insight providers
//!
//! Growth estimates, deal analysis and follow-up e-mail drafts come from an
//! [`InsightProvider`]. The analytics core never calls a provider; callers
//! combine its deterministic reports with whatever a provider returns.
//!
//! Two providers ship here:
//! - [`MockInsightProvider`] simulates a remote model with a fixed delay and
//!   seeded pseudo-random figures.
//! - [`StaticInsightProvider`] answers immediately with fixed values.

pub mod fixed;
pub mod mock;
pub mod provider;

pub use fixed::StaticInsightProvider;
pub use mock::MockInsightProvider;
pub use provider::{DealAnalysis, EmailDraft, GrowthInsight, GrowthRequest, InsightProvider};
