use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::product::ProductGroup;
use crate::domain::stage::{Stage, StageBucket};
use crate::domain::user::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealId(pub String);

impl std::fmt::Display for DealId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_currency() -> String {
    "TRY".to_string()
}

fn default_source() -> String {
    "direct".to_string()
}

/// A tracked sales opportunity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub customer: String,
    pub product: ProductGroup,
    pub value: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub stage: Stage,
    #[serde(default, deserialize_with = "deserialize_percentage")]
    pub probability: u8,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default = "default_source")]
    pub source: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub stage_entered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expected_close: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_percentage")]
    pub health_score: Option<u8>,
}

impl Deal {
    pub fn bucket(&self) -> StageBucket {
        self.stage.bucket()
    }

    pub fn is_open(&self) -> bool {
        self.stage.is_open()
    }

    /// `value × probability / 100`
    pub fn weighted_value(&self) -> Decimal {
        let share = Decimal::from(self.probability.min(100)) / Decimal::ONE_HUNDRED;
        self.value.saturating_mul(share)
    }

    /// Whole days spent in the current stage, never negative.
    pub fn aging_days(&self, as_of: DateTime<Utc>) -> i64 {
        let entered = self.stage_entered_at.unwrap_or(self.created_at);
        (as_of - entered).num_days().max(0)
    }

    /// Whole days since the last logged activity (creation when none was logged).
    pub fn days_since_activity(&self, as_of: DateTime<Utc>) -> i64 {
        let last = self.last_activity_at.unwrap_or(self.created_at);
        (as_of - last).num_days().max(0)
    }

    /// Value moved per day since creation. Closed deals stop the clock at close.
    pub fn velocity(&self, as_of: DateTime<Utc>) -> Decimal {
        let end = match self.bucket() {
            StageBucket::Open => as_of,
            _ => self.closed_at.unwrap_or(as_of),
        };
        let days = (end - self.created_at).num_days().max(1);
        self.value / Decimal::from(days)
    }
}

fn clamp_percentage(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_percentage(raw))
}

fn deserialize_optional_percentage<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(clamp_percentage))
}
