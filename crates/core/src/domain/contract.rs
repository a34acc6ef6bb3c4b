use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductGroup;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCadence {
    Monthly,
    Quarterly,
    #[default]
    Annual,
    OneTime,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub due_date: DateTime<Utc>,
    pub amount: Decimal,
    #[serde(default)]
    pub paid: bool,
}

impl Installment {
    pub fn is_overdue(&self, as_of: DateTime<Utc>) -> bool {
        !self.paid && self.due_date < as_of
    }
}

/// Post-sale agreement. Read-only input to contract aggregations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub customer: String,
    pub product: ProductGroup,
    pub value: Decimal,
    #[serde(default)]
    pub billing: BillingCadence,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub renewal_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub risk: RiskLevel,
    #[serde(default)]
    pub installments: Vec<Installment>,
}

impl Contract {
    /// True when the renewal date falls in `[as_of, as_of + window_days]`.
    pub fn renews_within(&self, as_of: DateTime<Utc>, window_days: i64) -> bool {
        self.renewal_date
            .map(|renewal| {
                let days = (renewal - as_of).num_days();
                renewal >= as_of && days <= window_days
            })
            .unwrap_or(false)
    }
}
