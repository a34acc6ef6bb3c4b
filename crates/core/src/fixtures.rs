//! Deterministic builders shared by the unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::deal::{Deal, DealId};
use crate::domain::product::ProductGroup;
use crate::domain::stage::Stage;
use crate::domain::user::{Role, User, UserId};

pub(crate) fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().expect("valid fixture date")
}

pub(crate) fn user(id: &str, name: &str) -> User {
    User {
        id: UserId(id.to_string()),
        name: name.to_string(),
        role: Role::Representative,
        team: Some("field".to_string()),
    }
}

pub(crate) fn deal(id: &str) -> DealBuilder {
    let created = as_of() - Duration::days(20);
    DealBuilder(Deal {
        id: DealId(id.to_string()),
        title: format!("Deal {id}"),
        customer: "Acme".to_string(),
        product: ProductGroup::EnRoute,
        value: Decimal::from(100_000),
        currency: "TRY".to_string(),
        stage: Stage::Qualified,
        probability: 50,
        owner_id: None,
        source: "web".to_string(),
        created_at: created,
        stage_entered_at: Some(created),
        expected_close: None,
        closed_at: None,
        last_activity_at: Some(as_of() - Duration::days(2)),
        health_score: None,
    })
}

pub(crate) struct DealBuilder(Deal);

impl DealBuilder {
    pub(crate) fn product(mut self, product: ProductGroup) -> Self {
        self.0.product = product;
        self
    }

    pub(crate) fn value(mut self, value: i64) -> Self {
        self.0.value = Decimal::from(value);
        self
    }

    pub(crate) fn amount(mut self, value: Decimal) -> Self {
        self.0.value = value;
        self
    }

    pub(crate) fn stage(mut self, stage: Stage) -> Self {
        self.0.stage = stage;
        self
    }

    pub(crate) fn owner(mut self, owner: &str) -> Self {
        self.0.owner_id = Some(UserId(owner.to_string()));
        self
    }

    pub(crate) fn customer(mut self, customer: &str) -> Self {
        self.0.customer = customer.to_string();
        self
    }

    pub(crate) fn source(mut self, source: &str) -> Self {
        self.0.source = source.to_string();
        self
    }

    pub(crate) fn probability(mut self, probability: u8) -> Self {
        self.0.probability = probability;
        self
    }

    /// Days spent in the current stage as of the fixture date.
    pub(crate) fn aging(mut self, days: i64) -> Self {
        let entered = as_of() - Duration::days(days);
        self.0.stage_entered_at = Some(entered);
        if self.0.created_at > entered {
            self.0.created_at = entered;
        }
        self
    }

    pub(crate) fn closed_days_ago(mut self, days: i64) -> Self {
        let closed = as_of() - Duration::days(days);
        self.0.closed_at = Some(closed);
        if self.0.created_at > closed {
            self.0.created_at = closed;
        }
        self
    }

    pub(crate) fn last_activity_days_ago(mut self, days: i64) -> Self {
        self.0.last_activity_at = Some(as_of() - Duration::days(days));
        self
    }

    pub(crate) fn health(mut self, score: u8) -> Self {
        self.0.health_score = Some(score);
        self
    }

    pub(crate) fn build(self) -> Deal {
        self.0
    }
}
