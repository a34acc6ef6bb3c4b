use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::contract::Contract;
use crate::domain::deal::{Deal, DealId};
use crate::domain::user::{User, UserId, UNKNOWN_USER_NAME};
use crate::errors::SnapshotError;

/// Read-only view of the CRM data every report is computed from.
///
/// Services take a snapshot explicitly and keep nothing between calls, so two
/// calls over the same snapshot always produce the same output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub as_of: DateTime<Utc>,
    #[serde(default)]
    pub deals: Vec<Deal>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub contracts: Vec<Contract>,
}

impl Snapshot {
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self { as_of, deals: Vec::new(), users: Vec::new(), contracts: Vec::new() }
    }

    pub fn with_deals(mut self, deals: Vec<Deal>) -> Self {
        self.deals = deals;
        self
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn with_contracts(mut self, contracts: Vec<Contract>) -> Self {
        self.contracts = contracts;
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(raw).map_err(|source| SnapshotError::Parse { source })
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| SnapshotError::ReadFile { path: path.to_path_buf(), source })?;
        serde_json::from_str(&raw)
            .map_err(|source| SnapshotError::ParseFile { path: path.to_path_buf(), source })
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    /// Display name for an owner reference; `"unknown"` when it cannot be resolved.
    pub fn user_name(&self, id: Option<&UserId>) -> String {
        id.and_then(|id| self.user(id))
            .map(|user| user.name.clone())
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string())
    }

    pub fn deal(&self, id: &DealId) -> Option<&Deal> {
        self.deals.iter().find(|deal| &deal.id == id)
    }
}
