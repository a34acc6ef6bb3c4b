use serde::{Deserialize, Serialize};

/// Name shown wherever a referenced user cannot be resolved.
pub const UNKNOWN_USER_NAME: &str = "unknown";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    #[serde(alias = "rep", alias = "sales_rep")]
    Representative,
    Manager,
    Executive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub team: Option<String>,
}
