use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::deal::DealId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("deal `{0}` was not found in the snapshot")]
    DealNotFound(DealId),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not read snapshot file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse snapshot file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("could not parse snapshot: {source}")]
    Parse { source: serde_json::Error },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("snapshot failure: {0}")]
    Snapshot(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("insight provider failure: {0}")]
    Insight(String),
}

impl From<SnapshotError> for ApplicationError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value.to_string())
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}

impl ApplicationError {
    /// Machine-readable class reported by operator tooling.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::DealNotFound(_)) => "not_found",
            Self::Snapshot(_) => "snapshot",
            Self::Configuration(_) => "config_validation",
            Self::Insight(_) => "insight_provider",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Snapshot(_) => 3,
            Self::Domain(DomainError::DealNotFound(_)) => 4,
            Self::Insight(_) => 1,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::DealNotFound(_)) => {
                "The requested deal does not exist in the loaded snapshot."
            }
            Self::Snapshot(_) => {
                "The snapshot file could not be loaded. Check the path and format."
            }
            Self::Configuration(_) => "The configuration is invalid. Run `dealscope config`.",
            Self::Insight(_) => "The insight provider is temporarily unavailable.",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::deal::DealId;
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn missing_deal_maps_to_not_found_class() {
        let error = ApplicationError::from(DomainError::DealNotFound(DealId("D-404".to_owned())));

        assert_eq!(error.error_class(), "not_found");
        assert_eq!(error.exit_code(), 4);
        assert!(error.to_string().contains("D-404"));
    }

    #[test]
    fn configuration_error_uses_config_exit_code() {
        let error = ApplicationError::Configuration("bad weights".to_owned());

        assert_eq!(error.error_class(), "config_validation");
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.user_message(), "The configuration is invalid. Run `dealscope config`.");
    }

    #[test]
    fn insight_failure_uses_generic_exit_code() {
        let error = ApplicationError::Insight("timed out".to_owned());

        assert_eq!(error.error_class(), "insight_provider");
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn snapshot_error_is_flattened_to_message() {
        let parse = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let error = ApplicationError::from(crate::errors::SnapshotError::Parse { source: parse });

        assert_eq!(error.error_class(), "snapshot");
        assert_eq!(error.exit_code(), 3);
    }
}
