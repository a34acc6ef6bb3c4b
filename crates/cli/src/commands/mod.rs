pub mod brief;
pub mod config;
pub mod insight;
pub mod leaderboard;
pub mod recommend;

use std::path::PathBuf;

use clap::Args;
use dealscope_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use dealscope_core::domain::snapshot::Snapshot;
use dealscope_core::domain::stage::Locale;
use dealscope_core::errors::ApplicationError;
use serde::Serialize;

use crate::render::TemplateCatalog;

/// Flags that shape how configuration is loaded.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    #[arg(long, help = "Path to a dealscope.toml file (must exist when given)")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Report locale: en or tr")]
    pub locale: Option<Locale>,
}

impl ConfigArgs {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            require_file: self.config.is_some(),
            config_path: self.config.clone(),
            overrides: ConfigOverrides { locale: self.locale, ..ConfigOverrides::default() },
        }
    }
}

/// Flags shared by every report command.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[arg(long, help = "Path to the CRM snapshot JSON file")]
    pub snapshot: PathBuf,
    #[arg(long, help = "Emit machine-readable JSON output")]
    pub json: bool,
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ReportArgs {
    pub fn new(snapshot: impl Into<PathBuf>) -> Self {
        Self { snapshot: snapshot.into(), json: false, config: ConfigArgs::default() }
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// Configuration and snapshot a report command runs against.
pub struct ReportContext {
    pub config: AppConfig,
    pub snapshot: Snapshot,
    pub catalog: TemplateCatalog,
}

pub fn load_context(args: &ReportArgs) -> Result<ReportContext, ApplicationError> {
    let config = AppConfig::load(args.config.load_options())?;
    let snapshot = Snapshot::load(&args.snapshot)?;
    let catalog = TemplateCatalog::new(config.report.locale)
        .map_err(|error| ApplicationError::Configuration(error.to_string()))?;

    tracing::debug!(
        event_name = "cli.context.loaded",
        snapshot = %args.snapshot.display(),
        deal_count = snapshot.deals.len(),
        locale = config.report.locale.code(),
        "report context loaded"
    );

    Ok(ReportContext { config, snapshot, catalog })
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<T: Serialize> {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl CommandResult {
    pub fn success_with_data<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        data: Option<T>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(&payload) }
    }

    /// Human-readable output; the exit code is still zero.
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome::<()> {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        tracing::warn!(
            event_name = "cli.command.failed",
            command,
            error_class = error.error_class(),
            error = %error,
            "command failed"
        );
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }
}

fn serialize_payload<T: Serialize>(payload: &CommandOutcome<T>) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
