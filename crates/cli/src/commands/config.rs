use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dealscope_core::config::AppConfig;
use dealscope_core::errors::ApplicationError;
use serde::Serialize;
use toml::Value;

use crate::commands::{CommandResult, ConfigArgs};

const COMMAND: &str = "config";

#[derive(Debug, Serialize)]
pub struct ConfigField {
    pub key: String,
    pub value: String,
    pub source: String,
}

pub fn run(args: &ConfigArgs, json: bool) -> CommandResult {
    let config = match AppConfig::load(args.load_options()) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error(COMMAND, &ApplicationError::from(error)),
    };

    let config_file_path = detect_config_path(args.config.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let mut fields =
        effective_fields(&config, config_file_doc.as_ref(), config_file_path.as_deref());
    if args.locale.is_some() {
        if let Some(locale) = fields.iter_mut().find(|field| field.key == "report.locale") {
            locale.source = "flag (--locale)".to_string();
        }
    }

    if json {
        let message = "effective config (source precedence: flag > env > file > default)";
        return CommandResult::success_with_data(COMMAND, message, Some(&fields));
    }

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];
    lines.extend(fields.iter().map(render_line));
    CommandResult::text(lines.join("\n"))
}

fn effective_fields(
    config: &AppConfig,
    doc: Option<&Value>,
    path: Option<&Path>,
) -> Vec<ConfigField> {
    let analytics = &config.analytics;
    let field = |key: &str, value: String, env_keys: &[&str]| ConfigField {
        key: key.to_string(),
        value,
        source: field_source(key, env_keys, doc, path),
    };

    vec![
        field(
            "analytics.top_group_limit",
            analytics.top_group_limit.to_string(),
            &["DEALSCOPE_TOP_GROUP_LIMIT"],
        ),
        field(
            "analytics.leaderboard_limit",
            analytics.leaderboard_limit.to_string(),
            &["DEALSCOPE_LEADERBOARD_LIMIT"],
        ),
        field(
            "analytics.revenue_target",
            analytics.revenue_target.to_string(),
            &["DEALSCOPE_REVENUE_TARGET"],
        ),
        field("analytics.weight_revenue", analytics.weight_revenue.to_string(), &[]),
        field("analytics.weight_win_rate", analytics.weight_win_rate.to_string(), &[]),
        field("analytics.weight_activity", analytics.weight_activity.to_string(), &[]),
        field("analytics.benchmark_value_above", analytics.benchmark_value_above.to_string(), &[]),
        field(
            "analytics.reactivation_aging_days",
            analytics.reactivation_aging_days.to_string(),
            &[],
        ),
        field("analytics.max_recommendations", analytics.max_recommendations.to_string(), &[]),
        field(
            "analytics.risk_probability_below",
            analytics.risk_probability_below.to_string(),
            &[],
        ),
        field("analytics.stale_activity_days", analytics.stale_activity_days.to_string(), &[]),
        field(
            "insights.simulated_delay_ms",
            config.insights.simulated_delay_ms.to_string(),
            &["DEALSCOPE_INSIGHTS_DELAY_MS"],
        ),
        field(
            "insights.seed",
            config.insights.seed.map_or_else(|| "<unset>".to_string(), |seed| seed.to_string()),
            &["DEALSCOPE_INSIGHTS_SEED"],
        ),
        field("report.locale", config.report.locale.code().to_string(), &["DEALSCOPE_LOCALE"]),
        field(
            "logging.level",
            config.logging.level.clone(),
            &["DEALSCOPE_LOGGING_LEVEL", "DEALSCOPE_LOG_LEVEL"],
        ),
        field(
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["DEALSCOPE_LOGGING_FORMAT", "DEALSCOPE_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("dealscope.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/dealscope.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(field: &ConfigField) -> String {
    format!("- {} = {} (source: {})", field.key, field.value, field.source)
}
