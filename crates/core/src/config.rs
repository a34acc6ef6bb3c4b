use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::stage::Locale;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub analytics: AnalyticsThresholds,
    pub insights: InsightsConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Every fixed number the reports classify, rank or truncate by.
///
/// Defaults reproduce the dashboard's historical constants; tests and operators
/// can vary them without touching the aggregation code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsThresholds {
    /// Maximum entries in any grouped breakdown.
    pub top_group_limit: usize,
    /// Maximum entries on the leaderboard.
    pub leaderboard_limit: usize,
    /// Won revenue that earns a full revenue sub-score.
    pub revenue_target: Decimal,
    /// Win rate percentage is multiplied by this before clamping.
    pub win_rate_multiplier: f64,
    /// Won deals that earn a full activity sub-score.
    pub activity_target_wins: u32,
    pub weight_revenue: f64,
    pub weight_win_rate: f64,
    pub weight_activity: f64,
    /// Health strictly below this is "at risk".
    pub health_at_risk_below: u8,
    /// Health strictly above this is "healthy".
    pub health_healthy_above: u8,
    /// Win probability strictly below this is flagged as a deal risk.
    pub risk_probability_below: u8,
    pub badge_win_rate_above: f64,
    pub badge_revenue_above: Decimal,
    pub badge_streak_above: u32,
    /// Deal value that triggers the Varuna benchmark suggestion.
    pub benchmark_value_above: Decimal,
    /// Days in stage that trigger the reactivation suggestion.
    pub reactivation_aging_days: i64,
    pub max_recommendations: usize,
    pub status_high_deal_count: usize,
    pub trend_increasing_conversion: f64,
    pub trend_stable_conversion: f64,
    pub loss_attention_count: usize,
    pub pipeline_strong_value: Decimal,
    pub pipeline_stable_value: Decimal,
    /// Open deals without activity for this many days are stale.
    pub stale_activity_days: i64,
    pub renewal_window_days: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsightsConfig {
    pub simulated_delay_ms: u64,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportConfig {
    pub locale: Locale,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub locale: Option<Locale>,
    pub insights_delay_ms: Option<u64>,
    pub insights_seed: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AnalyticsThresholds {
    fn default() -> Self {
        Self {
            top_group_limit: 8,
            leaderboard_limit: 10,
            revenue_target: Decimal::from(5_000_000),
            win_rate_multiplier: 1.5,
            activity_target_wins: 10,
            weight_revenue: 0.50,
            weight_win_rate: 0.30,
            weight_activity: 0.20,
            health_at_risk_below: 50,
            health_healthy_above: 80,
            risk_probability_below: 30,
            badge_win_rate_above: 40.0,
            badge_revenue_above: Decimal::from(3_000_000),
            badge_streak_above: 3,
            benchmark_value_above: Decimal::from(1_000_000),
            reactivation_aging_days: 60,
            max_recommendations: 5,
            status_high_deal_count: 400,
            trend_increasing_conversion: 25.0,
            trend_stable_conversion: 15.0,
            loss_attention_count: 50,
            pipeline_strong_value: Decimal::from(50_000_000),
            pipeline_stable_value: Decimal::from(20_000_000),
            stale_activity_days: 30,
            renewal_window_days: 90,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analytics: AnalyticsThresholds::default(),
            insights: InsightsConfig { simulated_delay_ms: 1_500, seed: None },
            report: ReportConfig { locale: Locale::En },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("dealscope.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(analytics) = patch.analytics {
            analytics.apply_to(&mut self.analytics);
        }

        if let Some(insights) = patch.insights {
            if let Some(simulated_delay_ms) = insights.simulated_delay_ms {
                self.insights.simulated_delay_ms = simulated_delay_ms;
            }
            if let Some(seed) = insights.seed {
                self.insights.seed = Some(seed);
            }
        }

        if let Some(report) = patch.report {
            if let Some(locale) = report.locale {
                self.report.locale = locale;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DEALSCOPE_TOP_GROUP_LIMIT") {
            self.analytics.top_group_limit = parse_usize("DEALSCOPE_TOP_GROUP_LIMIT", &value)?;
        }
        if let Some(value) = read_env("DEALSCOPE_LEADERBOARD_LIMIT") {
            self.analytics.leaderboard_limit =
                parse_usize("DEALSCOPE_LEADERBOARD_LIMIT", &value)?;
        }
        if let Some(value) = read_env("DEALSCOPE_REVENUE_TARGET") {
            self.analytics.revenue_target = parse_decimal("DEALSCOPE_REVENUE_TARGET", &value)?;
        }

        if let Some(value) = read_env("DEALSCOPE_INSIGHTS_DELAY_MS") {
            self.insights.simulated_delay_ms = parse_u64("DEALSCOPE_INSIGHTS_DELAY_MS", &value)?;
        }
        if let Some(value) = read_env("DEALSCOPE_INSIGHTS_SEED") {
            self.insights.seed = Some(parse_u64("DEALSCOPE_INSIGHTS_SEED", &value)?);
        }

        if let Some(value) = read_env("DEALSCOPE_LOCALE") {
            self.report.locale = value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "DEALSCOPE_LOCALE".to_string(),
                value: value.clone(),
            })?;
        }

        let log_level =
            read_env("DEALSCOPE_LOGGING_LEVEL").or_else(|| read_env("DEALSCOPE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("DEALSCOPE_LOGGING_FORMAT").or_else(|| read_env("DEALSCOPE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(locale) = overrides.locale {
            self.report.locale = locale;
        }
        if let Some(delay) = overrides.insights_delay_ms {
            self.insights.simulated_delay_ms = delay;
        }
        if let Some(seed) = overrides.insights_seed {
            self.insights.seed = Some(seed);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_analytics(&self.analytics)?;
        validate_insights(&self.insights)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("dealscope.toml"), PathBuf::from("config/dealscope.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_analytics(analytics: &AnalyticsThresholds) -> Result<(), ConfigError> {
    if analytics.top_group_limit == 0 || analytics.leaderboard_limit == 0 {
        return Err(ConfigError::Validation(
            "analytics.top_group_limit and analytics.leaderboard_limit must be greater than zero"
                .to_string(),
        ));
    }

    if analytics.max_recommendations == 0 {
        return Err(ConfigError::Validation(
            "analytics.max_recommendations must be greater than zero".to_string(),
        ));
    }

    if analytics.revenue_target <= Decimal::ZERO {
        return Err(ConfigError::Validation(
            "analytics.revenue_target must be greater than zero".to_string(),
        ));
    }

    if analytics.activity_target_wins == 0 {
        return Err(ConfigError::Validation(
            "analytics.activity_target_wins must be greater than zero".to_string(),
        ));
    }

    let weights = [analytics.weight_revenue, analytics.weight_win_rate, analytics.weight_activity];
    if weights.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
        return Err(ConfigError::Validation(
            "analytics weights must be finite and non-negative".to_string(),
        ));
    }
    let weight_sum: f64 = weights.iter().sum();
    if (weight_sum - 1.0).abs() > 1e-6 {
        return Err(ConfigError::Validation(format!(
            "analytics weights must sum to 1.0 (got {weight_sum:.4})"
        )));
    }

    if analytics.health_at_risk_below > analytics.health_healthy_above
        || analytics.health_healthy_above > 100
    {
        return Err(ConfigError::Validation(
            "analytics.health_at_risk_below must not exceed analytics.health_healthy_above (max 100)"
                .to_string(),
        ));
    }

    if analytics.risk_probability_below > 100 {
        return Err(ConfigError::Validation(
            "analytics.risk_probability_below must be in range 0..=100".to_string(),
        ));
    }

    if analytics.trend_stable_conversion > analytics.trend_increasing_conversion {
        return Err(ConfigError::Validation(
            "analytics.trend_stable_conversion must not exceed analytics.trend_increasing_conversion"
                .to_string(),
        ));
    }

    if analytics.pipeline_stable_value > analytics.pipeline_strong_value {
        return Err(ConfigError::Validation(
            "analytics.pipeline_stable_value must not exceed analytics.pipeline_strong_value"
                .to_string(),
        ));
    }

    if analytics.reactivation_aging_days <= 0
        || analytics.stale_activity_days <= 0
        || analytics.renewal_window_days <= 0
    {
        return Err(ConfigError::Validation(
            "analytics day windows must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_insights(insights: &InsightsConfig) -> Result<(), ConfigError> {
    if insights.simulated_delay_ms > 30_000 {
        return Err(ConfigError::Validation(
            "insights.simulated_delay_ms must be in range 0..=30000".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    analytics: Option<AnalyticsPatch>,
    insights: Option<InsightsPatch>,
    report: Option<ReportPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyticsPatch {
    top_group_limit: Option<usize>,
    leaderboard_limit: Option<usize>,
    revenue_target: Option<Decimal>,
    win_rate_multiplier: Option<f64>,
    activity_target_wins: Option<u32>,
    weight_revenue: Option<f64>,
    weight_win_rate: Option<f64>,
    weight_activity: Option<f64>,
    health_at_risk_below: Option<u8>,
    health_healthy_above: Option<u8>,
    risk_probability_below: Option<u8>,
    badge_win_rate_above: Option<f64>,
    badge_revenue_above: Option<Decimal>,
    badge_streak_above: Option<u32>,
    benchmark_value_above: Option<Decimal>,
    reactivation_aging_days: Option<i64>,
    max_recommendations: Option<usize>,
    status_high_deal_count: Option<usize>,
    trend_increasing_conversion: Option<f64>,
    trend_stable_conversion: Option<f64>,
    loss_attention_count: Option<usize>,
    pipeline_strong_value: Option<Decimal>,
    pipeline_stable_value: Option<Decimal>,
    stale_activity_days: Option<i64>,
    renewal_window_days: Option<i64>,
}

macro_rules! patch_fields {
    ($patch:expr, $target:expr, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )*
    };
}

impl AnalyticsPatch {
    fn apply_to(self, target: &mut AnalyticsThresholds) {
        patch_fields!(
            self,
            target,
            [
                top_group_limit,
                leaderboard_limit,
                revenue_target,
                win_rate_multiplier,
                activity_target_wins,
                weight_revenue,
                weight_win_rate,
                weight_activity,
                health_at_risk_below,
                health_healthy_above,
                risk_probability_below,
                badge_win_rate_above,
                badge_revenue_above,
                badge_streak_above,
                benchmark_value_above,
                reactivation_aging_days,
                max_recommendations,
                status_high_deal_count,
                trend_increasing_conversion,
                trend_stable_conversion,
                loss_attention_count,
                pipeline_strong_value,
                pipeline_stable_value,
                stale_activity_days,
                renewal_window_days,
            ]
        );
    }
}

#[derive(Debug, Default, Deserialize)]
struct InsightsPatch {
    simulated_delay_ms: Option<u64>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportPatch {
    locale: Option<Locale>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
