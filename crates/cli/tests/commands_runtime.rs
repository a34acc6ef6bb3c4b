use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

use dealscope_cli::commands::insight::{self, InsightArgs};
use dealscope_cli::commands::recommend::{self, RecommendArgs};
use dealscope_cli::commands::{brief, config, leaderboard, ConfigArgs, ReportArgs};
use serde_json::Value;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
    "as_of": "2024-06-01T00:00:00Z",
    "users": [
        { "id": "u1", "name": "Ayşe", "role": "rep" },
        { "id": "u2", "name": "Mehmet", "role": "rep" }
    ],
    "deals": [
        {
            "id": "D-1",
            "title": "Fleet routing",
            "customer": "Acme Lojistik",
            "product": "EnRoute",
            "value": 2000000,
            "stage": "Negotiation",
            "probability": 60,
            "owner_id": "u1",
            "source": "Referral",
            "created_at": "2024-01-10T00:00:00Z",
            "last_activity_at": "2024-05-28T00:00:00Z"
        },
        {
            "id": "D-2",
            "title": "Warehouse rollout",
            "customer": "Beta Market",
            "product": "Stokbar",
            "value": 150000,
            "stage": "Kazanıldı",
            "probability": 100,
            "owner_id": "u2",
            "source": "Website",
            "created_at": "2024-02-01T00:00:00Z",
            "closed_at": "2024-04-15T00:00:00Z"
        },
        {
            "id": "D-3",
            "title": "Field service pilot",
            "customer": "Gamma Teknik",
            "product": "ServiceCore",
            "value": 90000,
            "stage": "Proposal",
            "probability": 20,
            "owner_id": "u2",
            "source": "Website",
            "created_at": "2024-01-05T00:00:00Z",
            "last_activity_at": "2024-03-01T00:00:00Z"
        },
        {
            "id": "D-4",
            "title": "Lost renewal",
            "customer": "Delta",
            "product": "Quest",
            "value": 40000,
            "stage": "Lost",
            "owner_id": "u1",
            "created_at": "2024-03-01T00:00:00Z",
            "closed_at": "2024-05-01T00:00:00Z"
        }
    ]
}"#;

#[test]
fn brief_returns_structured_report() {
    with_env(&[], || {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let result = brief::run(&ReportArgs::new(&path).json());
        assert_eq!(result.exit_code, 0, "expected successful brief");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "brief");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["totals"]["total"]["count"], 4);
        assert_eq!(payload["data"]["totals"]["won"]["count"], 1);
        assert_eq!(payload["data"]["messages"].as_array().map(Vec::len), Some(5));
    });
}

#[test]
fn brief_renders_text_in_requested_locale() {
    with_env(&[("DEALSCOPE_LOCALE", "tr")], || {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let result = brief::run(&ReportArgs::new(&path));
        assert_eq!(result.exit_code, 0, "expected successful brief");
        assert!(result.output.contains("Kazanıldı"), "funnel should use Turkish stage labels");
        assert!(serde_json::from_str::<Value>(&result.output).is_err());
    });
}

#[test]
fn leaderboard_ranks_representatives() {
    with_env(&[], || {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let result = leaderboard::run(&ReportArgs::new(&path).json());
        assert_eq!(result.exit_code, 0, "expected successful leaderboard");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "leaderboard");
        let entries = payload["data"]["leaderboard"].as_array().expect("leaderboard array");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["rank"], 1);
        assert_eq!(payload["data"]["stale"][0]["deal_id"], "D-3");
    });
}

#[test]
fn recommend_returns_ranked_products_for_deal() {
    with_env(&[], || {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let args = RecommendArgs {
            deal: Some("D-1".to_string()),
            all: false,
            report: ReportArgs::new(&path).json(),
        };
        let result = recommend::run(&args);
        assert_eq!(result.exit_code, 0, "expected successful recommendation");

        let payload = parse_payload(&result.output);
        let recommendations =
            payload["data"][0]["recommendations"].as_array().expect("recommendation array");
        let products: Vec<&str> =
            recommendations.iter().filter_map(|item| item["product"].as_str()).collect();
        assert_eq!(products, vec!["Quest", "Stokbar", "Hosting", "Varuna", "ServiceCore"]);
    });
}

#[test]
fn recommend_reports_missing_deal_as_not_found() {
    with_env(&[], || {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let args = RecommendArgs {
            deal: Some("D-404".to_string()),
            all: false,
            report: ReportArgs::new(&path).json(),
        };
        let result = recommend::run(&args);
        assert_eq!(result.exit_code, 4, "expected not found exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "not_found");
    });
}

#[test]
fn recommend_all_skips_closed_deals() {
    with_env(&[], || {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let args = RecommendArgs { deal: None, all: true, report: ReportArgs::new(&path).json() };
        let result = recommend::run(&args);
        assert_eq!(result.exit_code, 0, "expected successful pipeline recommendations");

        let payload = parse_payload(&result.output);
        let ids: Vec<&str> = payload["data"]
            .as_array()
            .expect("rows array")
            .iter()
            .filter_map(|row| row["deal_id"].as_str())
            .collect();
        assert_eq!(ids, vec!["D-1", "D-3"]);
    });
}

#[test]
fn missing_snapshot_returns_snapshot_failure() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let result = brief::run(&ReportArgs::new(dir.path().join("missing.json")).json());
        assert_eq!(result.exit_code, 3, "expected snapshot failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "brief");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "snapshot");
    });
}

#[test]
fn malformed_snapshot_returns_snapshot_failure() {
    with_env(&[], || {
        let (_dir, path) = write_snapshot("{ \"as_of\": ");
        let result = leaderboard::run(&ReportArgs::new(&path).json());
        assert_eq!(result.exit_code, 3, "expected snapshot failure code");
        assert_eq!(parse_payload(&result.output)["error_class"], "snapshot");
    });
}

#[test]
fn invalid_env_override_returns_config_failure() {
    with_env(&[("DEALSCOPE_TOP_GROUP_LIMIT", "lots")], || {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let result = brief::run(&ReportArgs::new(&path).json());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn explicit_missing_config_file_returns_config_failure() {
    with_env(&[], || {
        let (dir, path) = write_snapshot(SNAPSHOT);
        let mut args = ReportArgs::new(&path).json();
        args.config.config = Some(dir.path().join("absent.toml"));

        let result = brief::run(&args);
        assert_eq!(result.exit_code, 2, "expected config failure code");
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

#[test]
fn insight_returns_growth_analysis_and_email() {
    with_env(&[("DEALSCOPE_INSIGHTS_DELAY_MS", "0"), ("DEALSCOPE_INSIGHTS_SEED", "7")], || {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let args = InsightArgs {
            deal: "D-3".to_string(),
            delay_ms: None,
            report: ReportArgs::new(&path).json(),
        };
        let result = insight::run(&args);
        assert_eq!(result.exit_code, 0, "expected successful insight run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "insight");
        assert_eq!(payload["data"]["analysis"]["deal_id"], "D-3");
        assert_eq!(payload["data"]["email"]["deal_id"], "D-3");
        let likelihood =
            payload["data"]["analysis"]["win_likelihood"].as_u64().expect("likelihood");
        assert!(likelihood <= 100);
    });
}

#[test]
fn insight_reports_missing_deal_as_not_found() {
    with_env(&[], || {
        let (_dir, path) = write_snapshot(SNAPSHOT);
        let args = InsightArgs {
            deal: "D-404".to_string(),
            delay_ms: Some(0),
            report: ReportArgs::new(&path).json(),
        };
        let result = insight::run(&args);
        assert_eq!(result.exit_code, 4, "expected not found exit code");
        assert_eq!(parse_payload(&result.output)["error_class"], "not_found");
    });
}

#[test]
fn config_attributes_env_and_flag_sources() {
    with_env(&[("DEALSCOPE_LEADERBOARD_LIMIT", "3")], || {
        let args = ConfigArgs { config: None, locale: Some("tr".parse().expect("locale")) };
        let result = config::run(&args, true);
        assert_eq!(result.exit_code, 0, "expected config inspection success");

        let payload = parse_payload(&result.output);
        let fields = payload["data"].as_array().expect("config fields");
        let field = |key: &str| {
            fields.iter().find(|field| field["key"] == key).cloned().expect("field present")
        };

        assert_eq!(field("analytics.leaderboard_limit")["value"], "3");
        assert_eq!(
            field("analytics.leaderboard_limit")["source"],
            "env (DEALSCOPE_LEADERBOARD_LIMIT)"
        );
        assert_eq!(field("report.locale")["value"], "tr");
        assert_eq!(field("report.locale")["source"], "flag (--locale)");
        assert_eq!(field("analytics.top_group_limit")["source"], "default");
    });
}

fn write_snapshot(raw: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("snapshot.json");
    fs::write(&path, raw).expect("write snapshot");
    (dir, path)
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(PoisonError::into_inner);

    let keys = [
        "DEALSCOPE_TOP_GROUP_LIMIT",
        "DEALSCOPE_LEADERBOARD_LIMIT",
        "DEALSCOPE_REVENUE_TARGET",
        "DEALSCOPE_INSIGHTS_DELAY_MS",
        "DEALSCOPE_INSIGHTS_SEED",
        "DEALSCOPE_LOCALE",
        "DEALSCOPE_LOGGING_LEVEL",
        "DEALSCOPE_LOGGING_FORMAT",
        "DEALSCOPE_LOG_LEVEL",
        "DEALSCOPE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
