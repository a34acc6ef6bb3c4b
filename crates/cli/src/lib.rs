pub mod commands;
pub mod render;

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dealscope_core::config::{AppConfig, LoadOptions};

use crate::commands::insight::InsightArgs;
use crate::commands::recommend::RecommendArgs;
use crate::commands::{ConfigArgs, ReportArgs};

#[derive(Debug, Parser)]
#[command(
    name = "dealscope",
    about = "Dealscope sales analytics CLI",
    long_about = "Build executive briefs, leaderboards, product recommendations, and simulated \
                  insights from a CRM snapshot.",
    after_help = "Examples:\n  dealscope brief --snapshot crm.json\n  \
                  dealscope recommend --snapshot crm.json --deal D-100 --json\n  \
                  dealscope config --locale tr"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Summarize pipeline totals, top groups, funnel, contracts, and narrative")]
    Brief(ReportArgs),
    #[command(about = "Rank representatives and list at-risk and stale deals")]
    Leaderboard(ReportArgs),
    #[command(about = "Recommend follow-up products for one deal or every open deal")]
    Recommend(RecommendArgs),
    #[command(about = "Request simulated growth, deal analysis, and an email draft for a deal")]
    Insight(InsightArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config {
        #[command(flatten)]
        config: ConfigArgs,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Command {
    fn config_args(&self) -> &ConfigArgs {
        match self {
            Self::Brief(args) | Self::Leaderboard(args) => &args.config,
            Self::Recommend(args) => &args.report.config,
            Self::Insight(args) => &args.report.config,
            Self::Config { config, .. } => config,
        }
    }
}

fn init_logging(config: &AppConfig) {
    use dealscope_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(io::stderr);

    // A subscriber may already be installed when commands run inside one process.
    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Commands report their own config errors; logging falls back to defaults.
    let logging_config = AppConfig::load(cli.command.config_args().load_options())
        .or_else(|_| AppConfig::load(LoadOptions::default()))
        .unwrap_or_default();
    init_logging(&logging_config);

    let result = match &cli.command {
        Command::Brief(args) => commands::brief::run(args),
        Command::Leaderboard(args) => commands::leaderboard::run(args),
        Command::Recommend(args) => commands::recommend::run(args),
        Command::Insight(args) => commands::insight::run(args),
        Command::Config { config, json } => commands::config::run(config, *json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
