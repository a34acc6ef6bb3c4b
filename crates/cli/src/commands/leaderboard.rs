use dealscope_core::narrative::Translate;
use dealscope_core::services::{ManagementIntelligenceService, ManagementReport};
use tracing::info;

use crate::commands::{load_context, CommandResult, ReportArgs};
use crate::render::TemplateCatalog;

const COMMAND: &str = "leaderboard";

pub fn run(args: &ReportArgs) -> CommandResult {
    let context = match load_context(args) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let report = ManagementIntelligenceService::build(&context.snapshot, &context.config.analytics);
    info!(
        event_name = "cli.leaderboard.completed",
        rep_count = report.team.rep_count,
        ranked = report.leaderboard.len(),
        at_risk = report.at_risk.len(),
        stale = report.stale.len(),
        "management report built"
    );

    if args.json {
        let message = format!("{} representatives ranked", report.leaderboard.len());
        return CommandResult::success_with_data(COMMAND, message, Some(&report));
    }

    CommandResult::text(render(&report, &context.catalog))
}

pub fn render(report: &ManagementReport, catalog: &TemplateCatalog) -> String {
    let mut lines = vec![format!("Leaderboard as of {}", report.as_of.format("%Y-%m-%d"))];
    let no_params = Default::default();

    if report.leaderboard.is_empty() {
        lines.push("  (no representatives)".to_string());
    }
    for entry in &report.leaderboard {
        let badges: Vec<String> =
            entry.badges.iter().map(|badge| catalog.translate(badge.key(), &no_params)).collect();
        let badges =
            if badges.is_empty() { String::new() } else { format!(" [{}]", badges.join(", ")) };
        lines.push(format!(
            "{:>3}. {} score {:.1}, revenue {}, win rate {:.1}%, streak {}{}",
            entry.rank,
            entry.name,
            entry.score,
            entry.revenue.round_dp(2),
            entry.win_rate,
            entry.streak,
            badges
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "team: {} reps, {} deals, revenue {}, win rate {:.1}%",
        report.team.rep_count,
        report.team.deal_count,
        report.team.revenue.round_dp(2),
        report.team.win_rate
    ));

    lines.push(String::new());
    lines.push(format!("at risk ({}):", report.at_risk.len()));
    for deal in &report.at_risk {
        lines.push(format!(
            "  - {} {} ({}), {}, health {} {}",
            deal.deal_id,
            deal.title,
            deal.customer,
            deal.value.round_dp(2),
            deal.health.score,
            catalog.translate(deal.health.status.key(), &no_params)
        ));
    }

    lines.push(String::new());
    lines.push(format!("stale ({}):", report.stale.len()));
    for deal in &report.stale {
        lines.push(format!(
            "  - {} {} ({}), {} days without activity, owner {}",
            deal.deal_id, deal.title, deal.customer, deal.days_since_activity, deal.owner_name
        ));
    }

    lines.join("\n")
}
