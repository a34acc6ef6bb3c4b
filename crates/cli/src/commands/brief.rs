use dealscope_core::metrics::GroupedMetric;
use dealscope_core::services::{ExecutiveBrief, ExecutiveBriefService};
use tracing::info;

use crate::commands::{load_context, CommandResult, ReportArgs};
use crate::render::TemplateCatalog;

const COMMAND: &str = "brief";

pub fn run(args: &ReportArgs) -> CommandResult {
    let context = match load_context(args) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let brief = ExecutiveBriefService::build(&context.snapshot, &context.config.analytics);
    info!(
        event_name = "cli.brief.completed",
        deal_count = brief.totals.total.count,
        conversion_rate = brief.conversion_rate,
        "executive brief built"
    );

    if args.json {
        let message = format!("executive brief for {} deals", brief.totals.total.count);
        return CommandResult::success_with_data(COMMAND, message, Some(&brief));
    }

    CommandResult::text(render(&brief, &context.catalog))
}

pub fn render(brief: &ExecutiveBrief, catalog: &TemplateCatalog) -> String {
    let mut lines = vec![format!("Executive brief as of {}", brief.as_of.format("%Y-%m-%d"))];

    lines.push(String::new());
    for message in &brief.messages {
        lines.push(format!("  {}", message.render(catalog)));
    }

    lines.push(String::new());
    lines.push(format!(
        "deals: {} (won {}, lost {}, open {})",
        brief.totals.total.count,
        brief.totals.won.count,
        brief.totals.lost.count,
        brief.totals.open.count
    ));
    lines.push(format!("conversion rate: {:.1}%", brief.conversion_rate));
    lines.push(format!("win rate: {:.1}%", brief.win_rate));
    lines.push(format!("average deal value: {}", brief.average_deal_value.round_dp(2)));
    lines.push(format!("weighted pipeline: {}", brief.weighted_pipeline.round_dp(2)));

    push_groups(&mut lines, "top products", &brief.top_products);
    push_groups(&mut lines, "top sources", &brief.top_sources);
    push_groups(&mut lines, "top customers", &brief.top_customers);

    lines.push(String::new());
    lines.push("funnel:".to_string());
    for stage in &brief.funnel.stages {
        let rate = stage
            .pass_through_rate
            .map(|rate| format!("{rate:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "  - {}: {} deals, reached {}, pass-through {}",
            stage.stage.label(catalog.locale()),
            stage.count,
            stage.reached,
            rate
        ));
    }
    if brief.funnel.unrecognized.count > 0 {
        lines.push(format!("  - unrecognized stages: {} deals", brief.funnel.unrecognized.count));
    }

    let contracts = &brief.contracts;
    lines.push(String::new());
    lines.push(format!(
        "contracts: {} worth {}, {} renewals due, {} high risk, {} overdue installments ({})",
        contracts.contract_count,
        contracts.total_value.round_dp(2),
        contracts.renewals_due,
        contracts.high_risk,
        contracts.overdue_installments,
        contracts.overdue_amount.round_dp(2)
    ));

    lines.join("\n")
}

fn push_groups(lines: &mut Vec<String>, title: &str, groups: &[GroupedMetric]) {
    lines.push(String::new());
    lines.push(format!("{title}:"));
    if groups.is_empty() {
        lines.push("  (none)".to_string());
    }
    for group in groups {
        let value = group.value.round_dp(2);
        lines.push(format!("  - {}: {} deals, {value}", group.label, group.count));
    }
}
