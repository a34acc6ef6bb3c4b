use clap::{ArgGroup, Args};
use dealscope_core::domain::deal::DealId;
use dealscope_core::errors::ApplicationError;
use dealscope_core::narrative::{NarrativeMessage, Translate};
use dealscope_core::services::{DealRecommendations, ProductRecommendationService};
use tracing::info;

use crate::commands::{load_context, CommandResult, ReportArgs};
use crate::render::TemplateCatalog;

const COMMAND: &str = "recommend";

#[derive(Debug, Clone, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["deal", "all"])))]
pub struct RecommendArgs {
    #[arg(long, help = "Deal id to recommend products for")]
    pub deal: Option<String>,
    #[arg(long, help = "Recommend for every open deal in the snapshot")]
    pub all: bool,
    #[command(flatten)]
    pub report: ReportArgs,
}

pub fn run(args: &RecommendArgs) -> CommandResult {
    let context = match load_context(&args.report) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };
    let thresholds = &context.config.analytics;

    let rows = match &args.deal {
        Some(id) => {
            let id = DealId(id.clone());
            match ProductRecommendationService::for_deal_id(&context.snapshot, &id, thresholds) {
                Ok(row) => vec![row],
                Err(error) => {
                    return CommandResult::from_error(COMMAND, &ApplicationError::from(error))
                }
            }
        }
        None => ProductRecommendationService::for_pipeline(&context.snapshot, thresholds),
    };

    let total: usize = rows.iter().map(|row| row.recommendations.len()).sum();
    info!(
        event_name = "cli.recommend.completed",
        deal_count = rows.len(),
        recommendation_count = total,
        "recommendations built"
    );

    if args.report.json {
        let message = format!("{total} recommendations for {} deals", rows.len());
        return CommandResult::success_with_data(COMMAND, message, Some(&rows));
    }

    CommandResult::text(render(&rows, &context.catalog))
}

pub fn render(rows: &[DealRecommendations], catalog: &TemplateCatalog) -> String {
    if rows.is_empty() {
        return "No open deals to recommend for.".to_string();
    }

    let no_params = Default::default();
    let mut lines = Vec::new();
    for row in rows {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!(
            "{} {} ({}, {}, {})",
            row.deal_id,
            row.title,
            row.customer,
            row.product,
            row.value.round_dp(2)
        ));

        if row.recommendations.is_empty() {
            let none = NarrativeMessage::new("recommendation.none");
            lines.push(format!("  {}", none.render(catalog)));
        }
        for recommendation in &row.recommendations {
            lines.push(format!(
                "  - {} ({}, {})",
                recommendation.summary.render(catalog),
                catalog.translate(recommendation.confidence.key(), &no_params),
                catalog.translate(recommendation.impact.key(), &no_params)
            ));
            lines.push(format!("    {}", recommendation.detail.render(catalog)));
        }
    }

    lines.join("\n")
}
