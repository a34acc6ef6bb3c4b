use clap::Args;
use dealscope_core::domain::deal::DealId;
use dealscope_core::errors::{ApplicationError, DomainError};
use dealscope_core::metrics::stage_totals;
use dealscope_core::services::ProductRecommendationService;
use dealscope_insights::{
    DealAnalysis, EmailDraft, GrowthInsight, GrowthRequest, InsightProvider, MockInsightProvider,
};
use serde::Serialize;
use tracing::info;

use crate::commands::{load_context, CommandResult, ReportArgs};
use crate::render::TemplateCatalog;

const COMMAND: &str = "insight";

#[derive(Debug, Clone, Args)]
pub struct InsightArgs {
    #[arg(long, help = "Deal id to analyze")]
    pub deal: String,
    #[arg(long, help = "Override the simulated provider delay in milliseconds")]
    pub delay_ms: Option<u64>,
    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Debug, Serialize)]
pub struct InsightReport {
    pub growth: GrowthInsight,
    pub analysis: DealAnalysis,
    pub email: EmailDraft,
}

pub fn run(args: &InsightArgs) -> CommandResult {
    let mut context = match load_context(&args.report) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };
    if let Some(delay_ms) = args.delay_ms {
        context.config.insights.simulated_delay_ms = delay_ms;
    }

    let id = DealId(args.deal.clone());
    let Some(deal) = context.snapshot.deal(&id) else {
        let error = ApplicationError::from(DomainError::DealNotFound(id));
        return CommandResult::from_error(COMMAND, &error);
    };
    let recommendations = ProductRecommendationService::for_deal(
        deal,
        context.snapshot.as_of,
        &context.config.analytics,
    )
    .recommendations;

    let totals = stage_totals(&context.snapshot.deals);
    let growth_request = GrowthRequest {
        period: context.snapshot.as_of.format("%Y-%m").to_string(),
        won_revenue: totals.won.value,
        deal_count: totals.total.count,
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    let provider = MockInsightProvider::from_config(&context.config.insights)
        .with_thresholds(context.config.analytics.clone());
    info!(
        event_name = "cli.insight.requested",
        deal_id = %deal.id,
        delay_ms = context.config.insights.simulated_delay_ms,
        "requesting insights from mock provider"
    );

    let result = runtime.block_on(async {
        let growth = provider.growth(&growth_request).await?;
        let analysis = provider.analyze_deal(deal, &recommendations).await?;
        let email = provider.draft_email(deal).await?;
        Ok::<InsightReport, anyhow::Error>(InsightReport { growth, analysis, email })
    });

    let report = match result {
        Ok(report) => report,
        Err(error) => {
            let error = ApplicationError::Insight(format!("{error:#}"));
            return CommandResult::from_error(COMMAND, &error);
        }
    };

    if args.report.json {
        let message = format!("insights for deal {}", report.analysis.deal_id);
        return CommandResult::success_with_data(COMMAND, message, Some(&report));
    }

    CommandResult::text(render(&report, &context.catalog))
}

pub fn render(report: &InsightReport, catalog: &TemplateCatalog) -> String {
    let mut lines = vec![
        report.growth.headline.render(catalog),
        String::new(),
        report.analysis.summary.render(catalog),
    ];

    if !report.analysis.risks.is_empty() {
        lines.push("risks:".to_string());
        for risk in &report.analysis.risks {
            lines.push(format!("  - {}", risk.render(catalog)));
        }
    }
    if !report.analysis.next_steps.is_empty() {
        lines.push("next steps:".to_string());
        for step in &report.analysis.next_steps {
            lines.push(format!("  - {}", step.render(catalog)));
        }
    }

    lines.push(String::new());
    lines.push(format!("subject: {}", report.email.subject.render(catalog)));
    lines.push(String::new());
    lines.push(report.email.body.render(catalog));

    lines.join("\n")
}
