use crate::infra::{InMemoryReadinessRepository, DEMO_SESSION_ID};
use chrono::Utc;
use clap::{Args, ValueEnum};
use quiz2biz::catalog::{active_definitions, standard_dimensions, CatalogImporter};
use quiz2biz::config::AppConfig;
use quiz2biz::error::AppError;
use quiz2biz::readiness::{CoverageOverride, ReadinessService, SessionId};
use quiz2biz::scoring::{
    heatmap_to_csv, heatmap_to_markdown, round_to, CoverageLevel, DimensionResult,
    HeatmapSummary, NextAction, ScoringEngine, TARGET_SCORE,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
    Markdown,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Dimension catalog CSV (key,display_name,weight[,order_index][,is_active]).
    /// Defaults to the standard eleven-dimension catalog.
    #[arg(long)]
    pub(crate) dimensions: Option<PathBuf>,
    /// Question sheet CSV (id,text,dimension_key,severity,coverage,answered,persona)
    #[arg(long)]
    pub(crate) questions: PathBuf,
    /// Maximum number of next actions to list (defaults to APP_NEXT_ACTION_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Session to score. Defaults to the seeded demo session.
    #[arg(long)]
    pub(crate) session_id: Option<String>,
    /// Skip the what-if simulation that follows the report.
    #[arg(long)]
    pub(crate) skip_simulation: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        dimensions,
        questions,
        limit,
        format,
    } = args;

    let config = AppConfig::load()?;
    let catalog = match dimensions {
        Some(path) => CatalogImporter::dimensions_from_path(path)?,
        None => standard_dimensions(),
    };
    let definitions = active_definitions(&catalog);
    let label = questions.display().to_string();
    let questions = CatalogImporter::questions_from_path(&questions)?;

    let engine = ScoringEngine::new(limit.unwrap_or(config.scoring.next_action_limit));
    let assessment = engine.assess(&definitions, &questions);

    match format {
        OutputFormat::Text => {
            println!("Readiness assessment for {label}");
            render_score(
                assessment.score,
                assessment.portfolio_residual,
                assessment.meets_threshold,
            );
            render_dimensions(&assessment.dimension_results);
            render_heatmap_summary(&assessment.heatmap_summary());
            render_next_actions(&assessment.next_actions);
        }
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&assessment).map_err(std::io::Error::from)?;
            println!("{json}");
        }
        OutputFormat::Csv => {
            let csv = heatmap_to_csv(&assessment.dimension_results, &assessment.heatmap_cells)?;
            print!("{csv}");
        }
        OutputFormat::Markdown => {
            let markdown = heatmap_to_markdown(
                &label,
                &assessment.dimension_results,
                &assessment.heatmap_cells,
                Utc::now(),
            );
            println!("{markdown}");
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let repository = Arc::new(InMemoryReadinessRepository::seeded());
    let service = ReadinessService::new(repository, config.scoring);
    let session_id = SessionId(
        args.session_id
            .unwrap_or_else(|| DEMO_SESSION_ID.to_string()),
    );

    println!("Quiz2Biz readiness demo");
    let response = service.calculate_readiness(&session_id)?;
    render_score(
        response.score,
        response.portfolio_residual,
        response.meets_threshold,
    );
    println!(
        "- Progress: {}/{} questions answered ({}%), {} sections remaining",
        response.progress.answered_questions,
        response.progress.total_questions,
        response.progress.percentage,
        response.progress.sections_remaining
    );
    render_dimensions(&response.residuals_by_dimension);

    let heatmap = service.heatmap(&session_id)?;
    render_heatmap_summary(&heatmap.summary);
    render_next_actions(&response.next_actions);

    if args.skip_simulation {
        return Ok(());
    }

    let Some(top) = response.next_actions.first() else {
        println!("\nNothing left to simulate: every question is fully covered.");
        return Ok(());
    };

    let simulated = service.simulate(
        &session_id,
        &[CoverageOverride {
            question_id: top.question_id.clone(),
            coverage_level: Some(CoverageLevel::Full),
            coverage: None,
        }],
    )?;
    println!(
        "\nWhat-if: fully evidencing {} moves the score from {:.2} to {:.2} ({:+.2})",
        top.question_id,
        response.score,
        simulated.score,
        round_to(simulated.score - response.score, 2)
    );

    Ok(())
}

fn render_score(score: f64, portfolio_residual: f64, meets_threshold: bool) {
    let verdict = if meets_threshold {
        "meets threshold"
    } else {
        "below threshold"
    };
    println!(
        "- Score: {:.2} / 100 (target {}) -> {}",
        score, TARGET_SCORE, verdict
    );
    println!("- Portfolio residual: {:.4}", portfolio_residual);
}

fn render_dimensions(dimensions: &[DimensionResult]) {
    println!("\nDimensions");
    for dimension in dimensions {
        println!(
            "  - {} ({}): residual {:.4} [{}] | weight {:.2} | {}/{} answered | avg coverage {:.0}%",
            dimension.display_name,
            dimension.key,
            dimension.residual,
            dimension.color().label(),
            dimension.weight,
            dimension.answered_count,
            dimension.question_count,
            dimension.coverage_average * 100.0
        );
    }
}

fn render_heatmap_summary(summary: &HeatmapSummary) {
    println!(
        "\nHeatmap: {} cells | {} green | {} amber | {} red | {} critical gaps | overall risk {:.2}",
        summary.total_cells,
        summary.green_cells,
        summary.amber_cells,
        summary.red_cells,
        summary.critical_gap_count,
        summary.overall_risk_score
    );
}

fn render_next_actions(actions: &[NextAction]) {
    if actions.is_empty() {
        println!("\nNo outstanding questions.");
        return;
    }

    println!("\nNext best questions");
    for (rank, action) in actions.iter().enumerate() {
        println!(
            "  {}. [+{:.1}] {} {} ({})",
            rank + 1,
            action.delta_score,
            action.question_id,
            action.question_text,
            action.persona.as_deref().unwrap_or("any persona")
        );
        println!("     {}", action.rationale);
    }
}
