use chrono::{DateTime, SecondsFormat, Utc};

use super::domain::{DimensionResult, HeatmapCell, ResidualColor, SeverityBucket};
use super::heatmap::HeatmapSummary;

#[derive(Debug, thiserror::Error)]
pub enum HeatmapExportError {
    #[error("failed to write heatmap CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush heatmap CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("heatmap CSV is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn cell_for<'a>(
    cells: &'a [HeatmapCell],
    dimension: &str,
    bucket: SeverityBucket,
) -> Option<&'a HeatmapCell> {
    cells
        .iter()
        .find(|cell| cell.dimension == dimension && cell.severity_bucket == bucket)
}

/// One row per dimension and one column per bucket; omitted cells stay blank.
pub fn heatmap_to_csv(
    dimensions: &[DimensionResult],
    cells: &[HeatmapCell],
) -> Result<String, HeatmapExportError> {
    let summary = HeatmapSummary::from_cells(cells);
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let mut header = vec!["Dimension".to_string()];
    header.extend(
        SeverityBucket::ordered()
            .iter()
            .map(|bucket| bucket.label().to_string()),
    );
    writer.write_record(&header)?;

    for dimension in dimensions {
        let mut row = vec![dimension.key.clone()];
        for bucket in SeverityBucket::ordered() {
            let value = cell_for(cells, &dimension.key, bucket)
                .map(|cell| format!("{:.4}", cell.residual))
                .unwrap_or_default();
            row.push(value);
        }
        writer.write_record(&row)?;
    }

    writer.write_record([""])?;
    writer.write_record(["# Summary"])?;
    writer.write_record(["Total Cells", summary.total_cells.to_string().as_str()])?;
    writer.write_record(["Green (<=0.05)", summary.green_cells.to_string().as_str()])?;
    writer.write_record(["Amber (0.05-0.15)", summary.amber_cells.to_string().as_str()])?;
    writer.write_record(["Red (>0.15)", summary.red_cells.to_string().as_str()])?;
    writer.write_record(["Critical Gaps", summary.critical_gap_count.to_string().as_str()])?;
    writer.write_record([
        "Overall Risk Score",
        format!("{:.2}", summary.overall_risk_score).as_str(),
    ])?;

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn color_marker(color: ResidualColor) -> &'static str {
    match color {
        ResidualColor::Green => "G",
        ResidualColor::Amber => "A",
        ResidualColor::Red => "R",
    }
}

pub fn heatmap_to_markdown(
    session_label: &str,
    dimensions: &[DimensionResult],
    cells: &[HeatmapCell],
    generated_at: DateTime<Utc>,
) -> String {
    let summary = HeatmapSummary::from_cells(cells);
    let buckets = SeverityBucket::ordered();
    let mut lines = vec![
        "# Gap Heatmap Report".to_string(),
        String::new(),
        format!("**Session:** {session_label}"),
        format!(
            "**Generated:** {}",
            generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        String::new(),
    ];

    let labels: Vec<&str> = buckets.iter().map(|bucket| bucket.label()).collect();
    lines.push(format!("| Dimension | {} |", labels.join(" | ")));
    lines.push(format!("|{}|", vec!["---"; buckets.len() + 1].join("|")));

    for dimension in dimensions {
        let row: Vec<String> = buckets
            .iter()
            .map(|bucket| match cell_for(cells, &dimension.key, *bucket) {
                Some(cell) => format!("{} {:.2}", color_marker(cell.color), cell.residual),
                None => "-".to_string(),
            })
            .collect();
        lines.push(format!("| {} | {} |", dimension.display_name, row.join(" | ")));
    }

    lines.extend([
        String::new(),
        "## Summary".to_string(),
        String::new(),
        "| Metric | Value |".to_string(),
        "|--------|-------|".to_string(),
        format!("| Total Cells | {} |", summary.total_cells),
        format!("| Green (<=0.05) | {} |", summary.green_cells),
        format!("| Amber (0.05-0.15) | {} |", summary.amber_cells),
        format!("| Red (>0.15) | {} |", summary.red_cells),
        format!("| Critical Gaps | {} |", summary.critical_gap_count),
        format!("| Overall Risk Score | {:.2}% |", summary.overall_risk_score),
        String::new(),
        "## Legend".to_string(),
        String::new(),
        "- **Cell value**: severity-weighted residual of the questions in that bucket".to_string(),
        "- **G**: residual <= 0.05".to_string(),
        "- **A**: residual 0.05 - 0.15".to_string(),
        "- **R**: residual > 0.15".to_string(),
        "- **-**: no questions in that bucket".to_string(),
    ]);

    lines.join("\n")
}
