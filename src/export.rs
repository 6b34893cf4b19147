//! Ranking and CSV export
//!
//! Rows are split per image category, classified against the diff
//! threshold and ordered valid-first, then by ascending kernel time.
//! Both files are rendered in memory before either is written.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tokio::fs;

use crate::constants::REPORT_HEADER;
use crate::error::{AppError, AppResult};
use crate::models::{AggregateRow, ExportedRow, ImageCategory};
use crate::utils::format_decimal;

/// Outcome of writing one category's ranking file
#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub category: ImageCategory,
    pub path: PathBuf,
    pub total_rows: usize,
    pub valid_rows: usize,
}

/// Ranking order: valid rows before invalid ones, then faster kernels first
pub fn compare_ranking(a: &ExportedRow, b: &ExportedRow) -> Ordering {
    b.output_is_valid.cmp(&a.output_is_valid).then_with(|| {
        a.row
            .execution_times
            .kernel_ms
            .cmp(&b.row.execution_times.kernel_ms)
    })
}

/// Select one category's rows, classify them and sort them by rank.
///
/// The sort is stable, so rows that tie keep their traversal order.
pub fn rank_category(
    rows: &[AggregateRow],
    category: ImageCategory,
    max_diff_threshold: Decimal,
) -> Vec<ExportedRow> {
    let mut ranked: Vec<ExportedRow> = rows
        .iter()
        .filter(|row| row.category == category)
        .cloned()
        .map(|row| ExportedRow::classify(row, max_diff_threshold))
        .collect();

    ranked.sort_by(compare_ranking);
    ranked
}

/// Serialize a row in report column order
pub fn to_record(exported: &ExportedRow) -> [String; 7] {
    let row = &exported.row;
    [
        row.student_id.clone(),
        format_decimal(row.max_diff),
        format_decimal(row.execution_times.kernel_ms),
        format_decimal(row.execution_times.total_ms),
        row.error_text.clone(),
        row.is_known_image().to_string(),
        exported.output_is_valid.to_string(),
    ]
}

/// Render a ranked list as CSV, header first
pub fn render_csv(rows: &[ExportedRow]) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(REPORT_HEADER)?;
    for row in rows {
        writer.write_record(to_record(row))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Csv(csv::Error::from(e.into_error())))
}

/// Rank both categories and write `known-image-ranks.csv` and
/// `unknown-image-ranks.csv` into `output_dir`.
pub async fn write_rankings(
    output_dir: &Path,
    rows: &[AggregateRow],
    max_diff_threshold: Decimal,
) -> AppResult<Vec<CategoryReport>> {
    let mut rendered = Vec::with_capacity(ImageCategory::ALL.len());
    for category in ImageCategory::ALL {
        let ranked = rank_category(rows, category, max_diff_threshold);
        let report = CategoryReport {
            category,
            path: output_dir.join(category.report_file_name()),
            total_rows: ranked.len(),
            valid_rows: ranked.iter().filter(|r| r.output_is_valid).count(),
        };
        rendered.push((report, render_csv(&ranked)?));
    }

    fs::create_dir_all(output_dir)
        .await
        .map_err(|e| AppError::io(output_dir, e))?;

    let mut reports = Vec::with_capacity(rendered.len());
    for (report, bytes) in rendered {
        write_file(&report.path, &bytes).await?;
        tracing::info!(
            "Wrote {} ({} rows, {} valid)",
            report.path.display(),
            report.total_rows,
            report.valid_rows
        );
        reports.push(report);
    }

    Ok(reports)
}

/// Write through a temporary sibling so a file is never left half written
async fn write_file(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp_path, bytes)
        .await
        .map_err(|e| AppError::io(&tmp_path, e))?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        if let Err(cleanup) = fs::remove_file(&tmp_path).await {
            tracing::warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(AppError::io(path, e));
    }

    Ok(())
}
