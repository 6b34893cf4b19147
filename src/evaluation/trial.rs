//! Reading a single trial directory

use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::fs;

use crate::config::ReferenceImages;
use crate::constants::{ERROR_SEPARATOR, OUTPUT_IMAGE_FILE, STDERR_FILE};
use crate::error::{AppError, AppResult};
use crate::evaluation::diff::ImageComparator;
use crate::evaluation::metrics::read_execution_times;
use crate::models::{ImageCategory, TrialRecord};

/// Builds [`TrialRecord`]s from `<trial>/{known-image,unknown-image}/`
pub struct TrialReader {
    comparator: Arc<dyn ImageComparator>,
    references: ReferenceImages,
}

impl TrialReader {
    pub fn new(comparator: Arc<dyn ImageComparator>, references: ReferenceImages) -> Self {
        Self {
            comparator,
            references,
        }
    }

    /// Read both image categories of a trial, known image first
    pub async fn read_trial(&self, trial_dir: &Path) -> AppResult<[TrialRecord; 2]> {
        let known = self.read_category(trial_dir, ImageCategory::Known).await?;
        let unknown = self.read_category(trial_dir, ImageCategory::Unknown).await?;
        Ok([known, unknown])
    }

    /// Read one image category of a trial.
    ///
    /// Missing execution times do not fail the trial: the record is returned
    /// without times or diff and the reason is appended to its error text.
    pub async fn read_category(
        &self,
        trial_dir: &Path,
        category: ImageCategory,
    ) -> AppResult<TrialRecord> {
        let result_dir = trial_dir.join(category.dir_name());

        let stderr_path = result_dir.join(STDERR_FILE);
        let stderr = fs::read(&stderr_path)
            .await
            .map_err(|e| AppError::io(&stderr_path, e))?;
        let mut error_text =
            (!stderr.is_empty()).then(|| String::from_utf8_lossy(&stderr).into_owned());

        let execution_times = match read_execution_times(&result_dir).await {
            Ok(times) => times,
            Err(e) if e.is_recoverable() => {
                let message = e.to_string();
                tracing::debug!("{}", message);
                let text = error_text.get_or_insert_with(String::new);
                text.push_str(&message);
                text.push_str(ERROR_SEPARATOR);

                return Ok(TrialRecord {
                    category,
                    diff_from_reference: Decimal::ZERO,
                    execution_times: None,
                    error_text,
                });
            }
            Err(e) => return Err(e),
        };

        let produced = result_dir.join(OUTPUT_IMAGE_FILE);
        let diff_from_reference = self
            .comparator
            .compare_images(&produced, self.references.for_category(category))
            .await?;

        tracing::debug!(
            "{} {}: kernel {} ms, total {} ms, diff {}%",
            trial_dir.display(),
            category,
            execution_times.kernel_ms,
            execution_times.total_ms,
            diff_from_reference
        );

        Ok(TrialRecord {
            category,
            diff_from_reference,
            execution_times: Some(execution_times),
            error_text,
        })
    }
}
