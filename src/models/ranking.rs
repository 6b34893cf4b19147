//! Aggregated ranking models

use rust_decimal::Decimal;

use crate::constants::ERROR_SEPARATOR;
use crate::models::{ExecutionTimes, ImageCategory, TrialRecord};

/// One student's performance on one image, folded over all of their trials
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub student_id: String,
    pub category: ImageCategory,

    /// Worst diff percentage seen in any trial
    pub max_diff: Decimal,

    /// Arithmetic mean over all trials
    pub execution_times: ExecutionTimes,

    /// Every non-empty trial error text, each followed by `;`
    pub error_text: String,

    /// Number of trials folded into this row
    pub trial_count: usize,
}

impl AggregateRow {
    /// Fold the trial records of one student and category into a row.
    ///
    /// With no trials the times and diff are zero and the row carries an
    /// error so it can never rank as valid.
    pub fn from_trials(
        student_id: impl Into<String>,
        category: ImageCategory,
        trials: &[TrialRecord],
    ) -> Self {
        let student_id = student_id.into();

        if trials.is_empty() {
            return Self {
                error_text: format!("No trials found for student {}{}", student_id, ERROR_SEPARATOR),
                student_id,
                category,
                max_diff: Decimal::ZERO,
                execution_times: ExecutionTimes::default(),
                trial_count: 0,
            };
        }

        let mut max_diff = Decimal::ZERO;
        let mut error_text = String::new();

        for trial in trials {
            max_diff = max_diff.max(trial.diff_from_reference);

            if let Some(text) = trial.error_text.as_deref().filter(|t| !t.is_empty()) {
                error_text.push_str(text);
                error_text.push_str(ERROR_SEPARATOR);
            }
        }

        let kernel_ms = mean(trials.iter().map(|t| t.times_or_zero().kernel_ms));
        let total_ms = mean(trials.iter().map(|t| t.times_or_zero().total_ms));

        let execution_times = match (kernel_ms, total_ms) {
            (Some(kernel_ms), Some(total_ms)) => ExecutionTimes {
                kernel_ms,
                total_ms,
            },
            _ => {
                error_text.push_str(&format!(
                    "Execution time average overflowed for student {}{}",
                    student_id, ERROR_SEPARATOR
                ));
                ExecutionTimes {
                    kernel_ms: kernel_ms.unwrap_or(Decimal::MAX),
                    total_ms: total_ms.unwrap_or(Decimal::MAX),
                }
            }
        };

        Self {
            student_id,
            category,
            max_diff,
            execution_times,
            error_text,
            trial_count: trials.len(),
        }
    }

    pub fn is_known_image(&self) -> bool {
        self.category.is_known()
    }

    pub fn has_errors(&self) -> bool {
        !self.error_text.is_empty()
    }
}

/// Arithmetic mean of a non-empty sequence.
///
/// Sums first for an exact result; when the sum leaves the decimal range the
/// values are divided before summing instead. `None` only if that fails too.
fn mean<I>(values: I) -> Option<Decimal>
where
    I: Iterator<Item = Decimal> + Clone,
{
    let count = Decimal::from(values.clone().count());

    values
        .clone()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .and_then(|sum| sum.checked_div(count))
        .or_else(|| {
            values
                .map(|value| value.checked_div(count))
                .try_fold(Decimal::ZERO, |sum, part| sum.checked_add(part?))
        })
}

/// An aggregate row with its validity against the diff threshold
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedRow {
    pub row: AggregateRow,

    /// False when the row has error text or exceeds the diff threshold
    pub output_is_valid: bool,
}

impl ExportedRow {
    /// Classify a row against the maximum acceptable diff percentage
    pub fn classify(row: AggregateRow, max_diff_threshold: Decimal) -> Self {
        let output_is_valid = !row.has_errors() && row.max_diff <= max_diff_threshold;
        Self {
            row,
            output_is_valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(kernel: i64, total: i64, diff: Decimal, error: Option<&str>) -> TrialRecord {
        TrialRecord {
            category: ImageCategory::Known,
            diff_from_reference: diff,
            execution_times: Some(ExecutionTimes {
                kernel_ms: Decimal::from(kernel),
                total_ms: Decimal::from(total),
            }),
            error_text: error.map(str::to_string),
        }
    }

    #[test]
    fn test_mean_times_and_max_diff() {
        let trials = vec![
            trial(10, 100, Decimal::new(5, 1), None),
            trial(20, 300, Decimal::new(2, 1), None),
        ];

        let row = AggregateRow::from_trials("husky1", ImageCategory::Known, &trials);

        assert_eq!(row.execution_times.kernel_ms, Decimal::from(15));
        assert_eq!(row.execution_times.total_ms, Decimal::from(200));
        assert_eq!(row.max_diff, Decimal::new(5, 1));
        assert_eq!(row.trial_count, 2);
        assert!(row.error_text.is_empty());
        assert!(row.is_known_image());
    }

    #[test]
    fn test_error_texts_are_concatenated() {
        let trials = vec![
            trial(1, 1, Decimal::ZERO, Some("segfault")),
            trial(1, 1, Decimal::ZERO, None),
            trial(1, 1, Decimal::ZERO, Some("")),
            trial(1, 1, Decimal::ZERO, Some("oom")),
        ];

        let row = AggregateRow::from_trials("husky1", ImageCategory::Known, &trials);
        assert_eq!(row.error_text, "segfault;oom;");
    }

    #[test]
    fn test_missing_metrics_count_as_zero_in_mean() {
        let mut missing = trial(0, 0, Decimal::ZERO, Some("no metrics;"));
        missing.execution_times = None;
        let trials = vec![trial(30, 60, Decimal::ZERO, None), missing];

        let row = AggregateRow::from_trials("husky1", ImageCategory::Known, &trials);
        assert_eq!(row.execution_times.kernel_ms, Decimal::from(15));
        assert_eq!(row.execution_times.total_ms, Decimal::from(30));
    }

    #[test]
    fn test_mean_of_times_near_decimal_limit() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let mut first = trial(0, 10, Decimal::ZERO, None);
        let mut second = trial(0, 30, Decimal::ZERO, None);
        for record in [&mut first, &mut second] {
            record.execution_times.as_mut().unwrap().kernel_ms = huge;
        }

        let row = AggregateRow::from_trials("husky1", ImageCategory::Known, &[first, second]);

        assert_eq!(row.execution_times.kernel_ms, huge);
        assert_eq!(row.execution_times.total_ms, Decimal::from(20));
        assert!(!row.has_errors());
    }

    #[test]
    fn test_zero_trials_yield_invalid_zero_row() {
        let row = AggregateRow::from_trials("husky1", ImageCategory::Unknown, &[]);

        assert_eq!(row.trial_count, 0);
        assert_eq!(row.execution_times, ExecutionTimes::default());
        assert_eq!(row.max_diff, Decimal::ZERO);
        assert_eq!(row.error_text, "No trials found for student husky1;");

        let exported = ExportedRow::classify(row, Decimal::ONE);
        assert!(!exported.output_is_valid);
    }

    #[test]
    fn test_classify_threshold_is_inclusive() {
        let at_threshold = AggregateRow::from_trials(
            "a",
            ImageCategory::Known,
            &[trial(1, 1, Decimal::ONE, None)],
        );
        assert!(ExportedRow::classify(at_threshold, Decimal::ONE).output_is_valid);

        let above = AggregateRow::from_trials(
            "b",
            ImageCategory::Known,
            &[trial(1, 1, Decimal::new(101, 2), None)],
        );
        assert!(!ExportedRow::classify(above, Decimal::ONE).output_is_valid);

        let with_error = AggregateRow::from_trials(
            "c",
            ImageCategory::Known,
            &[trial(1, 1, Decimal::ZERO, Some("warning"))],
        );
        assert!(!ExportedRow::classify(with_error, Decimal::ONE).output_is_valid);
    }
}
