//! Execution time extraction from captured stdout

use std::path::Path;

use rust_decimal::Decimal;
use tokio::fs;

use crate::constants::{
    KERNEL_TIME_MARKER, KERNEL_TIME_OFFSET, STDOUT_FILE, TOTAL_TIME_MARKER, TOTAL_TIME_OFFSET,
};
use crate::error::{AppError, AppResult};
use crate::models::ExecutionTimes;
use crate::utils::{DecimalParseError, parse_decimal};

/// Read `stdout.txt` from a result directory and extract its execution times.
///
/// Returns [`AppError::Io`] if the file cannot be read and
/// [`AppError::MetricNotFound`] if either time is missing.
pub async fn read_execution_times(result_dir: &Path) -> AppResult<ExecutionTimes> {
    let stdout_path = result_dir.join(STDOUT_FILE);
    let bytes = fs::read(&stdout_path)
        .await
        .map_err(|e| AppError::io(&stdout_path, e))?;

    parse_execution_times(&String::from_utf8_lossy(&bytes), result_dir)
}

/// Extract kernel and total execution times from whitespace separated output.
///
/// The kernel time is the token 3 positions after `Kernel`, the total time
/// the token 4 positions after `Total`. When a marker appears more than once
/// the last parseable value wins. `source` is only used in error messages.
pub fn parse_execution_times(output: &str, source: &Path) -> AppResult<ExecutionTimes> {
    let tokens: Vec<&str> = output.split_whitespace().collect();

    let mut kernel = MetricScan::default();
    let mut total = MetricScan::default();

    for (idx, token) in tokens.iter().enumerate() {
        match *token {
            KERNEL_TIME_MARKER => kernel.observe(tokens.get(idx + KERNEL_TIME_OFFSET).copied()),
            TOTAL_TIME_MARKER => total.observe(tokens.get(idx + TOTAL_TIME_OFFSET).copied()),
            _ => {}
        }
    }

    let total_ms = total.finish("total execution time", source)?;
    let kernel_ms = kernel.finish("kernel execution time", source)?;

    Ok(ExecutionTimes {
        kernel_ms,
        total_ms,
    })
}

/// Values seen after one marker
#[derive(Default)]
struct MetricScan<'a> {
    value: Option<Decimal>,
    out_of_range: Option<&'a str>,
}

impl<'a> MetricScan<'a> {
    fn observe(&mut self, token: Option<&'a str>) {
        let Some(token) = token else {
            return;
        };
        match parse_decimal(token) {
            Ok(value) => self.value = Some(value),
            Err(DecimalParseError::OutOfRange) => self.out_of_range = Some(token),
            Err(DecimalParseError::NotANumber) => {}
        }
    }

    fn finish(self, metric: &str, source: &Path) -> AppResult<Decimal> {
        match (self.value, self.out_of_range) {
            (Some(value), _) => Ok(value),
            (None, Some(token)) => {
                tracing::warn!(
                    "{} {} in stdout at path {} is outside the supported decimal range",
                    metric,
                    token,
                    source.display()
                );
                Err(AppError::MetricNotFound(format!(
                    "Value {} for {} in stdout at path {} is outside the supported decimal range",
                    token,
                    metric,
                    source.display()
                )))
            }
            (None, None) => Err(AppError::MetricNotFound(format!(
                "Unable to find {} in stdout at path {}",
                metric,
                source.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OUTPUT: &str = "Loading image input.ppm (1024x768)\n\
        Kernel Execution Time: 12.5 ms\n\
        Total Execution Time (ms): 40.25\n\
        Wrote output_image.ppm\n";

    #[test]
    fn test_parse_sample_output() {
        let times = parse_execution_times(SAMPLE_OUTPUT, Path::new("trial")).unwrap();
        assert_eq!(times.kernel_ms, Decimal::new(125, 1));
        assert_eq!(times.total_ms, Decimal::new(4025, 2));
    }

    #[test]
    fn test_missing_kernel_time_is_metric_not_found() {
        let err = parse_execution_times(
            "Total Execution Time (ms): 40.25",
            Path::new("s1/t1/known-image"),
        )
        .unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Unable to find kernel execution time in stdout at path s1/t1/known-image"
        );
    }

    #[test]
    fn test_missing_total_time_reported_first() {
        let err = parse_execution_times("", Path::new("dir")).unwrap_err();
        assert!(matches!(err, AppError::MetricNotFound(_)));
        assert!(err.to_string().contains("total execution time"));
    }

    #[test]
    fn test_marker_near_end_of_output_is_missing() {
        // Value would be past the last token
        let err = parse_execution_times(
            "Total Execution Time (ms): 40 Kernel Execution",
            Path::new("dir"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("kernel execution time"));
    }

    #[test]
    fn test_unparseable_value_is_missing() {
        let err = parse_execution_times(
            "Kernel Execution Time: fast Total Execution Time (ms): 40",
            Path::new("dir"),
        )
        .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_out_of_range_value_is_reported_distinctly() {
        let err = parse_execution_times(
            "Kernel Execution Time: 1e30 Total Execution Time (ms): 40",
            Path::new("s1/t1/known-image"),
        )
        .unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Value 1e30 for kernel execution time in stdout at path s1/t1/known-image \
             is outside the supported decimal range"
        );
    }

    #[test]
    fn test_last_occurrence_wins() {
        let output = "Kernel Execution Time: 10 Kernel Execution Time: 11 \
            Total Execution Time (ms): 30";
        let times = parse_execution_times(output, Path::new("dir")).unwrap();
        assert_eq!(times.kernel_ms, Decimal::from(11));
        assert_eq!(times.total_ms, Decimal::from(30));
    }

    #[tokio::test]
    async fn test_read_missing_stdout_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_execution_times(dir.path()).await.unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STDOUT_FILE), SAMPLE_OUTPUT).unwrap();

        let times = read_execution_times(dir.path()).await.unwrap();
        assert_eq!(times.kernel_ms, Decimal::new(125, 1));
    }
}
