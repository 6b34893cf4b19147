//! Image comparison against reference outputs

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

use crate::constants::{DIFF_TOOL_BATCH_FLAG, ERROR_PERCENT_MARKER, ERROR_PERCENT_OFFSET};
use crate::error::{AppError, AppResult};
use crate::utils::{DecimalParseError, parse_decimal};

/// Compares a produced image with a reference image
#[async_trait]
pub trait ImageComparator: Send + Sync {
    /// Percentage of pixels that differ between the two images
    async fn compare_images(&self, produced: &Path, reference: &Path) -> AppResult<Decimal>;
}

/// Comparator backed by the `diffimg` command line tool.
///
/// Runs `<program> --batch <produced> <reference>` and reads the
/// `ErrorPercent = <value>` field from its stdout.
#[derive(Debug, Clone)]
pub struct DiffImgComparator {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl DiffImgComparator {
    /// Create a comparator for the given executable, without a timeout
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill the tool and fail the comparison if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, produced: &Path, reference: &Path) -> AppResult<Output> {
        let mut command = Command::new(&self.program);
        command
            .arg(DIFF_TOOL_BATCH_FLAG)
            .arg(produced)
            .arg(reference)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let output = command.output();

        let result = match self.timeout {
            Some(limit) => timeout(limit, output).await.map_err(|_| {
                AppError::ExternalTool(format!(
                    "{} timed out after {:?} comparing {}",
                    self.program.display(),
                    limit,
                    produced.display()
                ))
            })?,
            None => output.await,
        };

        result.map_err(|e| {
            AppError::ExternalTool(format!(
                "Failed to run {}: {}",
                self.program.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl ImageComparator for DiffImgComparator {
    async fn compare_images(&self, produced: &Path, reference: &Path) -> AppResult<Decimal> {
        let output = self.run(produced, reference).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::ExternalTool(format!(
                "{} exited with {} comparing {} to {}: {}",
                self.program.display(),
                output.status,
                produced.display(),
                reference.display(),
                stderr.trim()
            )));
        }

        let report = String::from_utf8_lossy(&output.stdout);
        match parse_error_percent(&report) {
            Ok(Some(percent)) => Ok(percent),
            Err(e) => Err(AppError::ExternalTool(format!(
                "{} reported an ErrorPercent for {} that cannot be used: {}",
                self.program.display(),
                produced.display(),
                e
            ))),
            Ok(None) => {
                // Lenient: a report without a usable ErrorPercent counts as identical
                tracing::warn!(
                    "No ErrorPercent in {} report for {}, treating diff as 0",
                    self.program.display(),
                    produced.display()
                );
                Ok(Decimal::ZERO)
            }
        }
    }
}

/// Extract the error percentage from a report such as
/// `ErrorPercent = 3.9e-05 (threshold = 0)`.
///
/// Only the first `ErrorPercent` token is considered. `Ok(None)` means the
/// report carries no usable value; a number too large for a decimal is an error.
pub fn parse_error_percent(report: &str) -> Result<Option<Decimal>, DecimalParseError> {
    let tokens: Vec<&str> = report.split_whitespace().collect();
    let Some(idx) = tokens.iter().position(|t| *t == ERROR_PERCENT_MARKER) else {
        return Ok(None);
    };

    match tokens.get(idx + ERROR_PERCENT_OFFSET).map(|token| parse_decimal(token)) {
        Some(Ok(percent)) => Ok(Some(percent)),
        Some(Err(DecimalParseError::OutOfRange)) => Err(DecimalParseError::OutOfRange),
        Some(Err(DecimalParseError::NotANumber)) | None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_percent() {
        let report = "Images differ\nErrorPercent = 3.9e-05 (threshold = 0)\n";
        assert_eq!(parse_error_percent(report), Ok(Some(Decimal::new(39, 6))));

        assert_eq!(
            parse_error_percent("ErrorPercent = 0.75"),
            Ok(Some(Decimal::new(75, 2)))
        );
        assert_eq!(
            parse_error_percent("ErrorPercent = 1e-40"),
            Ok(Some(Decimal::ZERO))
        );
    }

    #[test]
    fn test_parse_error_percent_out_of_range() {
        assert_eq!(
            parse_error_percent("ErrorPercent = 1e40 (threshold = 0)"),
            Err(DecimalParseError::OutOfRange)
        );
    }

    #[test]
    fn test_parse_error_percent_missing() {
        assert_eq!(parse_error_percent("images are identical"), Ok(None));
        assert_eq!(parse_error_percent("ErrorPercent ="), Ok(None));
        assert_eq!(parse_error_percent("ErrorPercent = n/a"), Ok(None));
    }

    #[tokio::test]
    async fn test_missing_tool_is_external_tool_error() {
        let comparator = DiffImgComparator::new("/nonexistent/diffimg-for-tests");
        let err = comparator
            .compare_images(Path::new("a.ppm"), Path::new("b.ppm"))
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "EXTERNAL_TOOL_ERROR");
    }

    #[cfg(unix)]
    mod unix {
        use std::os::unix::fs::PermissionsExt;

        use super::*;

        fn script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-diffimg");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[tokio::test]
        async fn test_reads_report_from_tool() {
            let dir = tempfile::tempdir().unwrap();
            let tool = script(dir.path(), "echo \"ErrorPercent = 0.5 (threshold = 0)\"");

            let diff = DiffImgComparator::new(tool)
                .compare_images(Path::new("a.ppm"), Path::new("b.ppm"))
                .await
                .unwrap();
            assert_eq!(diff, Decimal::new(5, 1));
        }

        #[tokio::test]
        async fn test_missing_marker_is_zero_diff() {
            let dir = tempfile::tempdir().unwrap();
            let tool = script(dir.path(), "echo \"all good\"");

            let diff = DiffImgComparator::new(tool)
                .compare_images(Path::new("a.ppm"), Path::new("b.ppm"))
                .await
                .unwrap();
            assert_eq!(diff, Decimal::ZERO);
        }

        #[tokio::test]
        async fn test_out_of_range_percent_is_error() {
            let dir = tempfile::tempdir().unwrap();
            let tool = script(dir.path(), "echo \"ErrorPercent = 1e40 (threshold = 0)\"");

            let err = DiffImgComparator::new(tool)
                .compare_images(Path::new("a.ppm"), Path::new("b.ppm"))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ExternalTool(_)));
            assert!(err.to_string().contains("outside the supported decimal range"));
        }

        #[tokio::test]
        async fn test_nonzero_exit_is_error() {
            let dir = tempfile::tempdir().unwrap();
            let tool = script(dir.path(), "echo \"cannot open image\" >&2\nexit 2");

            let err = DiffImgComparator::new(tool)
                .compare_images(Path::new("a.ppm"), Path::new("b.ppm"))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ExternalTool(_)));
            assert!(err.to_string().contains("cannot open image"));
        }

        #[tokio::test]
        async fn test_timeout_kills_hung_tool() {
            let dir = tempfile::tempdir().unwrap();
            let tool = script(dir.path(), "sleep 10");

            let err = DiffImgComparator::new(tool)
                .with_timeout(Some(Duration::from_millis(100)))
                .compare_images(Path::new("a.ppm"), Path::new("b.ppm"))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("timed out"));
        }
    }
}
