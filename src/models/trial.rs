//! Per-trial measurement models

use std::fmt;

use rust_decimal::Decimal;

use crate::constants::{
    KNOWN_IMAGE_DIR, KNOWN_IMAGE_REPORT, UNKNOWN_IMAGE_DIR, UNKNOWN_IMAGE_REPORT,
};

/// Which of the two test images a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageCategory {
    /// Image whose reference output students had during development
    Known,
    /// Held-out image used to test generalization
    Unknown,
}

impl ImageCategory {
    /// Both categories, in report order
    pub const ALL: [ImageCategory; 2] = [ImageCategory::Known, ImageCategory::Unknown];

    /// Directory holding this category's results inside a trial
    pub fn dir_name(&self) -> &'static str {
        match self {
            ImageCategory::Known => KNOWN_IMAGE_DIR,
            ImageCategory::Unknown => UNKNOWN_IMAGE_DIR,
        }
    }

    /// Name of the ranking file written for this category
    pub fn report_file_name(&self) -> &'static str {
        match self {
            ImageCategory::Known => KNOWN_IMAGE_REPORT,
            ImageCategory::Unknown => UNKNOWN_IMAGE_REPORT,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ImageCategory::Known)
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Execution times reported by a submission, in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionTimes {
    /// Time spent in the edge-detection kernel
    pub kernel_ms: Decimal,
    /// End-to-end time including I/O and transfers
    pub total_ms: Decimal,
}

/// Result of one trial for one image category
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    pub category: ImageCategory,

    /// Diff percentage against the reference image
    pub diff_from_reference: Decimal,

    /// `None` when the metrics could not be found in stdout
    pub execution_times: Option<ExecutionTimes>,

    /// Captured stderr plus any metric extraction failures; `None` when clean
    pub error_text: Option<String>,
}

impl TrialRecord {
    /// Times contributing to the mean; missing metrics count as zero
    pub fn times_or_zero(&self) -> ExecutionTimes {
        self.execution_times.unwrap_or_default()
    }
}
