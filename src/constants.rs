//! Application-wide constants
//!
//! This module contains all constant values used throughout the ranker.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// CLI DEFAULTS
// =============================================================================

/// Default root directory holding one directory per student
pub const DEFAULT_ROOT_DIR: &str = ".";

/// Default directory the ranking CSVs are written to
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Default path of a reference image
pub const DEFAULT_REFERENCE_IMAGE: &str = ".";

/// Default maximum acceptable diff percentage
pub const DEFAULT_MAX_DIFF: &str = "1.0";

/// Default image comparison executable
pub const DEFAULT_DIFF_TOOL: &str = "diffimg";

/// Default tracing filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "sobel_ranker=info";

/// Tracing filter used with --verbose
pub const VERBOSE_LOG_FILTER: &str = "sobel_ranker=debug";

// =============================================================================
// TRIAL LAYOUT
// =============================================================================

/// Directory name of the known-image results inside a trial
pub const KNOWN_IMAGE_DIR: &str = "known-image";

/// Directory name of the unknown-image results inside a trial
pub const UNKNOWN_IMAGE_DIR: &str = "unknown-image";

/// Image produced by the submission
pub const OUTPUT_IMAGE_FILE: &str = "output_image.ppm";

/// Captured standard output of the submission
pub const STDOUT_FILE: &str = "stdout.txt";

/// Captured standard error of the submission
pub const STDERR_FILE: &str = "stderr.txt";

/// Entries starting with this prefix are ignored during traversal
pub const HIDDEN_ENTRY_PREFIX: char = '.';

// =============================================================================
// METRIC EXTRACTION
// =============================================================================

/// Marker token preceding the kernel execution time
pub const KERNEL_TIME_MARKER: &str = "Kernel";

/// Offset from the kernel marker to its value, e.g. `Kernel Execution Time: 12.5`
pub const KERNEL_TIME_OFFSET: usize = 3;

/// Marker token preceding the total execution time
pub const TOTAL_TIME_MARKER: &str = "Total";

/// Offset from the total marker to its value, e.g. `Total Execution Time (ms): 40.2`
pub const TOTAL_TIME_OFFSET: usize = 4;

/// Marker token in the diff tool report, e.g. `ErrorPercent = 3.9e-05`
pub const ERROR_PERCENT_MARKER: &str = "ErrorPercent";

/// Offset from the error percent marker to its value
pub const ERROR_PERCENT_OFFSET: usize = 2;

/// Flag passed to the diff tool before the two image paths
pub const DIFF_TOOL_BATCH_FLAG: &str = "--batch";

// =============================================================================
// REPORTS
// =============================================================================

/// Appended after every error message collected into a row
pub const ERROR_SEPARATOR: &str = ";";

/// Ranking file for the known image
pub const KNOWN_IMAGE_REPORT: &str = "known-image-ranks.csv";

/// Ranking file for the unknown image
pub const UNKNOWN_IMAGE_REPORT: &str = "unknown-image-ranks.csv";

/// Column order of both ranking files
pub const REPORT_HEADER: [&str; 7] = [
    "student-id",
    "max-diff",
    "kernel-exec-ms",
    "total-exec-ms",
    "std-err",
    "known-image",
    "valid-output",
];
