//! Application configuration management
//!
//! This module defines the command line interface and turns the parsed
//! flags into a validated [`Config`]. Every flag can also be supplied
//! through its environment variable. Invalid values abort before any
//! submission is read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;

use crate::constants::{
    DEFAULT_DIFF_TOOL, DEFAULT_LOG_FILTER, DEFAULT_MAX_DIFF, DEFAULT_OUTPUT_DIR,
    DEFAULT_REFERENCE_IMAGE, DEFAULT_ROOT_DIR, VERBOSE_LOG_FILTER,
};
use crate::error::{AppError, AppResult};
use crate::models::ImageCategory;
use crate::utils::parse_decimal;

/// Command line flags
#[derive(Debug, Clone, Parser)]
#[command(name = "sobel-ranker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rank Sobel edge-detection submissions by kernel time and output correctness", long_about = None)]
pub struct Cli {
    /// The root directory of sobel outputs (one directory per student)
    #[arg(long, env = "SOBEL_ROOT_DIR", default_value = DEFAULT_ROOT_DIR)]
    pub root_dir: PathBuf,

    /// The path to the expected output of the known image
    #[arg(long, env = "SOBEL_EXP_KNOWN_IMAGE", default_value = DEFAULT_REFERENCE_IMAGE)]
    pub exp_known_image: PathBuf,

    /// The path to the expected output of the unknown image
    #[arg(long, env = "SOBEL_EXP_UNKNOWN_IMAGE", default_value = DEFAULT_REFERENCE_IMAGE)]
    pub exp_unknown_image: PathBuf,

    /// The directory to place the generated CSV files in
    #[arg(long, env = "SOBEL_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// The maximum acceptable percent difference
    #[arg(
        long,
        env = "SOBEL_MAX_DIFF",
        default_value = DEFAULT_MAX_DIFF,
        allow_negative_numbers = true
    )]
    pub max_diff: String,

    /// Image comparison executable, invoked as `<tool> --batch <produced> <reference>`
    #[arg(long, env = "SOBEL_DIFF_TOOL", default_value = DEFAULT_DIFF_TOOL)]
    pub diff_tool: PathBuf,

    /// Kill the comparison tool after this many seconds (no limit by default)
    #[arg(long, env = "SOBEL_DIFF_TIMEOUT_SECS")]
    pub diff_timeout_secs: Option<u64>,

    /// What to do when a student entry cannot be listed as a directory
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Skip)]
    pub on_student_error: ErrorPolicy,

    /// What to do when a trial cannot be read or compared
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    pub on_trial_error: ErrorPolicy,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Default tracing filter for this invocation
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        }
    }
}

/// How a traversal level reacts to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ErrorPolicy {
    /// Log the failure and continue with the next entry
    Skip,
    /// Stop the whole run with the error
    Abort,
}

/// Failure handling for each level of the submissions tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalPolicy {
    /// Student entry that cannot be listed (e.g. a stray file in the root)
    pub student_listing: ErrorPolicy,
    /// Trial whose files cannot be read or whose image cannot be compared
    pub trial_read: ErrorPolicy,
}

impl Default for TraversalPolicy {
    fn default() -> Self {
        Self {
            student_listing: ErrorPolicy::Skip,
            trial_read: ErrorPolicy::Abort,
        }
    }
}

/// Reference images the produced outputs are compared against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImages {
    pub known: PathBuf,
    pub unknown: PathBuf,
}

impl ReferenceImages {
    pub fn for_category(&self, category: ImageCategory) -> &Path {
        match category {
            ImageCategory::Known => &self.known,
            ImageCategory::Unknown => &self.unknown,
        }
    }
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub root_dir: PathBuf,
    pub output_dir: PathBuf,
    pub references: ReferenceImages,

    /// Rows whose max diff exceeds this percentage are invalid
    pub max_diff: Decimal,

    pub diff_tool: PathBuf,
    pub diff_timeout: Option<Duration>,
    pub policy: TraversalPolicy,
}

impl Config {
    /// Validate the parsed command line
    pub fn from_cli(cli: &Cli) -> AppResult<Self> {
        let max_diff = parse_max_diff(&cli.max_diff)?;

        let diff_timeout = match cli.diff_timeout_secs {
            Some(0) => {
                return Err(AppError::Configuration(
                    "diff-timeout-secs must be greater than zero".to_string(),
                ));
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(Self {
            root_dir: cli.root_dir.clone(),
            output_dir: cli.output_dir.clone(),
            references: ReferenceImages {
                known: cli.exp_known_image.clone(),
                unknown: cli.exp_unknown_image.clone(),
            },
            max_diff,
            diff_tool: cli.diff_tool.clone(),
            diff_timeout,
            policy: TraversalPolicy {
                student_listing: cli.on_student_error,
                trial_read: cli.on_trial_error,
            },
        })
    }
}

fn parse_max_diff(raw: &str) -> AppResult<Decimal> {
    let value = parse_decimal(raw).map_err(|e| {
        AppError::Configuration(format!(
            "Invalid max-diff '{}': expected a decimal percentage ({})",
            raw, e
        ))
    })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Configuration(format!(
            "Invalid max-diff '{}': must not be negative",
            raw
        )));
    }

    Ok(value)
}
