//! Sobel Ranker - Submission ranking for the Sobel edge-detection assignment
//!
//! Walks the per-student trial outputs, scrapes execution times from the
//! captured console output, compares every produced image with its reference
//! and writes one ranked CSV per test image.
//!
//! # Features
//!
//! - Kernel and total time extraction from `stdout.txt`
//! - Image comparison through an external `diffimg` tool
//! - Per-student averaging with decimal arithmetic
//! - Valid-first, fastest-first ranking against a diff threshold
//!
//! # Architecture
//!
//! - **Evaluation**: trial parsing, image comparison and aggregation
//! - **Export**: classification, ordering and CSV serialization
//! - **Services**: the end-to-end ranking run
//! - **Models**: trial and ranking rows

pub mod config;
pub mod constants;
pub mod error;
pub mod evaluation;
pub mod export;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::{Cli, Config};
pub use error::{AppError, AppResult};
pub use services::RankingService;
