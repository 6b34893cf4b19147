//! Ranking service - Collects every submission and writes the rankings

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppResult;
use crate::evaluation::{DiffImgComparator, ImageComparator, SubmissionCollector, TrialReader};
use crate::export::{CategoryReport, write_rankings};

/// Runs the whole pipeline: traverse, aggregate, rank, export
pub struct RankingService {
    config: Config,
    collector: SubmissionCollector,
}

impl RankingService {
    /// Create a service that compares images with the configured diff tool
    pub fn new(config: Config) -> Self {
        let comparator =
            DiffImgComparator::new(&config.diff_tool).with_timeout(config.diff_timeout);
        Self::with_comparator(config, Arc::new(comparator))
    }

    /// Create a service with a custom image comparator
    pub fn with_comparator(config: Config, comparator: Arc<dyn ImageComparator>) -> Self {
        let reader = TrialReader::new(comparator, config.references.clone());
        let collector = SubmissionCollector::new(reader, config.policy);
        Self { config, collector }
    }

    /// Rank every submission under the root directory.
    ///
    /// Nothing is written unless the whole tree was processed.
    pub async fn run(&self) -> AppResult<Vec<CategoryReport>> {
        tracing::info!(
            "Ranking submissions in {} (max diff {}%)",
            self.config.root_dir.display(),
            self.config.max_diff
        );

        let rows = self.collector.collect(&self.config.root_dir).await?;
        tracing::info!("Aggregated {} rows", rows.len());

        write_rankings(&self.config.output_dir, &rows, self.config.max_diff).await
    }
}
