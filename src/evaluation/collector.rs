//! Traversal of the submissions tree
//!
//! Layout: `<root>/<student-id>/<trial>/{known-image,unknown-image}/`.
//! Hidden entries are ignored at the student and trial level.

use std::path::Path;

use crate::config::{ErrorPolicy, TraversalPolicy};
use crate::error::{AppError, AppResult};
use crate::evaluation::aggregate::TrialAggregator;
use crate::evaluation::trial::TrialReader;
use crate::models::{AggregateRow, ImageCategory};
use crate::utils::list_visible_entries;

/// Walks every student and trial and produces the unfiltered aggregate rows
pub struct SubmissionCollector {
    reader: TrialReader,
    policy: TraversalPolicy,
}

impl SubmissionCollector {
    pub fn new(reader: TrialReader, policy: TraversalPolicy) -> Self {
        Self { reader, policy }
    }

    /// Collect one row per (student, image category), known image first.
    ///
    /// Students and trials are visited in name order, one at a time.
    pub async fn collect(&self, root_dir: &Path) -> AppResult<Vec<AggregateRow>> {
        let students =
            list_visible_entries(root_dir).map_err(|e| AppError::io(root_dir, e))?;
        tracing::info!("Found {} student entries in {}", students.len(), root_dir.display());

        let mut rows = Vec::with_capacity(students.len() * ImageCategory::ALL.len());

        for student_id in students {
            let student_dir = root_dir.join(&student_id);

            let trials = match list_visible_entries(&student_dir) {
                Ok(trials) => trials,
                Err(e) => match self.policy.student_listing {
                    ErrorPolicy::Skip => {
                        tracing::warn!(
                            "Skipping non-directory entry in root dir {}: {}",
                            student_id,
                            e
                        );
                        continue;
                    }
                    ErrorPolicy::Abort => return Err(AppError::io(&student_dir, e)),
                },
            };

            let mut aggregators =
                ImageCategory::ALL.map(|category| TrialAggregator::new(&student_id, category));

            for trial in &trials {
                let trial_dir = student_dir.join(trial);

                match self.reader.read_trial(&trial_dir).await {
                    Ok(records) => {
                        for (aggregator, record) in aggregators.iter_mut().zip(records) {
                            aggregator.add_trial(record);
                        }
                    }
                    Err(e) if self.policy.trial_read == ErrorPolicy::Skip => {
                        tracing::warn!(
                            "Skipping trial {} of student {}: {}",
                            trial,
                            student_id,
                            e
                        );
                    }
                    Err(e) => return Err(e),
                }
            }

            tracing::debug!(
                "Student {}: {} of {} trials read",
                student_id,
                aggregators[0].trial_count(),
                trials.len()
            );

            rows.extend(aggregators.iter().map(TrialAggregator::aggregate));
        }

        Ok(rows)
    }
}
