//! Per-student trial aggregation

use crate::models::{AggregateRow, ImageCategory, TrialRecord};

/// Collects the trials of one student for one image category
pub struct TrialAggregator {
    student_id: String,
    category: ImageCategory,
    trials: Vec<TrialRecord>,
}

impl TrialAggregator {
    /// Create an empty aggregator
    pub fn new(student_id: impl Into<String>, category: ImageCategory) -> Self {
        Self {
            student_id: student_id.into(),
            category,
            trials: Vec::new(),
        }
    }

    /// Add a trial record; it must belong to this aggregator's category
    pub fn add_trial(&mut self, trial: TrialRecord) {
        debug_assert_eq!(trial.category, self.category);
        self.trials.push(trial);
    }

    /// Get number of trials
    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    /// Fold all trials into the student's row
    pub fn aggregate(&self) -> AggregateRow {
        AggregateRow::from_trials(self.student_id.clone(), self.category, &self.trials)
    }
}
