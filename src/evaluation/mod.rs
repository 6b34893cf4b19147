//! Submission evaluation engine
//!
//! Turns the on-disk trial outputs of every student into aggregate rows:
//!
//! 1. **Metrics** (`metrics.rs`): scrapes kernel/total execution times from
//!    the captured stdout of a run.
//! 2. **Diff** (`diff.rs`): compares a produced image with its reference
//!    through an external tool.
//! 3. **Trial** (`trial.rs`): combines the two with the captured stderr into
//!    one record per trial and image.
//! 4. **Aggregate** (`aggregate.rs`): folds a student's trials into one row
//!    per image.
//! 5. **Collector** (`collector.rs`): walks `<root>/<student>/<trial>/`.

pub mod aggregate;
pub mod collector;
pub mod diff;
pub mod metrics;
pub mod trial;

pub use aggregate::TrialAggregator;
pub use collector::SubmissionCollector;
pub use diff::{DiffImgComparator, ImageComparator};
pub use metrics::{parse_execution_times, read_execution_times};
pub use trial::TrialReader;
