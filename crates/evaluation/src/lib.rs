//! Answer quality evaluation for MissionRAG.
//!
//! - `metrics`: relevancy, faithfulness, BLEU and ROUGE-L
//! - `scorer`: runs every metric over one answer
//! - `batch`: answers and scores a test set, then aggregates
//! - `report`: the JSON artifact a batch produces
//! - `answers`: scores pre-generated answers without retrieval

pub mod aggregate;
pub mod answers;
pub mod batch;
pub mod loader;
pub mod metrics;
pub mod report;
pub mod scorer;
pub mod scores;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use aggregate::{AggregateStat, MetricAccumulator};
pub use answers::{
    AnswerResult, AnswerScoreReport, AnsweredItem, NO_TEST_DATA, load_answered_items, score_answers,
};
pub use batch::{BatchRunner, Progress};
pub use loader::{TestItem, load_test_questions};
pub use report::{EvaluationReport, ItemResult};
pub use scorer::{MISSING_CREDENTIAL, QualityScorer};
pub use scores::{METRIC_NAMES, MetricOutcome, ScoreSet};
