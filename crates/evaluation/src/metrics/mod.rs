//! Answer quality metrics.
//!
//! | Metric | Kind | Needs |
//! |--------|------|-------|
//! | `response_relevancy` | LLM judge + embeddings | question, answer |
//! | `faithfulness` | LLM judge | answer, contexts |
//! | `bleu_score` | lexical | answer, reference |
//! | `rouge_score` | lexical | answer, reference |

pub mod judged;
pub mod lexical;

pub use judged::{Faithfulness, ResponseRelevancy};
pub use lexical::{BleuScore, RougeScore};

use async_trait::async_trait;
use missionrag_core::error::EvaluationError;

/// One question/answer pair as seen by a metric.
#[derive(Debug, Clone, Copy)]
pub struct Sample<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub contexts: &'a [String],
    /// Reference text for the lexical metrics.
    pub reference: Option<&'a str>,
}

impl<'a> Sample<'a> {
    pub fn new(question: &'a str, answer: &'a str, contexts: &'a [String]) -> Self {
        Self {
            question,
            answer,
            contexts,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: &'a str) -> Self {
        self.reference = Some(reference);
        self
    }

    pub(crate) fn require_reference(&self, metric: &str) -> Result<&'a str, EvaluationError> {
        self.reference.ok_or_else(|| EvaluationError::MissingInput {
            metric: metric.into(),
            field: "reference".into(),
        })
    }
}

/// A single named score in [0, 1].
#[async_trait]
pub trait Metric: Send + Sync {
    /// Key under which the score is reported.
    fn name(&self) -> &'static str;

    async fn score(&self, sample: &Sample<'_>) -> Result<f64, EvaluationError>;
}
