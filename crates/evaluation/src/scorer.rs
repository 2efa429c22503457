//! The quality scorer: every metric over one answer, failures isolated.
//!
//! A scorer only exists when there is a credential to run the judge with;
//! callers hold an `Option<QualityScorer>` and report
//! [`MISSING_CREDENTIAL`] for every item when it is `None`.

use std::sync::Arc;

use missionrag_config::{AppConfig, EvaluationConfig};
use missionrag_core::provider::Provider;
use missionrag_providers::OpenAiCompatProvider;
use tracing::{debug, warn};

use crate::metrics::{BleuScore, Faithfulness, Metric, ResponseRelevancy, RougeScore, Sample};
use crate::scores::{MetricOutcome, ScoreSet};

pub const MISSING_CREDENTIAL: &str = "OpenAI API key not provided";

pub struct QualityScorer {
    /// Scored against the question and retrieved contexts.
    judged: Vec<Box<dyn Metric>>,
    /// Scored against the reference; skipped when there is no context.
    lexical: Vec<Box<dyn Metric>>,
    reference_max_chars: usize,
    error_reason_max_chars: usize,
}

impl QualityScorer {
    /// The standard metric set judged by `provider`.
    pub fn new(provider: Arc<dyn Provider>, config: &EvaluationConfig) -> Self {
        let judged: Vec<Box<dyn Metric>> = vec![
            Box::new(ResponseRelevancy::new(
                provider.clone(),
                &config.evaluator_model,
                &config.embedding_model,
                config.relevancy_questions,
            )),
            Box::new(Faithfulness::new(provider, &config.evaluator_model)),
        ];
        let lexical: Vec<Box<dyn Metric>> = vec![Box::new(BleuScore), Box::new(RougeScore)];

        Self {
            judged,
            lexical,
            reference_max_chars: config.reference_max_chars,
            error_reason_max_chars: config.error_reason_max_chars,
        }
    }

    /// `None` when the configuration carries no API key.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let provider = OpenAiCompatProvider::from_config(config)?;
        Some(Self::new(Arc::new(provider), &config.evaluation))
    }

    /// A scorer over an explicit metric set.
    pub fn with_metrics(judged: Vec<Box<dyn Metric>>, lexical: Vec<Box<dyn Metric>>) -> Self {
        let defaults = EvaluationConfig::default();
        Self {
            judged,
            lexical,
            reference_max_chars: defaults.reference_max_chars,
            error_reason_max_chars: defaults.error_reason_max_chars,
        }
    }

    /// Score one answer. Never fails as a whole.
    pub async fn score(&self, question: &str, answer: &str, contexts: &[String]) -> ScoreSet {
        let sample = Sample::new(question, answer, contexts);
        let mut outcomes = Vec::with_capacity(self.judged.len() + self.lexical.len());

        for metric in &self.judged {
            outcomes.push((metric.name(), self.run(metric.as_ref(), &sample).await));
        }

        if !contexts.is_empty() {
            let reference = reference_text(contexts, self.reference_max_chars);
            let sample = sample.with_reference(&reference);
            for metric in &self.lexical {
                outcomes.push((metric.name(), self.run(metric.as_ref(), &sample).await));
            }
        }

        debug!(metrics = outcomes.len(), "Answer scored");
        ScoreSet::Scored(outcomes)
    }

    async fn run(&self, metric: &dyn Metric, sample: &Sample<'_>) -> MetricOutcome {
        match metric.score(sample).await {
            Ok(value) => MetricOutcome::Score(value),
            Err(e) => {
                warn!(metric = metric.name(), error = %e, "Metric failed");
                MetricOutcome::Failed {
                    reason: e.to_string().chars().take(self.error_reason_max_chars).collect(),
                }
            }
        }
    }
}

/// All contexts joined with a single space, cut to `max_chars` characters.
pub fn reference_text(contexts: &[String], max_chars: usize) -> String {
    contexts.join(" ").chars().take(max_chars).collect()
}
