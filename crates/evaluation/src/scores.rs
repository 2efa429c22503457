//! Per-answer score sets.
//!
//! On the wire a score set is a flat JSON object:
//!
//! ```json
//! { "response_relevancy": 0.91, "faithfulness": 0.0, "faithfulness_error": "Judge model returned malformed output: ..." }
//! ```
//!
//! or `{ "error": "..." }` when scoring could not run at all.

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const RESPONSE_RELEVANCY: &str = "response_relevancy";
pub const FAITHFULNESS: &str = "faithfulness";
pub const BLEU_SCORE: &str = "bleu_score";
pub const ROUGE_SCORE: &str = "rouge_score";

/// Every metric the scorer can produce, in report order.
pub const METRIC_NAMES: [&str; 4] = [RESPONSE_RELEVANCY, FAITHFULNESS, BLEU_SCORE, ROUGE_SCORE];

/// Result of one metric on one answer.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Score(f64),
    Failed { reason: String },
}

impl MetricOutcome {
    /// The numeric score, `None` when the metric failed.
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricOutcome::Score(v) => Some(*v),
            MetricOutcome::Failed { .. } => None,
        }
    }
}

/// All metric outcomes for one answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreSet {
    /// Scoring could not run for this item.
    Unavailable { error: String },
    /// Outcomes keyed by metric name, in the order they were computed.
    Scored(Vec<(&'static str, MetricOutcome)>),
}

impl ScoreSet {
    pub fn unavailable(error: impl Into<String>) -> Self {
        ScoreSet::Unavailable {
            error: error.into(),
        }
    }

    pub fn get(&self, metric: &str) -> Option<&MetricOutcome> {
        match self {
            ScoreSet::Unavailable { .. } => None,
            ScoreSet::Scored(outcomes) => outcomes
                .iter()
                .find(|(name, _)| *name == metric)
                .map(|(_, outcome)| outcome),
        }
    }

    /// Numeric score for `metric`; `None` if absent or failed.
    pub fn score(&self, metric: &str) -> Option<f64> {
        self.get(metric).and_then(MetricOutcome::value)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ScoreSet::Unavailable { error } => Some(error),
            ScoreSet::Scored(_) => None,
        }
    }

    /// `(metric, score)` for every metric that produced a number.
    pub fn numeric(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        let outcomes: &[(&'static str, MetricOutcome)] = match self {
            ScoreSet::Unavailable { .. } => &[],
            ScoreSet::Scored(outcomes) => outcomes,
        };
        outcomes
            .iter()
            .filter_map(|(name, outcome)| outcome.value().map(|v| (*name, v)))
    }

    /// `(metric, value)` exactly as written to the report; a failed metric
    /// reads as 0.0. Empty when scoring was unavailable.
    pub fn reported(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        let outcomes: &[(&'static str, MetricOutcome)] = match self {
            ScoreSet::Unavailable { .. } => &[],
            ScoreSet::Scored(outcomes) => outcomes,
        };
        outcomes
            .iter()
            .map(|(name, outcome)| (*name, outcome.value().unwrap_or(0.0)))
    }
}

impl Serialize for ScoreSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScoreSet::Unavailable { error } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
            ScoreSet::Scored(outcomes) => {
                let mut map = serializer.serialize_map(None)?;
                for (name, outcome) in outcomes {
                    match outcome {
                        MetricOutcome::Score(v) => map.serialize_entry(name, v)?,
                        MetricOutcome::Failed { reason } => {
                            map.serialize_entry(name, &0.0)?;
                            map.serialize_entry(&format!("{name}_error"), reason)?;
                        }
                    }
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_metric_serializes_flat() {
        let set = ScoreSet::Scored(vec![
            (RESPONSE_RELEVANCY, MetricOutcome::Score(0.75)),
            (
                FAITHFULNESS,
                MetricOutcome::Failed {
                    reason: "rate limited".into(),
                },
            ),
        ]);
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(
            value,
            json!({
                "response_relevancy": 0.75,
                "faithfulness": 0.0,
                "faithfulness_error": "rate limited"
            })
        );
    }

    #[test]
    fn unavailable_serializes_as_error() {
        let set = ScoreSet::unavailable("OpenAI API key not provided");
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value, json!({ "error": "OpenAI API key not provided" }));
        assert_eq!(set.error(), Some("OpenAI API key not provided"));
    }

    #[test]
    fn failed_metric_has_no_numeric_score() {
        let set = ScoreSet::Scored(vec![
            (BLEU_SCORE, MetricOutcome::Score(0.1)),
            (
                ROUGE_SCORE,
                MetricOutcome::Failed {
                    reason: "x".into(),
                },
            ),
        ]);
        assert_eq!(set.score(BLEU_SCORE), Some(0.1));
        assert_eq!(set.score(ROUGE_SCORE), None);
        assert_eq!(set.score(FAITHFULNESS), None);
        assert_eq!(set.numeric().collect::<Vec<_>>(), vec![(BLEU_SCORE, 0.1)]);
    }

    #[test]
    fn reported_values_match_the_wire() {
        let set = ScoreSet::Scored(vec![
            (FAITHFULNESS, MetricOutcome::Score(1.0)),
            (
                RESPONSE_RELEVANCY,
                MetricOutcome::Failed {
                    reason: "timeout".into(),
                },
            ),
        ]);
        assert_eq!(
            set.reported().collect::<Vec<_>>(),
            vec![(FAITHFULNESS, 1.0), (RESPONSE_RELEVANCY, 0.0)]
        );
        assert_eq!(ScoreSet::unavailable("no key").reported().count(), 0);
    }
}
