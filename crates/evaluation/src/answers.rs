//! Scoring answers that were produced elsewhere.
//!
//! Each record already carries its `question`, `answer` and retrieved
//! `contexts`; nothing is retrieved or generated here. Results and
//! aggregates follow the same rules as the batch report.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::aggregate::{AggregateStat, MetricAccumulator};
use crate::batch::Progress;
use crate::loader::lenient_string;
use crate::scorer::{MISSING_CREDENTIAL, QualityScorer};
use crate::scores::ScoreSet;

pub const NO_TEST_DATA: &str = "No test data provided";
const MISSING_QUESTION_OR_ANSWER: &str = "Missing question or answer";
const QUESTION_PREVIEW_CHARS: usize = 100;

/// One pre-generated answer to score.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnsweredItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub answer: String,
    #[serde(default, deserialize_with = "lenient_contexts")]
    pub contexts: Vec<String>,
}

impl AnsweredItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            contexts: Vec::new(),
        }
    }
}

/// String entries of a JSON array; anything else yields no contexts.
fn lenient_contexts<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerResult {
    Scored {
        index: usize,
        /// Shortened to 100 characters plus `...`.
        question: String,
        scores: ScoreSet,
    },
    Skipped {
        index: usize,
        error: String,
    },
}

impl AnswerResult {
    pub fn index(&self) -> usize {
        match self {
            AnswerResult::Scored { index, .. } | AnswerResult::Skipped { index, .. } => *index,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnswerResult::Skipped { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnswerScoreReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub individual_results: Vec<AnswerResult>,
    pub aggregate_metrics: BTreeMap<String, AggregateStat>,
}

impl AnswerScoreReport {
    pub fn successful(&self) -> usize {
        self.individual_results.iter().filter(|r| !r.is_error()).count()
    }

    pub fn failed(&self) -> usize {
        self.individual_results.iter().filter(|r| r.is_error()).count()
    }

    /// Write as indented JSON, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> missionrag_core::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Score every record in order. `scorer` is `None` without a credential.
pub async fn score_answers(
    scorer: Option<&QualityScorer>,
    items: &[AnsweredItem],
    mut on_progress: impl FnMut(Progress<'_>),
) -> AnswerScoreReport {
    if items.is_empty() {
        return AnswerScoreReport {
            error: Some(NO_TEST_DATA.into()),
            ..AnswerScoreReport::default()
        };
    }

    let total = items.len();
    let mut results = Vec::with_capacity(total);
    let mut accumulator = MetricAccumulator::new();

    for (index, item) in items.iter().enumerate() {
        on_progress(Progress::Started {
            position: index + 1,
            total,
            question: &item.question,
        });

        if item.question.is_empty() || item.answer.is_empty() {
            warn!(index, "Skipping record without question or answer");
            on_progress(Progress::Failed {
                error: MISSING_QUESTION_OR_ANSWER,
            });
            results.push(AnswerResult::Skipped {
                index,
                error: MISSING_QUESTION_OR_ANSWER.into(),
            });
            continue;
        }

        let scores = match scorer {
            Some(scorer) => scorer.score(&item.question, &item.answer, &item.contexts).await,
            None => ScoreSet::unavailable(MISSING_CREDENTIAL),
        };
        on_progress(Progress::Scored { scores: &scores });
        accumulator.record(&scores);

        results.push(AnswerResult::Scored {
            index,
            question: shorten(&item.question),
            scores,
        });
    }

    info!(total, "Answer scoring finished");
    AnswerScoreReport {
        error: None,
        individual_results: results,
        aggregate_metrics: accumulator.finish(),
    }
}

/// `.json` array of answer records. Anything unreadable yields an empty list.
pub fn load_answered_items(path: &Path) -> Vec<AnsweredItem> {
    let read = || -> missionrag_core::Result<Vec<AnsweredItem>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    };
    read().unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Error loading answers");
        Vec::new()
    })
}

fn shorten(question: &str) -> String {
    if question.chars().count() > QUESTION_PREVIEW_CHARS {
        let head: String = question.chars().take(QUESTION_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        question.to_string()
    }
}
