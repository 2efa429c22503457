//! The evaluation report written at the end of a batch.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use missionrag_core::Result;

use crate::aggregate::AggregateStat;
use crate::scores::ScoreSet;

/// One entry of `individual_results`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ItemResult {
    Completed {
        index: usize,
        question: String,
        category: String,
        mission: Option<String>,
        answer: String,
        context_count: usize,
        scores: ScoreSet,
    },
    Failed {
        index: usize,
        /// Absent for items that had no question at all.
        #[serde(skip_serializing_if = "Option::is_none")]
        question: Option<String>,
        error: String,
    },
}

impl ItemResult {
    pub fn index(&self) -> usize {
        match self {
            ItemResult::Completed { index, .. } | ItemResult::Failed { index, .. } => *index,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ItemResult::Failed { .. })
    }

    pub fn scores(&self) -> Option<&ScoreSet> {
        match self {
            ItemResult::Completed { scores, .. } => Some(scores),
            ItemResult::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    /// Set when the batch could not start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_questions: usize,
    pub individual_results: Vec<ItemResult>,
    pub aggregate_metrics: BTreeMap<String, AggregateStat>,
}

impl EvaluationReport {
    /// A report for a batch that never ran.
    pub fn aborted(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn successful(&self) -> usize {
        self.individual_results.iter().filter(|r| !r.is_error()).count()
    }

    pub fn failed(&self) -> usize {
        self.individual_results.iter().filter(|r| r.is_error()).count()
    }

    /// Write as indented JSON, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::{FAITHFULNESS, MetricOutcome};
    use serde_json::json;

    fn completed(index: usize) -> ItemResult {
        ItemResult::Completed {
            index,
            question: "What happened to Apollo 13?".into(),
            category: "unknown".into(),
            mission: None,
            answer: "Oxygen tank explosion.".into(),
            context_count: 2,
            scores: ScoreSet::Scored(vec![(FAITHFULNESS, MetricOutcome::Score(1.0))]),
        }
    }

    #[test]
    fn completed_item_shape() {
        let value = serde_json::to_value(completed(0)).unwrap();
        assert_eq!(
            value,
            json!({
                "index": 0,
                "question": "What happened to Apollo 13?",
                "category": "unknown",
                "mission": null,
                "answer": "Oxygen tank explosion.",
                "context_count": 2,
                "scores": { "faithfulness": 1.0 }
            })
        );
    }

    #[test]
    fn empty_question_has_no_question_field() {
        let item = ItemResult::Failed {
            index: 2,
            question: None,
            error: "Empty question".into(),
        };
        let value = serde_json::to_value(item).unwrap();
        assert_eq!(value, json!({ "index": 2, "error": "Empty question" }));
    }

    #[test]
    fn counts_success_and_failure() {
        let report = EvaluationReport {
            total_questions: 2,
            individual_results: vec![
                completed(0),
                ItemResult::Failed {
                    index: 1,
                    question: Some("q".into()),
                    error: "boom".into(),
                },
            ],
            ..EvaluationReport::default()
        };
        assert_eq!(report.successful(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn aborted_report_carries_error() {
        let report = EvaluationReport::aborted("No test questions found in missing.json");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["error"], "No test questions found in missing.json");
        assert_eq!(value["total_questions"], 0);
        assert!(value["individual_results"].as_array().unwrap().is_empty());
    }

    #[test]
    fn write_to_produces_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluation_results.json");
        let report = EvaluationReport {
            total_questions: 1,
            individual_results: vec![completed(0)],
            ..EvaluationReport::default()
        };
        report.write_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"total_questions\": 1"));
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["individual_results"][0]["context_count"], 2);
    }
}
