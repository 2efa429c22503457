//! Batch evaluation: answer and score every test question, in order.
//!
//! Items run one at a time. Each item executes on its own task so a panic
//! inside a retriever or provider turns into an error entry for that item
//! instead of ending the batch.

use std::sync::Arc;

use missionrag_rag::RagPipeline;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::aggregate::MetricAccumulator;
use crate::loader::TestItem;
use crate::report::{EvaluationReport, ItemResult};
use crate::scorer::{MISSING_CREDENTIAL, QualityScorer};
use crate::scores::ScoreSet;

const DEFAULT_CATEGORY: &str = "unknown";
const EMPTY_QUESTION: &str = "Empty question";

/// Progress notifications, in the order they happen for each item.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Started {
        /// 1-based.
        position: usize,
        total: usize,
        question: &'a str,
    },
    Answered {
        answer: &'a str,
    },
    Scored {
        scores: &'a ScoreSet,
    },
    Failed {
        error: &'a str,
    },
}

pub struct BatchRunner {
    pipeline: Arc<RagPipeline>,
    scorer: Option<Arc<QualityScorer>>,
}

struct ItemOutput {
    answer: String,
    context_count: usize,
    scores: ScoreSet,
}

impl BatchRunner {
    /// `scorer` is `None` when no credential is available; every item is
    /// then reported with an unavailable score set.
    pub fn new(pipeline: Arc<RagPipeline>, scorer: Option<Arc<QualityScorer>>) -> Self {
        Self { pipeline, scorer }
    }

    pub async fn run(&self, items: &[TestItem]) -> EvaluationReport {
        self.run_with_progress(items, |_| {}).await
    }

    pub async fn run_with_progress(
        &self,
        items: &[TestItem],
        mut on_progress: impl FnMut(Progress<'_>),
    ) -> EvaluationReport {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        let mut accumulator = MetricAccumulator::new();

        info!(total, model = self.pipeline.model(), "Batch evaluation started");

        for (index, item) in items.iter().enumerate() {
            on_progress(Progress::Started {
                position: index + 1,
                total,
                question: &item.question,
            });

            if item.question.is_empty() {
                on_progress(Progress::Failed {
                    error: EMPTY_QUESTION,
                });
                results.push(ItemResult::Failed {
                    index,
                    question: None,
                    error: EMPTY_QUESTION.into(),
                });
                continue;
            }

            match self.process(item).await {
                Ok(output) => {
                    on_progress(Progress::Answered {
                        answer: &output.answer,
                    });
                    on_progress(Progress::Scored {
                        scores: &output.scores,
                    });
                    accumulator.record(&output.scores);
                    results.push(ItemResult::Completed {
                        index,
                        question: item.question.clone(),
                        category: item
                            .category
                            .clone()
                            .unwrap_or_else(|| DEFAULT_CATEGORY.into()),
                        mission: item.mission.clone(),
                        answer: output.answer,
                        context_count: output.context_count,
                        scores: output.scores,
                    });
                }
                Err(e) => {
                    error!(index, error = %e, "Item failed");
                    on_progress(Progress::Failed { error: &e });
                    results.push(ItemResult::Failed {
                        index,
                        question: Some(item.question.clone()),
                        error: e,
                    });
                }
            }
        }

        let report = EvaluationReport {
            error: None,
            total_questions: total,
            individual_results: results,
            aggregate_metrics: accumulator.finish(),
        };

        info!(
            successful = report.successful(),
            failed = report.failed(),
            "Batch evaluation finished"
        );
        report
    }

    /// Retrieve, generate and score one item. History is always empty.
    async fn process(&self, item: &TestItem) -> Result<ItemOutput, String> {
        let pipeline = self.pipeline.clone();
        let scorer = self.scorer.clone();
        let question = item.question.clone();
        let mission = item.mission.clone();

        let task = tokio::spawn(async move {
            let rag = pipeline.answer(&question, mission.as_deref(), &[]).await;
            let answer = rag.answer.text();
            let contexts = rag.contexts();

            let scores = match &scorer {
                Some(scorer) => scorer.score(&question, &answer, &contexts).await,
                None => ScoreSet::unavailable(MISSING_CREDENTIAL),
            };

            ItemOutput {
                answer,
                context_count: contexts.len(),
                scores,
            }
        });

        task.await.map_err(describe_join_error)
    }
}

fn describe_join_error(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "item processing panicked".into()
    }
}
