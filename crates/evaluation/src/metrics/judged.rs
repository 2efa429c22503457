//! LLM-judged metrics.
//!
//! Both run the judge model at temperature 0 and expect a JSON object back.
//! Judges like to wrap JSON in prose or code fences, so the first `{` to the
//! last `}` is what gets parsed.

use std::sync::Arc;

use async_trait::async_trait;
use missionrag_core::error::EvaluationError;
use missionrag_core::message::Message;
use missionrag_core::provider::{EmbeddingRequest, Provider, ProviderRequest};
use missionrag_retrieval::cosine_similarity;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Metric, Sample};
use crate::scores::{FAITHFULNESS, RESPONSE_RELEVANCY};

const JUDGE_MAX_TOKENS: u32 = 1024;

const STATEMENT_EXTRACTION_PROMPT: &str = r#"Given a question and an answer, break the answer down into standalone factual statements.

QUESTION:
{question}

ANSWER:
{answer}

Rules:
- Each statement must be understandable without the others (no pronouns)
- Split compound sentences into atomic statements
- Skip greetings, hedges and questions

Respond in JSON:
{"statements": ["<statement>", ...]}"#;

const VERDICT_PROMPT: &str = r#"Judge whether each statement can be directly inferred from the context.

CONTEXT:
{context}

STATEMENTS:
{statements}

Use verdict 1 if the statement is supported by the context, 0 if it is not.

Respond in JSON:
{"verdicts": [{"statement": "<statement>", "reason": "<short reason>", "verdict": 1}, ...]}"#;

const QUESTION_GENERATION_PROMPT: &str = r#"Write {n} different questions that the following answer would be a direct response to.
Also decide whether the answer is noncommittal: evasive, vague or ambiguous ("I don't know", "I'm not sure").

ANSWER:
{answer}

Respond in JSON:
{"questions": ["<question>", ...], "noncommittal": 0}
Use noncommittal 1 for a noncommittal answer, 0 otherwise."#;

/// Send one judge prompt and parse its JSON verdict.
async fn judge<T: DeserializeOwned>(
    provider: &dyn Provider,
    model: &str,
    prompt: String,
) -> Result<T, EvaluationError> {
    let request = ProviderRequest {
        model: model.to_string(),
        messages: vec![Message::user(prompt)],
        temperature: 0.0,
        max_tokens: Some(JUDGE_MAX_TOKENS),
    };
    let response = provider.complete(request).await?;
    parse_judgement(&response.message.content)
}

pub(crate) fn parse_judgement<T: DeserializeOwned>(raw: &str) -> Result<T, EvaluationError> {
    let json = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => {
            return Err(EvaluationError::MalformedJudgement(
                "no JSON object in judge output".into(),
            ));
        }
    };
    serde_json::from_str(json).map_err(|e| EvaluationError::MalformedJudgement(e.to_string()))
}

// ── Faithfulness ──

#[derive(Debug, Deserialize)]
struct Statements {
    #[serde(default)]
    statements: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Verdicts {
    #[serde(default)]
    verdicts: Vec<Verdict>,
}

#[derive(Debug, Deserialize)]
struct Verdict {
    verdict: u8,
}

/// Share of the answer's statements that the retrieved contexts support.
pub struct Faithfulness {
    provider: Arc<dyn Provider>,
    model: String,
}

impl Faithfulness {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Metric for Faithfulness {
    fn name(&self) -> &'static str {
        FAITHFULNESS
    }

    async fn score(&self, sample: &Sample<'_>) -> Result<f64, EvaluationError> {
        let prompt = STATEMENT_EXTRACTION_PROMPT
            .replace("{question}", sample.question)
            .replace("{answer}", sample.answer);
        let extracted: Statements = judge(self.provider.as_ref(), &self.model, prompt).await?;

        if extracted.statements.is_empty() {
            return Err(EvaluationError::MetricFailed {
                metric: FAITHFULNESS.into(),
                reason: "no statements in answer".into(),
            });
        }

        let statements = extracted
            .statements
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = VERDICT_PROMPT
            .replace("{context}", &sample.contexts.join("\n\n"))
            .replace("{statements}", &statements);
        let judged: Verdicts = judge(self.provider.as_ref(), &self.model, prompt).await?;

        if judged.verdicts.is_empty() {
            return Err(EvaluationError::MalformedJudgement("empty verdict list".into()));
        }

        let supported = judged.verdicts.iter().filter(|v| v.verdict == 1).count();
        let score = supported as f64 / judged.verdicts.len() as f64;

        debug!(
            statements = extracted.statements.len(),
            supported, score, "Faithfulness judged"
        );
        Ok(score)
    }
}

// ── Response relevancy ──

#[derive(Debug, Deserialize)]
struct GeneratedQuestions {
    #[serde(default)]
    questions: Vec<String>,
    #[serde(default)]
    noncommittal: u8,
}

/// How well the answer addresses the question.
///
/// The judge reverse-engineers questions from the answer; the score is the
/// mean cosine similarity between their embeddings and the real question's.
/// A noncommittal answer scores zero.
pub struct ResponseRelevancy {
    provider: Arc<dyn Provider>,
    model: String,
    embedding_model: String,
    questions: usize,
}

impl ResponseRelevancy {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
        questions: usize,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            embedding_model: embedding_model.into(),
            questions: questions.max(1),
        }
    }
}

#[async_trait]
impl Metric for ResponseRelevancy {
    fn name(&self) -> &'static str {
        RESPONSE_RELEVANCY
    }

    async fn score(&self, sample: &Sample<'_>) -> Result<f64, EvaluationError> {
        let prompt = QUESTION_GENERATION_PROMPT
            .replace("{n}", &self.questions.to_string())
            .replace("{answer}", sample.answer);
        let generated: GeneratedQuestions = judge(self.provider.as_ref(), &self.model, prompt).await?;

        if generated.noncommittal != 0 {
            debug!("Answer judged noncommittal");
            return Ok(0.0);
        }
        if generated.questions.is_empty() {
            return Err(EvaluationError::MalformedJudgement("no questions generated".into()));
        }

        let mut inputs = Vec::with_capacity(generated.questions.len() + 1);
        inputs.push(sample.question.to_string());
        inputs.extend(generated.questions);

        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs,
            })
            .await?;

        let Some((original, generated)) = response.embeddings.split_first() else {
            return Err(EvaluationError::MetricFailed {
                metric: RESPONSE_RELEVANCY.into(),
                reason: "embedding response was empty".into(),
            });
        };
        if generated.is_empty() {
            return Err(EvaluationError::MetricFailed {
                metric: RESPONSE_RELEVANCY.into(),
                reason: "missing embeddings for generated questions".into(),
            });
        }

        let total: f64 = generated
            .iter()
            .map(|e| cosine_similarity(original, e) as f64)
            .sum();
        Ok((total / generated.len() as f64).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedJudge;

    fn contexts() -> Vec<String> {
        vec!["Apollo 13 launched on April 11, 1970. An oxygen tank exploded two days later.".into()]
    }

    #[test]
    fn parse_judgement_strips_fences() {
        let raw = "Sure! ```json\n{\"statements\": [\"a\", \"b\"]}\n```";
        let parsed: Statements = parse_judgement(raw).unwrap();
        assert_eq!(parsed.statements, vec!["a", "b"]);
    }

    #[test]
    fn parse_judgement_rejects_prose() {
        let err = parse_judgement::<Statements>("I cannot help with that.").unwrap_err();
        assert!(matches!(err, EvaluationError::MalformedJudgement(_)));
    }

    #[tokio::test]
    async fn faithfulness_is_supported_share() {
        let judge = Arc::new(ScriptedJudge::new(vec![
            r#"{"statements": ["Apollo 13 launched in 1970.", "An oxygen tank exploded.", "The crew landed on the Moon."]}"#,
            r#"{"verdicts": [{"statement": "a", "reason": "", "verdict": 1}, {"statement": "b", "reason": "", "verdict": 1}, {"statement": "c", "reason": "", "verdict": 0}]}"#,
        ]));
        let metric = Faithfulness::new(judge.clone(), "gpt-3.5-turbo");
        let ctx = contexts();
        let score = metric
            .score(&Sample::new("What happened?", "Launched 1970, tank exploded, landed.", &ctx))
            .await
            .unwrap();

        assert!((score - 2.0 / 3.0).abs() < 1e-9);
        let prompts = judge.prompts();
        assert!(prompts[1].contains("oxygen tank exploded two days later"));
        assert!(prompts[1].contains("3. The crew landed on the Moon."));
    }

    #[tokio::test]
    async fn faithfulness_without_statements_fails() {
        let judge = Arc::new(ScriptedJudge::new(vec![r#"{"statements": []}"#]));
        let metric = Faithfulness::new(judge, "gpt-3.5-turbo");
        let ctx = contexts();
        let err = metric.score(&Sample::new("q", "Hello!", &ctx)).await.unwrap_err();
        assert!(err.to_string().contains("no statements"));
    }

    #[tokio::test]
    async fn relevancy_is_mean_cosine() {
        let judge = Arc::new(
            ScriptedJudge::new(vec![r#"{"questions": ["q1", "q2"], "noncommittal": 0}"#])
                .with_embeddings(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]),
        );
        let metric = ResponseRelevancy::new(judge.clone(), "gpt-3.5-turbo", "text-embedding-3-small", 2);
        let ctx = contexts();
        let score = metric
            .score(&Sample::new("What happened to Apollo 13?", "An oxygen tank exploded.", &ctx))
            .await
            .unwrap();

        assert!((score - 0.5).abs() < 1e-6);
        assert_eq!(judge.embedded_inputs()[0], "What happened to Apollo 13?");
    }

    #[tokio::test]
    async fn relevancy_noncommittal_is_zero() {
        let judge = Arc::new(ScriptedJudge::new(vec![
            r#"{"questions": ["q1"], "noncommittal": 1}"#,
        ]));
        let metric = ResponseRelevancy::new(judge.clone(), "gpt-3.5-turbo", "text-embedding-3-small", 3);
        let ctx = contexts();
        let score = metric
            .score(&Sample::new("q", "I'm not sure.", &ctx))
            .await
            .unwrap();

        assert_eq!(score, 0.0);
        assert!(judge.embedded_inputs().is_empty());
    }

    #[tokio::test]
    async fn judge_failure_propagates() {
        let judge = Arc::new(ScriptedJudge::new(vec![]));
        let metric = Faithfulness::new(judge, "gpt-3.5-turbo");
        let ctx = contexts();
        let err = metric.score(&Sample::new("q", "a", &ctx)).await.unwrap_err();
        assert!(matches!(err, EvaluationError::MetricFailed { .. }));
    }
}
