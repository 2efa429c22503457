//! Lexical overlap metrics against a reference text.
//!
//! Both tokenize the same way: lower-cased alphanumeric runs.

use async_trait::async_trait;
use missionrag_core::error::EvaluationError;
use std::collections::HashMap;

use super::{Metric, Sample};
use crate::scores::{BLEU_SCORE, ROUGE_SCORE};

const MAX_NGRAM: usize = 4;

pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

/// Sentence BLEU, uniform weights up to 4-grams.
///
/// Higher-order precisions use add-one smoothing so a short answer with no
/// 4-gram overlap does not collapse to zero; unigram precision is unsmoothed.
#[derive(Debug, Default, Clone, Copy)]
pub struct BleuScore;

impl BleuScore {
    pub fn compute(candidate: &str, reference: &str) -> f64 {
        let cand = tokenize(candidate);
        let refr = tokenize(reference);
        if cand.is_empty() || refr.is_empty() {
            return 0.0;
        }

        let mut log_sum = 0.0;
        for n in 1..=MAX_NGRAM {
            let cand_counts = ngram_counts(&cand, n);
            let ref_counts = ngram_counts(&refr, n);

            let total: usize = cand_counts.values().sum();
            let matched: usize = cand_counts
                .iter()
                .map(|(gram, count)| (*count).min(ref_counts.get(gram).copied().unwrap_or(0)))
                .sum();

            let precision = if n == 1 {
                if matched == 0 {
                    return 0.0;
                }
                matched as f64 / total as f64
            } else {
                (matched + 1) as f64 / (total + 1) as f64
            };
            log_sum += precision.ln();
        }

        let c = cand.len() as f64;
        let r = refr.len() as f64;
        let brevity = if c > r { 1.0 } else { (1.0 - r / c).exp() };

        (brevity * (log_sum / MAX_NGRAM as f64).exp()).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl Metric for BleuScore {
    fn name(&self) -> &'static str {
        BLEU_SCORE
    }

    async fn score(&self, sample: &Sample<'_>) -> Result<f64, EvaluationError> {
        let reference = sample.require_reference(BLEU_SCORE)?;
        Ok(Self::compute(sample.answer, reference))
    }
}

/// ROUGE-L F-measure over word tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct RougeScore;

impl RougeScore {
    pub fn compute(candidate: &str, reference: &str) -> f64 {
        let cand = tokenize(candidate);
        let refr = tokenize(reference);
        let lcs = lcs_len(&cand, &refr);
        if lcs == 0 {
            return 0.0;
        }

        let precision = lcs as f64 / cand.len() as f64;
        let recall = lcs as f64 / refr.len() as f64;
        2.0 * precision * recall / (precision + recall)
    }
}

#[async_trait]
impl Metric for RougeScore {
    fn name(&self) -> &'static str {
        ROUGE_SCORE
    }

    async fn score(&self, sample: &Sample<'_>) -> Result<f64, EvaluationError> {
        let reference = sample.require_reference(ROUGE_SCORE)?;
        Ok(Self::compute(sample.answer, reference))
    }
}

/// Longest common subsequence length, two-row DP.
fn lcs_len(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
