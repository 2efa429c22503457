//! `missionrag score`: score answers generated elsewhere.

use std::path::Path;

use missionrag_config::AppConfig;
use missionrag_evaluation::{
    AnswerScoreReport, Progress, QualityScorer, load_answered_items, score_answers,
};

use super::{build_provider, load_config, preview};
use crate::{ScoreArgs, StoreArgs};

pub async fn run(args: ScoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&StoreArgs {
        openai_key: args.openai_key.clone(),
        ..StoreArgs::default()
    })?;
    let scorer = scorer(&config)?;

    println!("Loading answers from {}...", args.input.display());
    let report = build_report(&scorer, &args.input).await;

    report.write_to(&args.output)?;
    println!("\nResults saved to {}", args.output.display());

    if let Some(error) = &report.error {
        println!("Error: {error}");
    }
    for (metric, stat) in &report.aggregate_metrics {
        println!(
            "{metric}: mean={:.3}, min={:.3}, max={:.3} (n={})",
            stat.mean, stat.min, stat.max, stat.count
        );
    }
    println!(
        "Scored: {}, skipped: {}",
        report.successful(),
        report.failed()
    );
    Ok(())
}

fn scorer(config: &AppConfig) -> Result<QualityScorer, Box<dyn std::error::Error>> {
    let provider = build_provider(config)?;
    Ok(QualityScorer::new(provider, &config.evaluation))
}

async fn build_report(scorer: &QualityScorer, input: &Path) -> AnswerScoreReport {
    let items = load_answered_items(input);
    score_answers(Some(scorer), &items, |progress| match progress {
        Progress::Started {
            position,
            total,
            question,
        } => println!("[{position}/{total}] Scoring: {}...", preview(question, 50)),
        Progress::Failed { error } => println!("   Skipped: {error}"),
        Progress::Answered { .. } | Progress::Scored { .. } => {}
    })
    .await
}
