//! `missionrag evaluate`: batch evaluation over a test question file.
//!
//! The report file is always written, including when no questions could be
//! loaded or the vector store could not be opened.

use std::path::Path;
use std::sync::Arc;

use missionrag_config::AppConfig;
use missionrag_core::provider::Provider;
use missionrag_evaluation::{
    BatchRunner, EvaluationReport, Progress, QualityScorer, load_test_questions,
};
use missionrag_rag::{AnswerGenerator, RagPipeline};

use super::{build_provider, load_config, open_store, preview};
use crate::EvaluateArgs;

const RULE: &str = "============================================================";

pub async fn run(args: EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.store)?;
    let provider = build_provider(&config)?;

    println!("{RULE}");
    println!("NASA RAG BATCH EVALUATION");
    println!("{RULE}");

    let report = build_report(&config, provider, &args.test_file).await;

    report.write_to(&args.output)?;
    println!("\nResults saved to {}", args.output.display());

    print_summary(&report);
    Ok(())
}

async fn build_report(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
    test_file: &Path,
) -> EvaluationReport {
    println!("Loading test questions from {}...", test_file.display());
    let items = load_test_questions(test_file);
    if items.is_empty() {
        return EvaluationReport::aborted(format!(
            "No test questions found in {}",
            test_file.display()
        ));
    }
    println!("Loaded {} test questions", items.len());

    let store = match &config.retrieval.chroma_url {
        Some(url) => url.clone(),
        None => config.retrieval.chroma_dir.display().to_string(),
    };
    println!("Initializing RAG system from {store}/{}...", config.retrieval.collection);

    let retriever = match open_store(config, provider.clone()).await {
        Ok(retriever) => retriever,
        Err(e) => {
            return EvaluationReport::aborted(format!("Failed to initialize RAG system: {e}"));
        }
    };
    println!("RAG system initialized successfully");

    let generator = AnswerGenerator::from_config(provider, config);
    let pipeline = Arc::new(RagPipeline::from_config(retriever, generator, config));
    let scorer = QualityScorer::from_config(config).map(Arc::new);

    BatchRunner::new(pipeline, scorer)
        .run_with_progress(&items, print_progress)
        .await
}

fn print_progress(progress: Progress<'_>) {
    match progress {
        Progress::Started {
            position,
            total,
            question,
        } => println!("\n[{position}/{total}] Processing: {}...", preview(question, 50)),
        Progress::Answered { answer } => println!("   Answer: {}...", preview(answer, 100)),
        Progress::Scored { scores } => {
            let line: Vec<String> = scores
                .numeric()
                .map(|(metric, score)| format!("{metric}={score:.3}"))
                .collect();
            println!("   Scores: {}", line.join(" "));
        }
        Progress::Failed { error } => println!("   Error: {error}"),
    }
}

fn print_summary(report: &EvaluationReport) {
    if let Some(error) = &report.error {
        println!("\nError: {error}");
    }

    if !report.aggregate_metrics.is_empty() {
        println!("\n{RULE}");
        println!("AGGREGATE METRICS");
        println!("{RULE}");
        for (metric, stat) in &report.aggregate_metrics {
            println!(
                "{metric}: mean={:.3}, min={:.3}, max={:.3} (n={})",
                stat.mean, stat.min, stat.max, stat.count
            );
        }
    }

    println!("\n{RULE}");
    println!("EVALUATION COMPLETE");
    println!("{RULE}");
    println!("Total questions: {}", report.total_questions);
    println!("Successful evaluations: {}", report.successful());
    println!("Failed evaluations: {}", report.failed());
}
