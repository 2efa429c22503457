//! `missionrag ask`: interactive question answering.
//!
//! Each turn retrieves fresh documents; the chat history sent along is
//! windowed by the generator. `/mission <name>` changes the mission filter,
//! `/mission all` clears it.

use std::io::Write;
use std::sync::Arc;

use missionrag_core::message::{Conversation, Message};
use missionrag_evaluation::QualityScorer;
use missionrag_rag::{AnswerGenerator, RagPipeline};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use super::{build_provider, load_config, open_store};
use crate::AskArgs;

const BANNER: [&str; 3] = [
    "╔══════════════════════════════════════════════╗",
    "║    NASA Mission Expert - Interactive Mode    ║",
    "╚══════════════════════════════════════════════╝",
];

pub async fn run(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.store)?;

    let provider = build_provider(&config)?;
    let retriever = open_store(&config, provider.clone())
        .await
        .map_err(|e| format!("Failed to initialize RAG system: {e}"))?;
    let doc_count = retriever
        .count()
        .await
        .map(|n| n.to_string())
        .unwrap_or_else(|_| "unknown".into());

    let generator = AnswerGenerator::from_config(provider, &config);
    let pipeline = RagPipeline::from_config(retriever, generator, &config);
    let scorer = if args.score {
        QualityScorer::from_config(&config).map(Arc::new)
    } else {
        None
    };
    let mut mission = args.mission.clone();

    println!();
    for line in BANNER {
        println!("  {line}");
    }
    println!();
    println!("  Model:       {}", pipeline.model());
    println!("  Collection:  {} ({doc_count} docs)", config.retrieval.collection);
    println!("  Mission:     {}", mission.as_deref().unwrap_or("all"));
    println!("  Scoring:     {}", if scorer.is_some() { "on" } else { "off" });
    println!();
    println!("  Type your question and press Enter.");
    println!("  '/mission <name>' filters documents, 'exit' quits.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut conversation = Conversation::new();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        if let Some(name) = question.strip_prefix("/mission") {
            let name = name.trim();
            mission = (!name.is_empty() && name != "all").then(|| name.to_string());
            println!("  Mission filter: {}", mission.as_deref().unwrap_or("all"));
            continue;
        }

        eprint!("  Searching...");
        let rag = pipeline
            .answer(question, mission.as_deref(), &conversation.messages)
            .await;
        eprint!("\r             \r");

        let answer = rag.answer.text();
        println!();
        for line in answer.lines() {
            println!("  Assistant > {line}");
        }
        println!("  ({} documents retrieved)", rag.chunks.len());

        if let Some(scorer) = &scorer {
            let scores = scorer.score(question, &answer, &rag.contexts()).await;
            match scores.error() {
                Some(error) => println!("  Scores: {error}"),
                None => {
                    let line: Vec<String> = scores
                        .numeric()
                        .map(|(metric, score)| format!("{metric}={score:.3}"))
                        .collect();
                    println!("  Scores: {}", line.join(" "));
                }
            }
        }
        println!();

        conversation.push(Message::user(question));
        conversation.push(Message::assistant(answer));
    }

    println!("  Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_frame_is_aligned() {
        let widths: Vec<usize> = BANNER.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]), "{widths:?}");
        assert!(BANNER.iter().all(|l| !l.contains('\u{2014}')));
    }
}
