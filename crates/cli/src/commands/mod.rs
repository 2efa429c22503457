//! CLI command implementations.

pub mod ask;
pub mod backends;
pub mod evaluate;
pub mod score;

use std::sync::Arc;

use missionrag_config::AppConfig;
use missionrag_core::Retriever;
use missionrag_core::error::RetrievalError;
use missionrag_core::provider::Provider;
use missionrag_providers::OpenAiCompatProvider;
use missionrag_retrieval::{QueryEmbedder, StoreLocation, open_retriever};

use crate::StoreArgs;

/// Load the config file and environment, then apply command-line overrides.
pub fn load_config(args: &StoreArgs) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut AppConfig, args: &StoreArgs) {
    if let Some(key) = &args.openai_key {
        config.api_key = Some(key.clone());
    }
    if let Some(dir) = &args.chroma_dir {
        config.retrieval.chroma_dir = dir.clone();
    }
    if let Some(url) = &args.chroma_url {
        config.retrieval.chroma_url = Some(url.clone());
    }
    if let Some(collection) = &args.collection_name {
        config.retrieval.collection = collection.clone();
    }
    if let Some(n) = args.n_results {
        config.retrieval.n_results = n;
    }
    if let Some(model) = &args.model {
        config.default_model = model.clone();
    }
}

/// The chat/embedding provider. Refuses to start without an API key.
pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    match OpenAiCompatProvider::from_config(config) {
        Some(provider) => Ok(Arc::new(provider)),
        None => {
            print_key_setup();
            Err("No API key found. See above for setup instructions.".into())
        }
    }
}

fn print_key_setup() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Pass --openai-key or set one of these environment variables:");
    eprintln!("    OPENAI_API_KEY, CHROMA_OPENAI_API_KEY, MISSIONRAG_API_KEY");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", config_path().display());
    eprintln!();
}

/// Open the configured collection. A Chroma URL wins over the directory.
pub async fn open_store(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
) -> Result<Arc<dyn Retriever>, RetrievalError> {
    let embedder = QueryEmbedder::new(provider, &config.retrieval.embedding_model);
    let location = match &config.retrieval.chroma_url {
        Some(url) => StoreLocation::Server(url),
        None => StoreLocation::Directory(&config.retrieval.chroma_dir),
    };
    open_retriever(location, &config.retrieval.collection, embedder).await
}

fn config_path() -> std::path::PathBuf {
    AppConfig::config_dir().join("config.toml")
}

/// First `max` characters of `text`.
pub fn preview(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn overrides_replace_config_values() {
        let mut config = AppConfig::default();
        let args = StoreArgs {
            openai_key: Some("sk-flag".into()),
            chroma_dir: Some(PathBuf::from("/data/chroma")),
            n_results: Some(7),
            model: Some("gpt-4o".into()),
            ..StoreArgs::default()
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.api_key.as_deref(), Some("sk-flag"));
        assert_eq!(config.retrieval.chroma_dir, PathBuf::from("/data/chroma"));
        assert_eq!(config.retrieval.n_results, 7);
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.retrieval.collection, "nasa_space_missions_text");
    }

    #[test]
    fn provider_requires_api_key() {
        let mut config = AppConfig::default();
        config.api_key = None;
        assert!(build_provider(&config).is_err());

        config.api_key = Some("sk-test".into());
        assert_eq!(build_provider(&config).unwrap().name(), "openai");
    }

    #[test]
    fn preview_counts_characters() {
        assert_eq!(preview("Hüston, we have a problem", 6), "Hüston");
        assert_eq!(preview("short", 50), "short");
    }
}
