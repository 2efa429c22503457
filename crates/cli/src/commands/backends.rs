//! `missionrag backends`: list the vector stores found under a directory.

use std::path::PathBuf;

use missionrag_retrieval::discover_backends;

pub async fn run(root: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let backends = discover_backends(&root);

    if json {
        println!("{}", serde_json::to_string_pretty(&backends)?);
        return Ok(());
    }

    if backends.is_empty() {
        println!("No vector stores found under {}", root.display());
        println!("Store directories must have \"chroma\" in their name.");
        return Ok(());
    }

    println!("🛰  Available vector stores");
    println!("==========================");
    println!();
    for (key, info) in &backends {
        println!("  {key}");
        println!("    {}", info.display_name);
        println!("    directory: {}", info.directory.display());
    }

    Ok(())
}
