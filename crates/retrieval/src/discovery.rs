//! Vector store discovery.
//!
//! Scans a project directory for store directories (any sub-directory
//! whose name contains "chroma") and lists the collections inside each.
//! Failures never abort the scan: an unreadable directory shows up as an
//! `<dir>_error` entry instead.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::local::CollectionFile;

/// Display names carry at most this many characters of an error.
const ERROR_PREVIEW_CHARS: usize = 50;

/// Document count of a discovered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCount {
    Known(usize),
    Unknown,
}

impl Serialize for DocCount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DocCount::Known(n) => serializer.serialize_u64(*n as u64),
            DocCount::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl fmt::Display for DocCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocCount::Known(n) => write!(f, "{n}"),
            DocCount::Unknown => write!(f, "unknown"),
        }
    }
}

/// One selectable backend: a collection inside a store directory.
#[derive(Debug, Clone, Serialize)]
pub struct BackendInfo {
    pub directory: PathBuf,
    pub collection_name: String,
    pub display_name: String,
    pub doc_count: DocCount,
}

/// Discover all collections under `root`, keyed by `<dir>_<collection>`.
pub fn discover_backends(root: &Path) -> BTreeMap<String, BackendInfo> {
    let mut backends = BTreeMap::new();

    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "Cannot scan for vector stores");
            return backends;
        }
    };

    let mut store_dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && is_store_dir(path))
        .collect();
    store_dirs.sort();

    for dir in store_dirs {
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match list_collections(&dir) {
            Ok(collections) => {
                for (collection_name, doc_count) in collections {
                    backends.insert(
                        format!("{dir_name}_{collection_name}"),
                        BackendInfo {
                            directory: dir.clone(),
                            display_name: format!(
                                "{collection_name} ({doc_count} docs) - {dir_name}"
                            ),
                            collection_name,
                            doc_count,
                        },
                    );
                }
            }
            Err(e) => {
                let preview: String = e.to_string().chars().take(ERROR_PREVIEW_CHARS).collect();
                backends.insert(
                    format!("{dir_name}_error"),
                    BackendInfo {
                        directory: dir.clone(),
                        collection_name: "unknown".into(),
                        display_name: format!("Error: {preview}... - {dir_name}"),
                        doc_count: DocCount::Known(0),
                    },
                );
            }
        }
    }

    backends
}

fn is_store_dir(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().contains("chroma"))
        .unwrap_or(false)
}

/// Collections in a store directory with their chunk counts.
fn list_collections(dir: &Path) -> std::io::Result<Vec<(String, DocCount)>> {
    let mut collections = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        // Collections open by file stem, whatever name the file carries inside.
        let count = match CollectionFile::read(&path) {
            Ok(file) => DocCount::Known(file.chunks.len()),
            Err(_) => DocCount::Unknown,
        };
        collections.push((stem, count));
    }

    collections.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(collections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::{StoredChunk, collection_path};
    use missionrag_core::ChunkMetadata;

    fn write_collection(dir: &Path, name: &str, n: usize) {
        let file = CollectionFile {
            name: name.into(),
            embedding_model: None,
            chunks: (0..n)
                .map(|i| StoredChunk {
                    id: format!("c{i}"),
                    text: format!("chunk {i}"),
                    metadata: ChunkMetadata::default(),
                    embedding: vec![0.0, 1.0],
                })
                .collect(),
        };
        std::fs::write(collection_path(dir, name), serde_json::to_string(&file).unwrap()).unwrap();
    }

    #[test]
    fn discovers_collections_in_chroma_dirs() {
        let root = tempfile::tempdir().unwrap();
        let store = root.path().join("chroma_db_openai");
        std::fs::create_dir(&store).unwrap();
        write_collection(&store, "nasa_space_missions_text", 3);
        std::fs::create_dir(root.path().join("notes")).unwrap();

        let backends = discover_backends(root.path());
        assert_eq!(backends.len(), 1);

        let info = &backends["chroma_db_openai_nasa_space_missions_text"];
        assert_eq!(info.collection_name, "nasa_space_missions_text");
        assert_eq!(info.doc_count, DocCount::Known(3));
        assert_eq!(
            info.display_name,
            "nasa_space_missions_text (3 docs) - chroma_db_openai"
        );
    }

    #[test]
    fn directory_match_is_case_insensitive() {
        let root = tempfile::tempdir().unwrap();
        let store = root.path().join("MyChromaStore");
        std::fs::create_dir(&store).unwrap();
        write_collection(&store, "missions", 1);

        let backends = discover_backends(root.path());
        assert!(backends.contains_key("MyChromaStore_missions"));
    }

    #[test]
    fn unreadable_collection_has_unknown_count() {
        let root = tempfile::tempdir().unwrap();
        let store = root.path().join("chroma");
        std::fs::create_dir(&store).unwrap();
        std::fs::write(store.join("broken.json"), "][").unwrap();

        let backends = discover_backends(root.path());
        let info = &backends["chroma_broken"];
        assert_eq!(info.doc_count, DocCount::Unknown);
        assert!(info.display_name.contains("unknown docs"));
    }

    #[test]
    fn listed_name_is_the_openable_file_stem() {
        let root = tempfile::tempdir().unwrap();
        let store = root.path().join("chroma_db_openai");
        std::fs::create_dir(&store).unwrap();
        write_collection(&store, "missions", 2);
        let renamed = CollectionFile {
            name: "legacy_name".into(),
            ..CollectionFile::read(&collection_path(&store, "missions")).unwrap()
        };
        std::fs::write(
            collection_path(&store, "missions"),
            serde_json::to_string(&renamed).unwrap(),
        )
        .unwrap();

        let backends = discover_backends(root.path());
        let info = &backends["chroma_db_openai_missions"];
        assert_eq!(info.collection_name, "missions");
        assert!(collection_path(&store, &info.collection_name).exists());
    }

    #[test]
    fn missing_root_yields_nothing() {
        let backends = discover_backends(Path::new("/nonexistent/project"));
        assert!(backends.is_empty());
    }

    #[test]
    fn doc_count_serialization() {
        assert_eq!(serde_json::to_string(&DocCount::Known(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&DocCount::Unknown).unwrap(), "\"unknown\"");
    }
}
