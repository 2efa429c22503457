//! Test question files.
//!
//! - `.json`: an array of `{ "question", "category"?, "mission"?, ... }`;
//!   a null or non-string field reads as absent
//! - `.txt`: one question per line; blank lines and `#` comments skipped
//!
//! Anything unreadable yields an empty list, which the batch runner turns
//! into a "no test questions" report.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TestItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient_option")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub mission: Option<String>,
}

/// Strings pass through; anything else is treated as missing.
pub(crate) fn lenient_option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_option(d)?.unwrap_or_default())
}

impl TestItem {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }
}

pub fn load_test_questions(path: &Path) -> Vec<TestItem> {
    if !path.exists() {
        debug!(path = %path.display(), "Test question file not found");
        return Vec::new();
    }

    let result = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => read_json(path),
        Some("txt") => read_txt(path),
        _ => {
            warn!(path = %path.display(), "Unsupported test question format");
            return Vec::new();
        }
    };

    result.unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Error loading test questions");
        Vec::new()
    })
}

fn read_json(path: &Path) -> missionrag_core::Result<Vec<TestItem>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn read_txt(path: &Path) -> missionrag_core::Result<Vec<TestItem>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(TestItem::new)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "test_questions.json",
            r#"[
                {"question": "What happened to Apollo 13?", "category": "incident", "mission": "apollo_13", "expected": "ignored"},
                {"question": "Who commanded Apollo 11?"},
                {"category": "orphan"}
            ]"#,
        );

        let items = load_test_questions(&path);
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            TestItem {
                category: Some("incident".into()),
                ..TestItem::new("What happened to Apollo 13?").with_mission("apollo_13")
            }
        );
        assert_eq!(items[1].mission, None);
        assert_eq!(items[2].question, "");
    }

    #[test]
    fn null_question_becomes_empty_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "test_questions.json",
            r#"[
                {"question": "What happened to Apollo 13?"},
                {"question": null, "category": null},
                {"question": 42, "mission": ["apollo_11"]},
                {"question": "Who flew Apollo 11?", "category": 7}
            ]"#,
        );

        let items = load_test_questions(&path);
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].question, "What happened to Apollo 13?");
        assert_eq!(items[1], TestItem::default());
        assert_eq!(items[2], TestItem::default());
        assert_eq!(items[3], TestItem::new("Who flew Apollo 11?"));
    }

    #[test]
    fn loads_txt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "questions.txt",
            "# Apollo questions\nWhat was the Saturn V?\n\n   \n  Why did Challenger fail?  \n",
        );

        let items = load_test_questions(&path);
        assert_eq!(
            items,
            vec![TestItem::new("What was the Saturn V?"), TestItem::new("Why did Challenger fail?")]
        );
    }

    #[test]
    fn missing_file_is_empty() {
        assert!(load_test_questions(Path::new("/nonexistent/test_questions.json")).is_empty());
    }

    #[test]
    fn unknown_extension_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "questions.csv", "question\nWhat is a LEM?\n");
        assert!(load_test_questions(&path).is_empty());
    }

    #[test]
    fn malformed_json_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "broken.json", "[{\"question\": ");
        assert!(load_test_questions(&path).is_empty());
    }
}
