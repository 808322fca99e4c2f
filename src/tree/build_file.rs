use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::model::NodeId;

/// The load/save round trip exchanged with the persistence side: the class
/// name plus the allocated node ids, nothing else.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SavedBuild {
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeId>,
}

pub fn load_build(path: &Path) -> Result<SavedBuild> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read build file {}", path.display()))?;
    serde_json::from_str(&raw).context("invalid build file JSON")
}

pub fn save_build(path: &Path, build: &SavedBuild) -> Result<()> {
    let raw = serde_json::to_string_pretty(build).context("failed to encode build file")?;
    fs::write(path, raw).with_context(|| format!("failed to write build file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.json");

        let build = SavedBuild {
            class: Some("Witch".to_string()),
            nodes: vec![3, 1, 2],
        };
        save_build(&path, &build).unwrap();

        let loaded = load_build(&path).unwrap();
        assert_eq!(loaded.class.as_deref(), Some("Witch"));
        assert_eq!(loaded.nodes, vec![3, 1, 2]);
    }

    #[test]
    fn tolerates_missing_fields() {
        let build: SavedBuild = serde_json::from_str("{}").unwrap();
        assert!(build.class.is_none());
        assert!(build.nodes.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_build(Path::new("/nonexistent/build.json")).is_err());
    }
}
