use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

pub fn fallback_orbit_radii() -> Vec<f32> {
    vec![0.0, 82.0, 162.0, 335.0, 493.0, 662.0, 846.0]
}

pub fn fallback_skills_per_orbit() -> Vec<u32> {
    vec![1, 6, 12, 12, 40, 72, 72]
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawTreeDataset {
    pub groups: HashMap<String, RawGroup>,
    pub nodes: HashMap<String, RawNode>,
    #[serde(default)]
    pub constants: TreeConstants,
    #[serde(default)]
    pub sprites: HashMap<String, SpriteDef>,
}

impl RawTreeDataset {
    pub fn group_of(&self, node: &RawNode) -> Option<&RawGroup> {
        let group_id = node.group.as_ref()?;
        self.groups.get(&group_id.key())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawGroup {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub orbits: Vec<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawNode {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stats: Vec<String>,
    #[serde(default)]
    pub group: Option<RawId>,
    #[serde(default)]
    pub orbit: usize,
    #[serde(default, rename = "orbitIndex")]
    pub orbit_index: usize,
    #[serde(default)]
    pub out: Vec<RawId>,
    #[serde(default, rename = "isRoot")]
    pub is_root: bool,
    #[serde(default, rename = "isKeystone")]
    pub is_keystone: bool,
    #[serde(default, rename = "isNotable")]
    pub is_notable: bool,
    #[serde(default, rename = "isMastery")]
    pub is_mastery: bool,
    #[serde(default, rename = "isJewelSocket")]
    pub is_jewel_socket: bool,
    #[serde(default, rename = "isBloodline")]
    pub is_bloodline: bool,
    #[serde(default, rename = "ascendancyName")]
    pub ascendancy_name: Option<String>,
    #[serde(default, rename = "classStartIndex")]
    pub class_start_index: Option<u32>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Node and group references appear both as JSON numbers and as strings
/// depending on the dataset vintage.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Number(value) => u32::try_from(*value).ok(),
            Self::Text(value) => value.trim().parse::<u32>().ok(),
        }
    }

    pub fn key(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TreeConstants {
    #[serde(default = "fallback_orbit_radii", rename = "orbitRadii")]
    pub orbit_radii: Vec<f32>,
    #[serde(default = "fallback_skills_per_orbit", rename = "skillsPerOrbit")]
    pub skills_per_orbit: Vec<u32>,
}

impl Default for TreeConstants {
    fn default() -> Self {
        Self {
            orbit_radii: fallback_orbit_radii(),
            skills_per_orbit: fallback_skills_per_orbit(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpriteDef {
    pub sheet: String,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

pub fn parse_dataset(raw: &str) -> Result<RawTreeDataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid tree dataset JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for tree dataset"))?;

    for required in ["nodes", "groups"] {
        if !object.contains_key(required) {
            return Err(anyhow!("tree dataset is missing the `{required}` table"));
        }
    }

    RawTreeDataset::deserialize(&parsed).context("malformed tree dataset")
}

pub fn load_dataset(path: &Path) -> Result<RawTreeDataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read tree dataset from {}", path.display()))?;
    parse_dataset(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dataset_without_groups() {
        let error = parse_dataset(r#"{"nodes": {}}"#).unwrap_err();
        assert!(error.to_string().contains("groups"));
    }

    #[test]
    fn rejects_dataset_without_nodes() {
        let error = parse_dataset(r#"{"groups": {}}"#).unwrap_err();
        assert!(error.to_string().contains("nodes"));
    }

    #[test]
    fn rejects_non_object_dataset() {
        assert!(parse_dataset("[1, 2, 3]").is_err());
        assert!(parse_dataset("not json").is_err());
    }

    #[test]
    fn missing_constants_fall_back_to_documented_tables() {
        let dataset = parse_dataset(r#"{"groups": {}, "nodes": {}}"#).unwrap();
        assert_eq!(dataset.constants.orbit_radii[1], 82.0);
        assert_eq!(dataset.constants.skills_per_orbit[1], 6);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dataset = parse_dataset(
            r#"{
                "groups": {"1": {"x": 3.0, "y": -4.0, "futureField": true}},
                "nodes": {"10": {"name": "A", "group": 1, "legacyBlob": [1, 2]}},
                "extraTopLevel": {"ignored": true}
            }"#,
        )
        .unwrap();
        assert_eq!(dataset.groups.len(), 1);
        assert_eq!(dataset.nodes["10"].name, "A");
    }

    #[test]
    fn id_references_accept_numbers_and_strings() {
        let dataset = parse_dataset(
            r#"{
                "groups": {},
                "nodes": {"1": {"out": [2, "3", "bogus"]}}
            }"#,
        )
        .unwrap();
        let out = &dataset.nodes["1"].out;
        assert_eq!(out[0].as_u32(), Some(2));
        assert_eq!(out[1].as_u32(), Some(3));
        assert_eq!(out[2].as_u32(), None);
    }
}
