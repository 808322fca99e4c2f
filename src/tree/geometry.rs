use std::collections::HashMap;

use crate::util::parse_node_key;

use super::dataset::{RawNode, RawTreeDataset};

/// Converts the dataset's group/orbit/orbit-index encoding into world
/// coordinates. Pure: two calls on the same dataset produce identical maps.
pub fn compute_layout(dataset: &RawTreeDataset) -> HashMap<u32, (f32, f32)> {
    let mut layout = HashMap::with_capacity(dataset.nodes.len());
    for (key, raw) in &dataset.nodes {
        let Some(id) = parse_node_key(key) else {
            continue;
        };
        layout.insert(id, node_position(dataset, raw));
    }
    layout
}

fn node_position(dataset: &RawTreeDataset, raw: &RawNode) -> (f32, f32) {
    let Some(group) = dataset.group_of(raw) else {
        return (0.0, 0.0);
    };

    if raw.orbit == 0 {
        return (group.x, group.y);
    }

    let radius = dataset
        .constants
        .orbit_radii
        .get(raw.orbit)
        .copied()
        .unwrap_or(0.0);
    let slots = dataset
        .constants
        .skills_per_orbit
        .get(raw.orbit)
        .copied()
        .unwrap_or(1)
        .max(1);

    // Angle 0 points straight up in screen coordinates, hence the -cos term.
    let angle = std::f32::consts::TAU * raw.orbit_index as f32 / slots as f32;
    (
        group.x + radius * angle.sin(),
        group.y - radius * angle.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::dataset::parse_dataset;

    fn two_group_dataset() -> RawTreeDataset {
        parse_dataset(
            r#"{
                "groups": {
                    "0": {"x": 0.0, "y": 0.0},
                    "1": {"x": 100.0, "y": 0.0}
                },
                "nodes": {
                    "1": {"name": "Start", "group": 0, "orbit": 0, "classStartIndex": 0},
                    "2": {"name": "Edge", "group": 1, "orbit": 1, "orbitIndex": 0, "isNotable": true}
                },
                "constants": {
                    "orbitRadii": [0.0, 82.0],
                    "skillsPerOrbit": [1, 6]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn layout_is_deterministic() {
        let dataset = two_group_dataset();
        assert_eq!(compute_layout(&dataset), compute_layout(&dataset));
    }

    #[test]
    fn orbit_zero_sits_on_the_group_anchor() {
        let dataset = two_group_dataset();
        let layout = compute_layout(&dataset);
        assert_eq!(layout[&1], (0.0, 0.0));
    }

    #[test]
    fn orbit_offset_points_up_at_index_zero() {
        let dataset = two_group_dataset();
        let layout = compute_layout(&dataset);
        // group (100, 0), orbit 1 radius 82, index 0 of 6 -> offset (0, -82)
        assert_eq!(layout[&2], (100.0, -82.0));
    }

    #[test]
    fn quarter_turn_lands_on_the_positive_x_axis() {
        let dataset = parse_dataset(
            r#"{
                "groups": {"5": {"x": 10.0, "y": 20.0}},
                "nodes": {"7": {"group": 5, "orbit": 1, "orbitIndex": 1}},
                "constants": {"orbitRadii": [0.0, 40.0], "skillsPerOrbit": [1, 4]}
            }"#,
        )
        .unwrap();
        let (x, y) = compute_layout(&dataset)[&7];
        assert!((x - 50.0).abs() < 1e-3);
        assert!((y - 20.0).abs() < 1e-3);
    }

    #[test]
    fn missing_group_falls_back_to_origin() {
        let dataset = parse_dataset(
            r#"{
                "groups": {},
                "nodes": {"3": {"group": 99, "orbit": 2, "orbitIndex": 4}}
            }"#,
        )
        .unwrap();
        assert_eq!(compute_layout(&dataset)[&3], (0.0, 0.0));
    }

    #[test]
    fn out_of_range_orbit_collapses_to_the_anchor() {
        let dataset = parse_dataset(
            r#"{
                "groups": {"1": {"x": 7.0, "y": 9.0}},
                "nodes": {"4": {"group": 1, "orbit": 30, "orbitIndex": 2}}
            }"#,
        )
        .unwrap();
        // radius fallback 0 and slot fallback 1 degenerate the offset to (0, 0)
        let (x, y) = compute_layout(&dataset)[&4];
        assert!((x - 7.0).abs() < 1e-3);
        assert!((y - 9.0).abs() < 1e-3);
    }
}
