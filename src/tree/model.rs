use std::collections::HashMap;

use tracing::warn;

use crate::util::parse_node_key;

use super::dataset::{RawNode, RawTreeDataset, SpriteDef};
use super::geometry::compute_layout;

pub type NodeId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    ClassStart,
    Keystone,
    Notable,
    Mastery,
    Jewel,
    Ascendancy,
    Bloodline,
    Normal,
}

/// Base-layer paint order; hit testing walks it back to front.
pub const DRAW_ORDER: [NodeKind; 9] = [
    NodeKind::Root,
    NodeKind::Normal,
    NodeKind::Notable,
    NodeKind::Mastery,
    NodeKind::Jewel,
    NodeKind::Keystone,
    NodeKind::Ascendancy,
    NodeKind::Bloodline,
    NodeKind::ClassStart,
];

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::ClassStart => "class start",
            Self::Keystone => "keystone",
            Self::Notable => "notable",
            Self::Mastery => "mastery",
            Self::Jewel => "jewel socket",
            Self::Ascendancy => "ascendancy",
            Self::Bloodline => "bloodline",
            Self::Normal => "passive",
        }
    }

    fn classify(raw: &RawNode) -> Self {
        // Fixed precedence: a node carrying several flags keeps the first match.
        if raw.is_root {
            Self::Root
        } else if raw.is_keystone {
            Self::Keystone
        } else if raw.is_mastery {
            Self::Mastery
        } else if raw.is_jewel_socket {
            Self::Jewel
        } else if raw.is_notable {
            Self::Notable
        } else if raw.is_bloodline {
            Self::Bloodline
        } else if raw.ascendancy_name.is_some() {
            Self::Ascendancy
        } else if raw.class_start_index.is_some() {
            Self::ClassStart
        } else {
            Self::Normal
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub stats: Vec<String>,
    pub x: f32,
    pub y: f32,
    pub orbit: usize,
    pub orbit_index: usize,
    pub ascendancy_name: Option<String>,
    pub class_start_index: Option<u32>,
    pub icon: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct TreeGraph {
    pub nodes: HashMap<NodeId, Node>,
    pub connections: Vec<Connection>,
    pub sprites: HashMap<String, SpriteDef>,
}

impl TreeGraph {
    /// Rebuilds the whole model from a raw dataset. Dangling connection
    /// targets are dropped; reciprocal edge pairs are kept as two records.
    pub fn build(dataset: &RawTreeDataset) -> Self {
        let layout = compute_layout(dataset);
        let mut nodes = HashMap::with_capacity(dataset.nodes.len());
        let mut skipped_keys = 0usize;

        for (key, raw) in &dataset.nodes {
            let Some(id) = parse_node_key(key) else {
                skipped_keys += 1;
                continue;
            };
            let (x, y) = layout.get(&id).copied().unwrap_or((0.0, 0.0));
            nodes.insert(
                id,
                Node {
                    id,
                    name: raw.name.clone(),
                    kind: NodeKind::classify(raw),
                    stats: raw.stats.clone(),
                    x,
                    y,
                    orbit: raw.orbit,
                    orbit_index: raw.orbit_index,
                    ascendancy_name: raw.ascendancy_name.clone(),
                    class_start_index: raw.class_start_index,
                    icon: raw.icon.clone(),
                },
            );
        }

        let mut connections = Vec::new();
        let mut dangling = 0usize;
        for (key, raw) in &dataset.nodes {
            let Some(source) = parse_node_key(key) else {
                continue;
            };
            for target_ref in &raw.out {
                match target_ref.as_u32() {
                    Some(target) if nodes.contains_key(&target) => {
                        connections.push(Connection { source, target });
                    }
                    _ => dangling += 1,
                }
            }
        }

        if skipped_keys > 0 {
            warn!(skipped_keys, "ignored nodes with non-numeric ids");
        }
        if dangling > 0 {
            warn!(dangling, "dropped connections to missing nodes");
        }

        Self {
            nodes,
            connections,
            sprites: dataset.sprites.clone(),
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut iter = self.nodes.values();
        let first = iter.next()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for node in iter {
            bounds.min_x = bounds.min_x.min(node.x);
            bounds.min_y = bounds.min_y.min(node.y);
            bounds.max_x = bounds.max_x.max(node.x);
            bounds.max_y = bounds.max_y.max(node.y);
        }
        Some(bounds)
    }

    pub fn class_start_node(&self, start_index: u32) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| {
                node.kind == NodeKind::ClassStart && node.class_start_index == Some(start_index)
            })
            .map(|node| node.id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |node| node.kind == kind)
    }
}
