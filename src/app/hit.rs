use crate::tree::{CharacterClass, DRAW_ORDER, Node, NodeKind, TreeGraph};

use super::visibility::node_visible;

/// World-space diameters per node kind; the hit radius is half of this.
/// The same table sizes the drawn artwork so hits and pixels agree.
pub fn hit_diameter(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Keystone => 109.0,
        NodeKind::Notable => 84.0,
        NodeKind::Ascendancy | NodeKind::Bloodline => 80.0,
        NodeKind::Mastery | NodeKind::Jewel => 70.0,
        NodeKind::ClassStart => 60.0,
        NodeKind::Normal => 51.0,
        NodeKind::Root => 0.0,
    }
}

/// Topmost eligible node under a world-space point, or `None`. Kinds drawn
/// later win on overlap, so the draw order is walked in reverse.
pub fn node_at<'a>(
    graph: &'a TreeGraph,
    class: Option<&CharacterClass>,
    world_x: f32,
    world_y: f32,
) -> Option<&'a Node> {
    for kind in DRAW_ORDER.iter().rev() {
        let radius = hit_diameter(*kind) / 2.0;
        if radius <= 0.0 {
            continue;
        }
        let radius_sq = radius * radius;

        let hit = graph
            .nodes_of_kind(*kind)
            .filter(|node| node_visible(node, class))
            .filter_map(|node| {
                let dx = node.x - world_x;
                let dy = node.y - world_y;
                let distance_sq = dx * dx + dy * dy;
                (distance_sq <= radius_sq).then_some((node, distance_sq))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((node, _)) = hit {
            return Some(node);
        }
    }
    None
}
