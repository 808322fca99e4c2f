use crate::tree::{CharacterClass, Node, NodeKind};

/// Single eligibility rule consulted by both the scene renderer and the hit
/// tester, so the two never disagree about what is clickable.
pub fn node_visible(node: &Node, class: Option<&CharacterClass>) -> bool {
    match node.kind {
        NodeKind::Ascendancy => match class {
            Some(class) => node
                .ascendancy_name
                .as_deref()
                .is_some_and(|name| class.allows_ascendancy(name)),
            None => false,
        },
        NodeKind::Bloodline => class.is_some(),
        _ => true,
    }
}

pub fn connection_visible(a: &Node, b: &Node, class: Option<&CharacterClass>) -> bool {
    node_visible(a, class) && node_visible(b, class)
}
