use std::collections::HashSet;

use tracing::warn;

use crate::tree::{ClassId, NodeId, NodeKind, TreeGraph};

/// Allocated node set plus the class selection. Mutations only bump
/// `revision`; redrawing is the scene renderer's business.
#[derive(Clone, Debug, Default)]
pub struct AllocationState {
    allocated: HashSet<NodeId>,
    selected_class: Option<ClassId>,
    revision: u64,
}

impl AllocationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_allocated(&self, id: NodeId) -> bool {
        self.allocated.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.allocated.len()
    }

    pub fn selected_class(&self) -> Option<ClassId> {
        self.selected_class
    }

    pub fn allocated_ids(&self) -> Vec<NodeId> {
        let mut ids = self.allocated.iter().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    /// No connectivity rule is applied here: any node may be toggled on its
    /// own, matching the reference behavior.
    pub fn toggle(&mut self, id: NodeId) {
        if !self.allocated.remove(&id) {
            self.allocated.insert(id);
        }
        self.bump();
    }

    pub fn select_class(&mut self, graph: &TreeGraph, class: ClassId) {
        let previous = self.selected_class;

        if previous.is_some() && previous != Some(class) {
            let data = class.data();
            self.allocated.retain(|id| match graph.nodes.get(id) {
                Some(node) => match node.kind {
                    NodeKind::Bloodline => false,
                    NodeKind::Ascendancy => node
                        .ascendancy_name
                        .as_deref()
                        .is_some_and(|name| data.allows_ascendancy(name)),
                    _ => true,
                },
                None => false,
            });
        }

        match graph.class_start_node(class.data().start_index) {
            Some(start) => {
                self.allocated.insert(start);
            }
            None => warn!(class = class.name(), "class start node missing from dataset"),
        }

        self.selected_class = Some(class);
        self.bump();
    }

    pub fn reset(&mut self) {
        self.allocated.clear();
        self.selected_class = None;
        self.bump();
    }

    pub fn set_allocated_ids(&mut self, graph: &TreeGraph, ids: impl IntoIterator<Item = NodeId>) {
        self.allocated.clear();
        let mut dropped = 0usize;
        for id in ids {
            if graph.nodes.contains_key(&id) {
                self.allocated.insert(id);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(dropped, "ignored allocated ids missing from the dataset");
        }
        self.bump();
    }

    pub fn set_selected_class(&mut self, class: Option<ClassId>) {
        self.selected_class = class;
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
