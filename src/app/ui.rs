use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui::{self, Context, CursorIcon, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::tree::{ClassId, NodeKind, SavedBuild, save_build};
use crate::util::stat_summary;

use super::scene::SceneInput;
use super::{SearchMatchCache, ViewModel, hit};

impl ViewModel {
    pub(super) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_reloading: bool) {
        egui::SidePanel::left("planner-controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                self.side_panel(ui, reload_requested, is_reloading);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas(ui);
        });
    }

    fn side_panel(&mut self, ui: &mut Ui, reload_requested: &mut bool, is_reloading: bool) {
        ui.add_space(4.0);
        ui.heading("Passive tree");
        ui.label(format!(
            "{} nodes, {} connections",
            self.graph.nodes.len(),
            self.graph.connections.len()
        ));

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!is_reloading, egui::Button::new("Reload tree"))
                .clicked()
            {
                *reload_requested = true;
            }
            if is_reloading {
                ui.spinner();
            }
        });
        if let Some(error) = &self.reload_error {
            ui.colored_label(egui::Color32::LIGHT_RED, format!("Reload failed: {error}"));
        }

        ui.separator();
        ui.label("Class");
        for class in ClassId::ALL {
            let selected = self.allocation.selected_class() == Some(class);
            if ui.radio(selected, class.name()).clicked() && !selected {
                self.select_class(class);
            }
        }

        ui.separator();
        ui.label(format!("Allocated nodes: {}", self.allocation.len()));

        ui.horizontal(|ui| {
            if ui.button("Zoom -").clicked() {
                self.viewport
                    .zoom_out_at((self.canvas_size * 0.5).to_pos2());
            }
            if ui.button("Zoom +").clicked() {
                self.viewport.zoom_in_at((self.canvas_size * 0.5).to_pos2());
            }
            if ui.button("Reset view").clicked() {
                self.viewport_ready = false;
            }
        });

        if ui.button("Reset build").clicked() {
            self.allocation.reset();
        }

        ui.separator();
        ui.label("Find node");
        let response = ui.text_edit_singleline(&mut self.search);
        if response.changed() {
            self.search_revision = self.search_revision.wrapping_add(1);
            self.search_match_cache = None;
        }

        ui.separator();
        if ui.button("Save build").clicked() {
            self.save_current_build();
        }
        if let Some(feedback) = &self.save_feedback {
            ui.label(feedback.as_str());
        }

        ui.separator();
        match self.hovered.and_then(|id| self.graph.nodes.get(&id)) {
            Some(node) => {
                let title = if node.name.is_empty() {
                    node.kind.label().to_string()
                } else {
                    format!("{} ({})", node.name, node.kind.label())
                };
                ui.strong(title);
                if let Some(ascendancy) = &node.ascendancy_name {
                    ui.label(format!("Ascendancy: {ascendancy}"));
                }
                let stats = stat_summary(&node.stats);
                if !stats.is_empty() {
                    ui.label(stats);
                }
            }
            None => {
                ui.weak("Hover a node for details; click to allocate.");
            }
        }
    }

    fn canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.canvas_size = rect.size();

        if !self.viewport_ready {
            if let Some(bounds) = self.graph.bounds() {
                let (center_x, center_y) = bounds.center();
                self.viewport.reset(vec2(center_x, center_y), rect.size());
            }
            self.viewport_ready = true;
        }

        let painter = ui.painter_at(rect);

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let pointer = ui
                    .input(|input| input.pointer.hover_pos())
                    .unwrap_or_else(|| rect.center());
                let anchor = (pointer - rect.min).to_pos2();
                if scroll > 0.0 {
                    self.viewport.zoom_in_at(anchor);
                } else {
                    self.viewport.zoom_out_at(anchor);
                }
            }
        }

        if response.dragged() {
            self.viewport.pan_by(response.drag_delta());
        }

        let class = self.allocation.selected_class().map(ClassId::data);
        self.hovered = response.hover_pos().and_then(|pointer| {
            let world = self.viewport.screen_to_world((pointer - rect.min).to_pos2());
            hit::node_at(&self.graph, class, world.x, world.y).map(|node| node.id)
        });

        if self.hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = CursorIcon::PointingHand);
        }

        if response.clicked()
            && let Some(id) = self.hovered
            && let Some(node) = self.graph.nodes.get(&id)
        {
            match (node.kind, node.class_start_index) {
                (NodeKind::ClassStart, Some(index)) => {
                    if let Some(class) = ClassId::for_start_index(index) {
                        self.select_class(class);
                    }
                }
                _ => self.allocation.toggle(id),
            }
        }

        // A resolved sprite must show on the next redraw.
        if self.sprites.poll() {
            ui.ctx().request_repaint();
        }

        let matches = self.search_matches();
        let class = self.allocation.selected_class().map(ClassId::data);
        let input = SceneInput {
            graph: &self.graph,
            allocation: &self.allocation,
            viewport: &self.viewport,
            class,
            search_matches: matches.as_deref(),
            search_revision: self.search_revision,
            hovered: self.hovered,
        };
        self.scene.draw(&painter, rect, &mut self.sprites, &input);
    }

    fn select_class(&mut self, class: ClassId) {
        self.allocation.select_class(&self.graph, class);
        if let Some(start) = self.graph.class_start_node(class.data().start_index)
            && let Some(node) = self.graph.nodes.get(&start)
            && self.canvas_size != egui::Vec2::ZERO
        {
            self.viewport
                .center_on(vec2(node.x, node.y), self.canvas_size);
        }
    }

    fn save_current_build(&mut self) {
        let path = self
            .build_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("build.json"));
        let build = SavedBuild {
            class: self.allocation.selected_class().map(|c| c.name().to_string()),
            nodes: self.allocation.allocated_ids(),
        };
        self.save_feedback = Some(match save_build(&path, &build) {
            Ok(()) => format!("Saved to {}", path.display()),
            Err(error) => format!("Save failed: {error:#}"),
        });
    }

    fn search_matches(&mut self) -> Option<Arc<HashSet<crate::tree::NodeId>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .graph
            .nodes
            .values()
            .filter(|node| !node.name.is_empty())
            .filter(|node| {
                matcher
                    .fuzzy_match(&node.name, query)
                    .or_else(|| {
                        matcher.fuzzy_match(&node.name.to_ascii_lowercase(), &query.to_ascii_lowercase())
                    })
                    .is_some()
            })
            .map(|node| node.id)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }
}
