use std::collections::HashSet;

use eframe::egui::{
    Color32, CornerRadius, FontId, Painter, Pos2, Rect, Shape, Stroke, pos2, vec2,
};

use crate::tree::{CharacterClass, DRAW_ORDER, NodeId, NodeKind, TreeGraph};

use super::allocation::AllocationState;
use super::assets::SpriteCache;
use super::hit::hit_diameter;
use super::viewport::Viewport;
use super::visibility::{connection_visible, node_visible};

const BACKGROUND: Color32 = Color32::from_rgb(16, 20, 27);
const GRID_LINE: Color32 = Color32::from_rgba_premultiplied(30, 36, 42, 160);
const ALLOCATED_RING: Color32 = Color32::from_rgb(235, 200, 90);
const SEARCH_RING: Color32 = Color32::from_rgb(103, 196, 255);
const HOVER_RING: Color32 = Color32::from_gray(235);
const OVERLAY_TEXT: Color32 = Color32::from_gray(225);

/// Three independently invalidated layers of cached shapes. Rebuilds are
/// driven by revision stamps from the allocation, viewport, sprite, and
/// search state, never by a clock.
pub struct SceneRenderer {
    base: Vec<Shape>,
    base_stamp: Option<BaseStamp>,
    base_rebuilds: u64,
    highlight: Vec<Shape>,
    highlight_stamp: Option<HighlightStamp>,
    overlay: Vec<Shape>,
    visible_nodes: usize,
    visible_connections: usize,
}

#[derive(Clone, Copy, PartialEq)]
struct BaseStamp {
    rect: Rect,
    allocation: u64,
    viewport: u64,
    sprites: u64,
    search: u64,
}

#[derive(Clone, Copy, PartialEq)]
struct HighlightStamp {
    rect: Rect,
    viewport: u64,
    hovered: Option<NodeId>,
}

pub struct SceneInput<'a> {
    pub graph: &'a TreeGraph,
    pub allocation: &'a AllocationState,
    pub viewport: &'a Viewport,
    pub class: Option<&'a CharacterClass>,
    pub search_matches: Option<&'a HashSet<NodeId>>,
    pub search_revision: u64,
    pub hovered: Option<NodeId>,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self {
            base: Vec::new(),
            base_stamp: None,
            base_rebuilds: 0,
            highlight: Vec::new(),
            highlight_stamp: None,
            overlay: Vec::new(),
            visible_nodes: 0,
            visible_connections: 0,
        }
    }
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_rebuilds(&self) -> u64 {
        self.base_rebuilds
    }

    pub fn draw(
        &mut self,
        painter: &Painter,
        rect: Rect,
        sprites: &mut SpriteCache,
        input: &SceneInput<'_>,
    ) {
        let base_stamp = BaseStamp {
            rect,
            allocation: input.allocation.revision(),
            viewport: input.viewport.revision(),
            sprites: sprites.revision(),
            search: input.search_revision,
        };
        if self.base_stamp != Some(base_stamp) {
            self.rebuild_base(painter, rect, sprites, input);
            self.rebuild_overlay(painter, rect, input);
            self.base_stamp = Some(base_stamp);
            self.base_rebuilds = self.base_rebuilds.wrapping_add(1);
        }

        let highlight_stamp = HighlightStamp {
            rect,
            viewport: input.viewport.revision(),
            hovered: input.hovered,
        };
        if self.highlight_stamp != Some(highlight_stamp) {
            self.rebuild_highlight(rect, input);
            self.highlight_stamp = Some(highlight_stamp);
        }

        painter.extend(self.base.iter().cloned());
        painter.extend(self.highlight.iter().cloned());
        painter.extend(self.overlay.iter().cloned());
    }

    fn rebuild_base(
        &mut self,
        painter: &Painter,
        rect: Rect,
        sprites: &mut SpriteCache,
        input: &SceneInput<'_>,
    ) {
        self.base.clear();
        self.visible_nodes = 0;
        self.visible_connections = 0;

        let viewport = input.viewport;
        let scale = viewport.scale();
        // Full node artwork only above the lowest zoom level.
        let detailed = viewport.zoom_index() > 0;

        self.base
            .push(Shape::rect_filled(rect, CornerRadius::ZERO, BACKGROUND));
        self.push_grid(rect, scale * 420.0);

        let mut drawn_pairs = HashSet::new();
        for connection in &input.graph.connections {
            let low = connection.source.min(connection.target);
            let high = connection.source.max(connection.target);
            if low == high || !drawn_pairs.insert((low, high)) {
                continue;
            }

            let (Some(a), Some(b)) = (
                input.graph.nodes.get(&connection.source),
                input.graph.nodes.get(&connection.target),
            ) else {
                continue;
            };
            if !connection_visible(a, b, input.class) {
                continue;
            }

            let start = to_screen(rect, viewport, a.x, a.y);
            let end = to_screen(rect, viewport, b.x, b.y);
            if !segment_visible(rect, start, end) {
                continue;
            }

            let both_allocated =
                input.allocation.is_allocated(a.id) && input.allocation.is_allocated(b.id);
            let stroke = if both_allocated {
                Stroke::new((22.0 * scale).clamp(1.6, 6.0), ALLOCATED_RING)
            } else {
                Stroke::new(
                    (14.0 * scale).clamp(0.7, 3.2),
                    Color32::from_rgba_premultiplied(70, 76, 84, 200),
                )
            };
            self.base.push(Shape::line_segment([start, end], stroke));
            self.visible_connections += 1;
        }

        for kind in DRAW_ORDER {
            if kind == NodeKind::Root {
                continue;
            }
            let radius = (hit_diameter(kind) / 2.0 * scale).max(1.5);
            for node in input.graph.nodes_of_kind(kind) {
                if !node_visible(node, input.class) {
                    continue;
                }
                let center = to_screen(rect, viewport, node.x, node.y);
                if !circle_visible(rect, center, radius) {
                    continue;
                }
                self.visible_nodes += 1;

                let allocated = input.allocation.is_allocated(node.id);
                let mut drew_sprite = false;
                if detailed
                    && let Some(icon) = &node.icon
                    && let Some(def) = input.graph.sprites.get(icon)
                    && let Some(texture) = sprites.crop(painter.ctx(), def)
                {
                    let tint = if allocated {
                        Color32::WHITE
                    } else {
                        Color32::from_gray(150)
                    };
                    self.base.push(Shape::image(
                        texture.id(),
                        Rect::from_center_size(center, vec2(radius * 2.0, radius * 2.0)),
                        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                        tint,
                    ));
                    drew_sprite = true;
                }

                if !drew_sprite {
                    // Placeholder circle: first paint never waits on assets.
                    let fill = if allocated {
                        kind_color(kind)
                    } else {
                        dim_color(kind_color(kind), 0.45)
                    };
                    self.base.push(Shape::circle_filled(center, radius, fill));
                    self.base.push(Shape::circle_stroke(
                        center,
                        radius,
                        Stroke::new(1.0, Color32::from_rgba_premultiplied(12, 12, 12, 190)),
                    ));
                }

                if allocated {
                    self.base.push(Shape::circle_stroke(
                        center,
                        radius + 2.0,
                        Stroke::new(1.6, ALLOCATED_RING),
                    ));
                }
                if input
                    .search_matches
                    .is_some_and(|matches| matches.contains(&node.id))
                {
                    self.base.push(Shape::circle_stroke(
                        center,
                        radius + 4.5,
                        Stroke::new(1.4, SEARCH_RING),
                    ));
                }
            }
        }
    }

    fn rebuild_highlight(&mut self, rect: Rect, input: &SceneInput<'_>) {
        self.highlight.clear();
        let Some(node) = input.hovered.and_then(|id| input.graph.nodes.get(&id)) else {
            return;
        };
        if !node_visible(node, input.class) {
            return;
        }
        let radius = (hit_diameter(node.kind) / 2.0 * input.viewport.scale()).max(1.5);
        let center = to_screen(rect, input.viewport, node.x, node.y);
        self.highlight.push(Shape::circle_stroke(
            center,
            radius + 3.0,
            Stroke::new(2.0, HOVER_RING),
        ));
    }

    fn rebuild_overlay(&mut self, painter: &Painter, rect: Rect, input: &SceneInput<'_>) {
        self.overlay.clear();

        let class_line = match input.class {
            Some(class) => class.name.to_string(),
            None => "No class selected".to_string(),
        };
        let status = format!(
            "{}  |  {} allocated  |  zoom {}/{}  |  {} nodes, {} connections",
            class_line,
            input.allocation.len(),
            input.viewport.zoom_index() + 1,
            super::viewport::ZOOM_LEVELS.len(),
            self.visible_nodes,
            self.visible_connections,
        );

        let galley = painter.layout_no_wrap(status, FontId::proportional(13.0), OVERLAY_TEXT);
        self.overlay.push(Shape::galley(
            rect.left_top() + vec2(10.0, 8.0),
            galley,
            OVERLAY_TEXT,
        ));
    }

    fn push_grid(&mut self, rect: Rect, step: f32) {
        let step = step.max(24.0);
        let stroke = Stroke::new(1.0, GRID_LINE);

        let mut x = rect.left() + (rect.width() * 0.5).rem_euclid(step);
        while x < rect.right() {
            self.base.push(Shape::line_segment(
                [pos2(x, rect.top()), pos2(x, rect.bottom())],
                stroke,
            ));
            x += step;
        }

        let mut y = rect.top() + (rect.height() * 0.5).rem_euclid(step);
        while y < rect.bottom() {
            self.base.push(Shape::line_segment(
                [pos2(rect.left(), y), pos2(rect.right(), y)],
                stroke,
            ));
            y += step;
        }
    }
}

fn to_screen(rect: Rect, viewport: &Viewport, x: f32, y: f32) -> Pos2 {
    rect.min + viewport.world_to_screen(vec2(x, y)).to_vec2()
}

fn circle_visible(rect: Rect, center: Pos2, radius: f32) -> bool {
    !(center.x + radius < rect.left()
        || center.x - radius > rect.right()
        || center.y + radius < rect.top()
        || center.y - radius > rect.bottom())
}

fn segment_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    let min_x = start.x.min(end.x);
    let max_x = start.x.max(end.x);
    let min_y = start.y.min(end.y);
    let max_y = start.y.max(end.y);
    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgb(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
    )
}

fn kind_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Root => Color32::TRANSPARENT,
        NodeKind::Normal => Color32::from_rgb(126, 144, 162),
        NodeKind::Notable => Color32::from_rgb(196, 164, 86),
        NodeKind::Keystone => Color32::from_rgb(205, 122, 74),
        NodeKind::Mastery => Color32::from_rgb(118, 188, 140),
        NodeKind::Jewel => Color32::from_rgb(152, 132, 204),
        NodeKind::Ascendancy => Color32::from_rgb(222, 182, 94),
        NodeKind::Bloodline => Color32::from_rgb(176, 64, 72),
        NodeKind::ClassStart => Color32::from_rgb(94, 172, 212),
    }
}
