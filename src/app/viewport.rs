use eframe::egui::{Pos2, Vec2};

/// Fixed zoom ladder, smallest to largest scale.
pub const ZOOM_LEVELS: [f32; 4] = [0.1246, 0.2109, 0.2972, 0.3835];

/// Pan offset plus a discrete zoom level. All coordinates here are
/// canvas-local screen points; `screen = pan + world * scale`.
#[derive(Clone, Debug)]
pub struct Viewport {
    pan: Vec2,
    zoom_index: usize,
    revision: u64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom_index: 0,
            revision: 0,
        }
    }
}

impl Viewport {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn zoom_index(&self) -> usize {
        self.zoom_index
    }

    pub fn scale(&self) -> f32 {
        ZOOM_LEVELS[self.zoom_index]
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.pan += delta;
        self.bump();
    }

    /// One step up the ladder; a no-op at the top.
    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom_index(self.zoom_index + 1)
    }

    /// One step down the ladder; a no-op at the bottom.
    pub fn zoom_out(&mut self) -> bool {
        if self.zoom_index == 0 {
            return false;
        }
        self.set_zoom_index(self.zoom_index - 1)
    }

    /// Zoom step keeping the world point under `anchor` fixed on screen.
    pub fn zoom_in_at(&mut self, anchor: Pos2) -> bool {
        self.zoom_at(anchor, |viewport| viewport.zoom_in())
    }

    pub fn zoom_out_at(&mut self, anchor: Pos2) -> bool {
        self.zoom_at(anchor, |viewport| viewport.zoom_out())
    }

    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        (self.pan + world * self.scale()).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.pan) / self.scale()
    }

    /// Recomputes pan so `world` maps to the viewport center at the current
    /// scale.
    pub fn center_on(&mut self, world: Vec2, view_size: Vec2) {
        self.pan = view_size * 0.5 - world * self.scale();
        self.bump();
    }

    /// Default view: lowest zoom level, graph bounding-box center framed in
    /// the middle of the viewport.
    pub fn reset(&mut self, graph_center: Vec2, view_size: Vec2) {
        self.zoom_index = 0;
        self.center_on(graph_center, view_size);
    }

    fn set_zoom_index(&mut self, index: usize) -> bool {
        if index >= ZOOM_LEVELS.len() || index == self.zoom_index {
            return false;
        }
        self.zoom_index = index;
        self.bump();
        true
    }

    fn zoom_at(&mut self, anchor: Pos2, step: impl FnOnce(&mut Self) -> bool) -> bool {
        let world = self.screen_to_world(anchor);
        if !step(self) {
            return false;
        }
        self.pan = anchor.to_vec2() - world * self.scale();
        true
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn zoom_clamps_at_both_ends() {
        let mut viewport = Viewport::default();
        assert!(!viewport.zoom_out());
        for _ in 0..ZOOM_LEVELS.len() {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom_index(), ZOOM_LEVELS.len() - 1);
        assert!(!viewport.zoom_in());
    }

    #[test]
    fn clamped_zoom_does_not_invalidate() {
        let mut viewport = Viewport::default();
        let before = viewport.revision();
        viewport.zoom_out();
        assert_eq!(viewport.revision(), before);
        viewport.zoom_in();
        assert_ne!(viewport.revision(), before);
    }

    #[test]
    fn transform_round_trip_at_every_level() {
        let mut viewport = Viewport::default();
        viewport.pan_by(vec2(-312.5, 87.25));

        loop {
            let world = vec2(1234.5, -678.9);
            let back = viewport.screen_to_world(viewport.world_to_screen(world));
            assert!((back - world).length() < 1e-2);
            if !viewport.zoom_in() {
                break;
            }
        }
    }

    #[test]
    fn center_on_frames_the_requested_point() {
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        let view_size = vec2(800.0, 600.0);
        viewport.center_on(vec2(500.0, -200.0), view_size);
        let screen = viewport.world_to_screen(vec2(500.0, -200.0));
        assert!((screen - pos2(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn reset_returns_to_the_lowest_zoom() {
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        viewport.zoom_in();
        viewport.pan_by(vec2(50.0, 50.0));
        viewport.reset(vec2(0.0, 0.0), vec2(640.0, 480.0));
        assert_eq!(viewport.zoom_index(), 0);
        let screen = viewport.world_to_screen(Vec2::ZERO);
        assert!((screen - pos2(320.0, 240.0)).length() < 1e-3);
    }

    #[test]
    fn anchored_zoom_keeps_the_pointer_world_position() {
        let mut viewport = Viewport::default();
        viewport.pan_by(vec2(40.0, -20.0));
        let anchor = pos2(150.0, 220.0);
        let world_before = viewport.screen_to_world(anchor);
        assert!(viewport.zoom_in_at(anchor));
        let world_after = viewport.screen_to_world(anchor);
        assert!((world_after - world_before).length() < 1e-2);
    }

    #[test]
    fn anchored_zoom_at_the_top_is_a_no_op() {
        let mut viewport = Viewport::default();
        for _ in 0..ZOOM_LEVELS.len() {
            viewport.zoom_in();
        }
        let pan_before = viewport.world_to_screen(Vec2::ZERO);
        assert!(!viewport.zoom_in_at(pos2(10.0, 10.0)));
        assert_eq!(viewport.world_to_screen(Vec2::ZERO), pan_before);
    }
}
