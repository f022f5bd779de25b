use egui::{Pos2, Rect, Vec2, vec2};

/// Edge-proximity auto-scrolling for an active drag.
///
/// The scroll "interval" is cooperative: the host calls
/// [`super::DragEngine::tick_auto_scroll`] on its own ~16 ms cadence, and this
/// type only decides direction and activity. Activity is strictly
/// session-scoped; resolution or cancellation must call [`Self::stop`].
#[derive(Debug, Default)]
pub(super) struct AutoScroller {
    /// Per-axis direction, each component in {-1, 0, 1}. `None` when no edge is near.
    active: Option<Vec2>,
}

fn edge_direction(pointer: Pos2, viewport: Rect, threshold: f32) -> Vec2 {
    let x = if pointer.x - viewport.min.x <= threshold {
        -1.0
    } else if viewport.max.x - pointer.x <= threshold {
        1.0
    } else {
        0.0
    };
    let y = if pointer.y - viewport.min.y <= threshold {
        -1.0
    } else if viewport.max.y - pointer.y <= threshold {
        1.0
    } else {
        0.0
    };
    vec2(x, y)
}

impl AutoScroller {
    /// Re-evaluate edge proximity with the raw (unconstrained) pointer position.
    pub(super) fn update(&mut self, pointer: Pos2, viewport: Rect, threshold: f32) {
        // A pointer past the viewport edge still counts as "near" that edge, so
        // dragging beyond the window keeps scrolling toward the pointer.
        let dir = edge_direction(pointer, viewport, threshold);
        self.active = (dir != Vec2::ZERO).then_some(dir);
    }

    /// One cooperative tick: the scroll delta to apply, if any edge is active.
    pub(super) fn tick(&self, speed: f32) -> Option<Vec2> {
        self.active.map(|dir| dir * speed)
    }

    pub(super) fn stop(&mut self) {
        self.active = None;
    }

    pub(super) fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn viewport() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))
    }

    #[test]
    fn center_is_inactive() {
        let mut s = AutoScroller::default();
        s.update(pos2(400.0, 300.0), viewport(), 40.0);
        assert!(!s.is_active());
        assert_eq!(s.tick(10.0), None);
    }

    #[test]
    fn near_left_edge_scrolls_left() {
        let mut s = AutoScroller::default();
        s.update(pos2(10.0, 300.0), viewport(), 40.0);
        assert_eq!(s.tick(10.0), Some(vec2(-10.0, 0.0)));
    }

    #[test]
    fn corner_scrolls_both_axes() {
        let mut s = AutoScroller::default();
        s.update(pos2(790.0, 590.0), viewport(), 40.0);
        assert_eq!(s.tick(8.0), Some(vec2(8.0, 8.0)));
    }

    #[test]
    fn leaving_the_edge_deactivates() {
        let mut s = AutoScroller::default();
        s.update(pos2(10.0, 300.0), viewport(), 40.0);
        assert!(s.is_active());
        s.update(pos2(400.0, 300.0), viewport(), 40.0);
        assert!(!s.is_active());
    }

    #[test]
    fn stop_clears_activity() {
        let mut s = AutoScroller::default();
        s.update(pos2(10.0, 300.0), viewport(), 40.0);
        s.stop();
        assert!(!s.is_active());
        assert_eq!(s.tick(10.0), None);
    }
}
