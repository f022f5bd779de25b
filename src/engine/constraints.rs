use egui::{Pos2, Rect, pos2};

/// Restrict movement to one screen axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisLock {
    #[default]
    None,
    /// Only horizontal movement is permitted; the vertical delta is zeroed.
    Horizontal,
    /// Only vertical movement is permitted; the horizontal delta is zeroed.
    Vertical,
}

/// Session-scoped movement constraints, copied from the draggable when a gesture starts.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragConstraints {
    pub axis: AxisLock,
    pub snap_to_grid: bool,
    /// Cell size for grid snapping, in points. Ignored unless `snap_to_grid` is set.
    pub grid_size: f32,
    /// Clamp the position into the draggable's parent bounds (when known).
    pub constrain_to_parent: bool,
    /// Minimum cumulative displacement from the press position before a pending
    /// gesture becomes an active drag. Distance-based, not time-based.
    pub drag_threshold: f32,
}

impl Default for DragConstraints {
    fn default() -> Self {
        Self {
            axis: AxisLock::None,
            snap_to_grid: false,
            grid_size: 20.0,
            constrain_to_parent: false,
            drag_threshold: 5.0,
        }
    }
}

/// Apply constraints to a raw candidate position.
///
/// The order is a contract, not an implementation detail: axis lock, then parent
/// clamp, then grid snap. Reordering changes behavior (e.g. snapping before
/// clamping could round back outside the parent), so callers can rely on the
/// resolved position being deterministic for a given input.
pub fn resolve_position(
    start: Pos2,
    raw: Pos2,
    constraints: &DragConstraints,
    parent: Option<Rect>,
) -> Pos2 {
    let mut pos = match constraints.axis {
        AxisLock::None => raw,
        AxisLock::Horizontal => pos2(raw.x, start.y),
        AxisLock::Vertical => pos2(start.x, raw.y),
    };

    if constraints.constrain_to_parent
        && let Some(parent) = parent
        && parent.is_finite()
    {
        pos = parent.clamp(pos);
    }

    if constraints.snap_to_grid && constraints.grid_size > 0.0 {
        let g = constraints.grid_size;
        pos = pos2((pos.x / g).round() * g, (pos.y / g).round() * g);
    }

    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Rect;

    fn snap20() -> DragConstraints {
        DragConstraints {
            snap_to_grid: true,
            grid_size: 20.0,
            ..Default::default()
        }
    }

    #[test]
    fn unconstrained_passes_through() {
        let c = DragConstraints::default();
        assert_eq!(
            resolve_position(pos2(0.0, 0.0), pos2(13.0, 37.0), &c, None),
            pos2(13.0, 37.0)
        );
    }

    #[test]
    fn axis_lock_zeroes_other_axis() {
        let c = DragConstraints {
            axis: AxisLock::Horizontal,
            ..Default::default()
        };
        let out = resolve_position(pos2(10.0, 10.0), pos2(50.0, 90.0), &c, None);
        assert_eq!(out, pos2(50.0, 10.0));

        let c = DragConstraints {
            axis: AxisLock::Vertical,
            ..Default::default()
        };
        let out = resolve_position(pos2(10.0, 10.0), pos2(50.0, 90.0), &c, None);
        assert_eq!(out, pos2(10.0, 90.0));
    }

    #[test]
    fn snap_rounds_to_grid_multiples() {
        let out = resolve_position(pos2(0.0, 0.0), pos2(29.0, 31.0), &snap20(), None);
        assert_eq!(out, pos2(20.0, 40.0));
        assert_eq!(out.x % 20.0, 0.0, "x must be a grid multiple");
        assert_eq!(out.y % 20.0, 0.0, "y must be a grid multiple");
    }

    #[test]
    fn parent_clamp_applies_before_snap() {
        let c = DragConstraints {
            snap_to_grid: true,
            grid_size: 20.0,
            constrain_to_parent: true,
            ..Default::default()
        };
        let parent = Rect::from_min_max(pos2(0.0, 0.0), pos2(95.0, 95.0));
        // Raw position far outside: clamp to 95, then snap to 100.
        // Snap-after-clamp is the documented order, even if it rounds past the edge.
        let out = resolve_position(pos2(0.0, 0.0), pos2(400.0, 400.0), &c, Some(parent));
        assert_eq!(out, pos2(100.0, 100.0));
    }

    #[test]
    fn clamp_without_parent_rect_is_a_no_op() {
        let c = DragConstraints {
            constrain_to_parent: true,
            ..Default::default()
        };
        let out = resolve_position(pos2(0.0, 0.0), pos2(-50.0, 900.0), &c, None);
        assert_eq!(out, pos2(-50.0, 900.0));
    }

    #[test]
    fn zero_grid_size_disables_snap() {
        let c = DragConstraints {
            snap_to_grid: true,
            grid_size: 0.0,
            ..Default::default()
        };
        let out = resolve_position(pos2(0.0, 0.0), pos2(7.0, 9.0), &c, None);
        assert_eq!(out, pos2(7.0, 9.0));
    }
}
