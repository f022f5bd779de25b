use egui::{Pos2, Rect, Vec2};

use super::constraints::DragConstraints;
use super::input::InputSource;
use super::registry::{DraggableId, DropTargetId};

/// Lifecycle of a drag gesture.
///
/// Legal transitions: `Idle → Pending` (press), `Pending → Dragging` (threshold
/// crossed), `Pending → Idle` (released below threshold, a click),
/// `Dragging → Resolved → Idle` (drop, cancel, or forced teardown).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Pressed, but cumulative displacement is still below the drag threshold.
    /// Drop-target updates are ignored in this phase.
    Pending,
    Dragging,
    /// Transient: the session is being resolved this very call.
    Resolved,
}

/// The live state of an in-progress gesture. At most one exists per engine.
///
/// This is an explicit value object owned by the engine (not closure-captured
/// state); consumers inspect it through [`super::DragEngine::session`].
#[derive(Debug)]
pub struct DragSession<P> {
    pub(super) draggable: DraggableId,
    pub(super) payload: P,
    pub(super) kind: Option<String>,
    pub(super) source: InputSource,
    pub(super) start_position: Pos2,
    pub(super) current_position: Pos2,
    /// Pointer offset relative to the dragged rect's origin, fixed at press time.
    pub(super) drag_offset: Vec2,
    pub(super) drop_target: Option<DropTargetId>,
    pub(super) can_drop: bool,
    pub(super) phase: DragPhase,
    pub(super) constraints: DragConstraints,
    pub(super) parent_bounds: Option<Rect>,
}

impl<P> DragSession<P> {
    pub fn draggable(&self) -> DraggableId {
        self.draggable
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn source(&self) -> InputSource {
        self.source
    }

    pub fn start_position(&self) -> Pos2 {
        self.start_position
    }

    pub fn current_position(&self) -> Pos2 {
        self.current_position
    }

    pub fn drag_offset(&self) -> Vec2 {
        self.drag_offset
    }

    pub fn drop_target(&self) -> Option<DropTargetId> {
        self.drop_target
    }

    pub fn can_drop(&self) -> bool {
        self.can_drop
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn constraints(&self) -> &DragConstraints {
        &self.constraints
    }

    /// `drop_target` and `can_drop` are recomputed together on every move; this
    /// is the single writer that keeps them from going stale independently.
    pub(super) fn set_candidate(&mut self, target: Option<DropTargetId>, can_drop: bool) {
        self.drop_target = target;
        self.can_drop = target.is_some() && can_drop;
    }
}
