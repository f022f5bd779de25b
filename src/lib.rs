//! Headless drag-and-drop interaction engine for egui dashboards.
//!
//! The engine unifies mouse, touch, and keyboard input into one gesture
//! lifecycle, hit-tests registered drop regions, applies movement constraints
//! (axis lock, parent clamp, grid snap), and drives edge auto-scrolling. It
//! renders nothing: callers react to [`engine::DragEvent`]s (or per-target
//! callbacks) and draw/persist however they like.
//!
//! Two adapters compose the engine for the common dashboard cases:
//! [`sortable::SortableList`] for linear reordering and [`grid::GridLayout`]
//! for responsive 2-D grid placement.

#![forbid(unsafe_code)]

pub mod engine;
pub mod grid;
pub mod sortable;

pub use engine::{
    AxisLock, DragConstraints, DragEngine, DragEngineOptions, DragEvent, DragPhase, DragSession,
    DraggableId, DraggableOptions, DropTargetId, DropTargetOptions, HitTestOrder, InputSource,
    KeyboardSteps, RawInput, TouchPhase, UnifiedEvent, UnifiedPhase,
};
pub use grid::{Breakpoint, GridCell, GridItem, GridLayout};
pub use sortable::{SortableList, apply_reorder};
