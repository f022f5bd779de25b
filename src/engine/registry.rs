use std::panic::{AssertUnwindSafe, catch_unwind};

use egui::{Pos2, Rect};

use super::constraints::DragConstraints;
use super::options::HitTestOrder;

/// Stable handle for a registered draggable. Handles are serial integers, never
/// reused, so deregistration can't dangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DraggableId(pub(super) u64);

/// Stable handle for a registered drop target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DropTargetId(pub(super) u64);

pub type DragPredicate<P> = Box<dyn Fn(&P) -> bool>;
pub type TargetCallback<P> = Box<dyn FnMut(&P)>;
pub type DropCallback<P> = Box<dyn FnMut(&P, Pos2)>;

/// Registration options for a draggable element.
pub struct DraggableOptions<P> {
    pub disabled: bool,
    /// If set, a gesture may only start from inside this sub-rect (a drag handle).
    pub handle: Option<Rect>,
    /// Type tag matched against drop targets' `accept_types`.
    pub kind: Option<String>,
    pub constraints: DragConstraints,
    /// Bounds used by the `constrain_to_parent` constraint.
    pub parent_bounds: Option<Rect>,
    /// Third-party veto, invoked fail-closed at press time: a panic counts as "cannot drag".
    pub can_drag: Option<DragPredicate<P>>,
}

impl<P> Default for DraggableOptions<P> {
    fn default() -> Self {
        Self {
            disabled: false,
            handle: None,
            kind: None,
            constraints: DragConstraints::default(),
            parent_bounds: None,
            can_drag: None,
        }
    }
}

/// Registration options for a drop target.
pub struct DropTargetOptions<P> {
    /// Accepted draggable kinds. Empty means accept-all.
    pub accept_types: Vec<String>,
    /// Third-party veto, invoked fail-closed on every move: a panic counts as "cannot drop".
    pub can_drop: Option<DragPredicate<P>>,
    pub on_enter: Option<TargetCallback<P>>,
    pub on_leave: Option<TargetCallback<P>>,
    pub on_drop: Option<DropCallback<P>>,
}

impl<P> Default for DropTargetOptions<P> {
    fn default() -> Self {
        Self {
            accept_types: Vec::new(),
            can_drop: None,
            on_enter: None,
            on_leave: None,
            on_drop: None,
        }
    }
}

pub(super) struct DraggableEntry<P> {
    pub(super) id: DraggableId,
    pub(super) rect: Rect,
    pub(super) payload: P,
    pub(super) disabled: bool,
    pub(super) handle: Option<Rect>,
    pub(super) kind: Option<String>,
    pub(super) constraints: DragConstraints,
    pub(super) parent_bounds: Option<Rect>,
    pub(super) can_drag: Option<DragPredicate<P>>,
}

pub(super) struct DropTargetEntry<P> {
    pub(super) id: DropTargetId,
    pub(super) rect: Rect,
    pub(super) payload: P,
    pub(super) accept_types: ahash::HashSet<String>,
    pub(super) can_drop: Option<DragPredicate<P>>,
    pub(super) on_enter: Option<TargetCallback<P>>,
    pub(super) on_leave: Option<TargetCallback<P>>,
    pub(super) on_drop: Option<DropCallback<P>>,
}

/// Invoke a third-party predicate fail-closed: a panic is treated as `false`
/// so a throwing predicate can never wedge a session (teardown still runs).
pub(super) fn call_predicate<P>(pred: &DragPredicate<P>, payload: &P) -> bool {
    catch_unwind(AssertUnwindSafe(|| pred(payload))).unwrap_or_else(|_| {
        log::warn!("drag predicate panicked; treating as false");
        false
    })
}

fn call_callback<P>(cb: &mut TargetCallback<P>, payload: &P) {
    if catch_unwind(AssertUnwindSafe(|| cb(payload))).is_err() {
        log::warn!("drop-target callback panicked; ignored");
    }
}

fn hit(rect: Rect, pos: Pos2) -> bool {
    // Degenerate registrations (NaN or negative-size rects) are inert: kept in
    // the registry, never matched.
    rect.is_finite() && rect.is_positive() && rect.contains(pos)
}

/// Arena of registered draggables, scanned in registration order.
pub(super) struct DraggableArena<P> {
    next_serial: u64,
    entries: Vec<DraggableEntry<P>>,
}

impl<P> Default for DraggableArena<P> {
    fn default() -> Self {
        Self {
            next_serial: 1,
            entries: Vec::new(),
        }
    }
}

impl<P> DraggableArena<P> {
    pub(super) fn insert(&mut self, rect: Rect, payload: P, options: DraggableOptions<P>) -> DraggableId {
        let id = DraggableId(self.next_serial);
        self.next_serial += 1;
        self.entries.push(DraggableEntry {
            id,
            rect,
            payload,
            disabled: options.disabled,
            handle: options.handle,
            kind: options.kind,
            constraints: options.constraints,
            parent_bounds: options.parent_bounds,
            can_drag: options.can_drag,
        });
        id
    }

    pub(super) fn remove(&mut self, id: DraggableId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub(super) fn get(&self, id: DraggableId) -> Option<&DraggableEntry<P>> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub(super) fn get_mut(&mut self, id: DraggableId) -> Option<&mut DraggableEntry<P>> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// First enabled draggable whose rect (or handle, when set) contains `pos`,
    /// in registration order.
    pub(super) fn draggable_at(&self, pos: Pos2) -> Option<DraggableId> {
        self.entries
            .iter()
            .find(|e| {
                !e.disabled
                    && hit(e.rect, pos)
                    && e.handle.is_none_or(|handle| hit(handle, pos))
            })
            .map(|e| e.id)
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The drop-target registry and hit tester.
///
/// Hit testing is a linear scan over registered entries. Overlap between two
/// regions resolves by the engine's [`HitTestOrder`] policy; the default is
/// registration order, which is deterministic for any query point.
pub(super) struct DropRegistry<P> {
    next_serial: u64,
    entries: Vec<DropTargetEntry<P>>,
}

impl<P> Default for DropRegistry<P> {
    fn default() -> Self {
        Self {
            next_serial: 1,
            entries: Vec::new(),
        }
    }
}

impl<P> DropRegistry<P> {
    pub(super) fn insert(&mut self, rect: Rect, payload: P, options: DropTargetOptions<P>) -> DropTargetId {
        let id = DropTargetId(self.next_serial);
        self.next_serial += 1;
        self.entries.push(DropTargetEntry {
            id,
            rect,
            payload,
            accept_types: options.accept_types.into_iter().collect(),
            can_drop: options.can_drop,
            on_enter: options.on_enter,
            on_leave: options.on_leave,
            on_drop: options.on_drop,
        });
        id
    }

    pub(super) fn remove(&mut self, id: DropTargetId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub(super) fn contains(&self, id: DropTargetId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub(super) fn rect(&self, id: DropTargetId) -> Option<Rect> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.rect)
    }

    pub(super) fn payload(&self, id: DropTargetId) -> Option<&P> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.payload)
    }

    pub(super) fn set_rect(&mut self, id: DropTargetId, rect: Rect) -> bool {
        if let Some(e) = self.entries.iter_mut().find(|e| e.id == id) {
            e.rect = rect;
            true
        } else {
            false
        }
    }

    pub(super) fn ids(&self) -> Vec<DropTargetId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns at most one match for any query point.
    pub(super) fn hit_test(&self, pos: Pos2, order: HitTestOrder) -> Option<DropTargetId> {
        match order {
            HitTestOrder::RegistrationOrder => {
                self.entries.iter().find(|e| hit(e.rect, pos)).map(|e| e.id)
            }
            HitTestOrder::TopmostFirst => self
                .entries
                .iter()
                .rev()
                .find(|e| hit(e.rect, pos))
                .map(|e| e.id),
        }
    }

    /// Accept-type filter AND the target's own predicate, both fail-closed.
    pub(super) fn target_accepts(
        &self,
        id: DropTargetId,
        kind: Option<&str>,
        payload: &P,
    ) -> bool {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return false;
        };
        if !entry.accept_types.is_empty() {
            let Some(kind) = kind else { return false };
            if !entry.accept_types.contains(kind) {
                return false;
            }
        }
        entry
            .can_drop
            .as_ref()
            .is_none_or(|pred| call_predicate(pred, payload))
    }

    pub(super) fn fire_enter(&mut self, id: DropTargetId, payload: &P) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id)
            && let Some(cb) = entry.on_enter.as_mut()
        {
            call_callback(cb, payload);
        }
    }

    pub(super) fn fire_leave(&mut self, id: DropTargetId, payload: &P) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id)
            && let Some(cb) = entry.on_leave.as_mut()
        {
            call_callback(cb, payload);
        }
    }

    pub(super) fn fire_drop(&mut self, id: DropTargetId, payload: &P, position: Pos2) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id)
            && let Some(cb) = entry.on_drop.as_mut()
            && catch_unwind(AssertUnwindSafe(|| cb(payload, position))).is_err()
        {
            log::warn!("on_drop callback panicked; ignored");
        }
    }
}
