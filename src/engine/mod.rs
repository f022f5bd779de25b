use std::collections::VecDeque;

use egui::{Key, Pos2, Rect, Vec2};
use itertools::Itertools as _;

mod autoscroll;
mod constraints;
mod debug;
mod input;
mod options;
mod registry;
mod session;


pub use constraints::{AxisLock, DragConstraints, resolve_position};
pub use input::{InputSource, RawInput, TouchPhase, UnifiedEvent, UnifiedPhase};
pub use options::{DragEngineOptions, HitTestOrder, KeyboardSteps};
pub use registry::{
    DragPredicate, DraggableId, DraggableOptions, DropCallback, DropTargetId, DropTargetOptions,
    TargetCallback,
};
pub use session::{DragPhase, DragSession};

use autoscroll::AutoScroller;
use input::InputUnifier;
use registry::{DraggableArena, DropRegistry, call_predicate};

/// Lifecycle events, drained by the caller after feeding input.
///
/// Per-target callbacks (`on_enter`/`on_leave`/`on_drop`) fire synchronously as
/// the engine processes input; these queued events are for adapters and
/// presentation layers that prefer polling over callbacks.
#[derive(Clone, Debug)]
pub enum DragEvent<P> {
    /// Fired exactly once per session, the moment displacement crosses the drag threshold.
    Started {
        payload: P,
        /// Pointer offset relative to the dragged rect's origin, fixed for the session.
        offset: Vec2,
        source: InputSource,
    },
    /// Fired on each accepted move while dragging, with the constrained position.
    Over {
        payload: P,
        position: Pos2,
        source: InputSource,
    },
    /// Fired before `Ended` when the gesture resolves over an eligible target.
    Dropped {
        payload: P,
        target: DropTargetId,
        position: Pos2,
    },
    /// Fired exactly once per session that reached `Dragging`. `dropped` and
    /// `cancelled` are mutually exclusive; both false means the gesture ended
    /// with no eligible target under it.
    Ended {
        payload: P,
        dropped: bool,
        cancelled: bool,
        source: InputSource,
    },
    /// Auto-scroll advanced the viewport; `offset` is the accumulated scroll offset.
    Scrolled { offset: Vec2 },
}

/// The drag-and-drop state machine.
///
/// Single-threaded and event-driven: feed it [`RawInput`] via
/// [`Self::handle_input`], tick auto-scroll from your frame loop, then drain
/// [`DragEvent`]s. The engine owns all of its listener state explicitly — there
/// are no global subscriptions — so teardown is symmetric and testable without
/// a windowing backend.
pub struct DragEngine<P: Clone> {
    pub options: DragEngineOptions,

    draggables: DraggableArena<P>,
    registry: DropRegistry<P>,
    unifier: InputUnifier,
    session: Option<DragSession<P>>,
    autoscroll: AutoScroller,

    viewport: Option<Rect>,
    scroll_offset: Vec2,

    /// Draggable that keyboard gestures start from (caller-managed focus).
    keyboard_focus: Option<DraggableId>,
    /// Drop target focused by Tab-cycling while idle.
    focused_target: Option<DropTargetId>,

    events: VecDeque<DragEvent<P>>,

    debug_log: VecDeque<String>,
    debug_seq: u64,
}

impl<P: Clone> Default for DragEngine<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> DragEngine<P> {
    pub fn new() -> Self {
        Self::new_with_options(DragEngineOptions::default())
    }

    pub fn new_with_options(options: DragEngineOptions) -> Self {
        Self {
            options,
            draggables: DraggableArena::default(),
            registry: DropRegistry::default(),
            unifier: InputUnifier::default(),
            session: None,
            autoscroll: AutoScroller::default(),
            viewport: None,
            scroll_offset: Vec2::ZERO,
            keyboard_focus: None,
            focused_target: None,
            events: VecDeque::new(),
            debug_log: VecDeque::new(),
            debug_seq: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Registration

    /// Register a draggable region. Returns a stable handle; deregister with
    /// [`Self::remove_draggable`] when the owning UI region unmounts.
    ///
    /// Non-finite or negative-size rects are accepted but inert (never hit),
    /// mirroring the "registering a missing element is a no-op" contract.
    pub fn register_draggable(
        &mut self,
        rect: Rect,
        payload: P,
        options: DraggableOptions<P>,
    ) -> DraggableId {
        self.draggables.insert(rect, payload, options)
    }

    pub fn remove_draggable(&mut self, id: DraggableId) -> bool {
        if self.keyboard_focus == Some(id) {
            self.keyboard_focus = None;
        }
        if let Some(session) = &self.session
            && session.draggable == id
        {
            // The dragged element unmounted mid-gesture: forced teardown.
            self.cancel_active_drag();
        }
        self.draggables.remove(id)
    }

    /// Owners push geometry updates; the engine never polls layout continuously.
    pub fn update_draggable_rect(&mut self, id: DraggableId, rect: Rect) -> bool {
        if let Some(entry) = self.draggables.get_mut(id) {
            entry.rect = rect;
            true
        } else {
            false
        }
    }

    /// Register a drop target. Returns a stable handle; deregister with
    /// [`Self::remove_drop_target`] when the owning UI region unmounts —
    /// leaking entries here is the classic resource leak this API shape avoids.
    pub fn register_drop_target(
        &mut self,
        rect: Rect,
        payload: P,
        options: DropTargetOptions<P>,
    ) -> DropTargetId {
        self.registry.insert(rect, payload, options)
    }

    pub fn remove_drop_target(&mut self, id: DropTargetId) -> bool {
        if self.focused_target == Some(id) {
            self.focused_target = None;
        }
        let removed = self.registry.remove(id);
        // Never leave a dangling candidate: recompute together, as always.
        if removed
            && let Some(session) = self.session.as_mut()
            && session.drop_target == Some(id)
        {
            session.set_candidate(None, false);
        }
        removed
    }

    pub fn update_drop_target_rect(&mut self, id: DropTargetId, rect: Rect) -> bool {
        self.registry.set_rect(id, rect)
    }

    pub fn drop_target_payload(&self, id: DropTargetId) -> Option<&P> {
        self.registry.payload(id)
    }

    pub fn draggable_count(&self) -> usize {
        self.draggables.len()
    }

    pub fn drop_target_count(&self) -> usize {
        self.registry.len()
    }

    // ------------------------------------------------------------------------
    // Viewport / auto-scroll

    /// Set the viewport used for edge-proximity auto-scrolling. Without one,
    /// auto-scroll stays inactive.
    pub fn set_viewport(&mut self, rect: Rect) {
        self.viewport = Some(rect);
    }

    pub fn scroll_offset(&self) -> Vec2 {
        self.scroll_offset
    }

    pub fn auto_scroll_active(&self) -> bool {
        self.autoscroll.is_active()
    }

    /// One cooperative auto-scroll tick (~16 ms cadence, driven by the host).
    /// Returns the applied delta, if an edge is active and a drag is live.
    pub fn tick_auto_scroll(&mut self) -> Option<Vec2> {
        if self.phase() != DragPhase::Dragging {
            return None;
        }
        let delta = self.autoscroll.tick(self.options.scroll_speed)?;
        self.scroll_offset += delta;
        self.events.push_back(DragEvent::Scrolled {
            offset: self.scroll_offset,
        });
        Some(delta)
    }

    // ------------------------------------------------------------------------
    // Focus (keyboard drag mode)

    /// Set which draggable keyboard gestures (Space/Enter) start from.
    pub fn set_keyboard_focus(&mut self, id: Option<DraggableId>) {
        self.keyboard_focus = match id {
            Some(id) if self.draggables.get(id).is_some() => Some(id),
            _ => None,
        };
    }

    pub fn keyboard_focus(&self) -> Option<DraggableId> {
        self.keyboard_focus
    }

    /// Drop target currently focused by idle Tab-cycling.
    pub fn focused_drop_target(&self) -> Option<DropTargetId> {
        self.focused_target
    }

    // ------------------------------------------------------------------------
    // Session inspection

    pub fn session(&self) -> Option<&DragSession<P>> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> DragPhase {
        self.session
            .as_ref()
            .map_or(DragPhase::Idle, DragSession::phase)
    }

    pub fn drain_events(&mut self) -> Vec<DragEvent<P>> {
        self.events.drain(..).collect()
    }

    // ------------------------------------------------------------------------
    // Input

    /// Feed one raw input event through the unifier and the state machine.
    pub fn handle_input(&mut self, raw: RawInput) {
        // Tab never participates in the unified pointer stream; it cycles
        // focus (idle) or the candidate target (dragging).
        if let RawInput::Key {
            key: Key::Tab,
            pressed: true,
            modifiers,
        } = raw
        {
            self.cycle_tab(modifiers.shift);
            return;
        }

        let anchor = self.keyboard_anchor();
        let Some(event) = self
            .unifier
            .unify(raw, anchor, &self.options.keyboard_steps)
        else {
            return;
        };

        match event.phase {
            UnifiedPhase::Start => self.on_start(event),
            UnifiedPhase::Move => self.on_move(event),
            UnifiedPhase::End { cancelled } => self.resolve_session(cancelled),
        }
    }

    /// Forced teardown (e.g. the engine's owner unmounts): interrupts a session
    /// in any state and always lands in `Idle` with auto-scroll inactive.
    pub fn cancel_active_drag(&mut self) {
        self.unifier.reset();
        if self.session.is_some() {
            self.resolve_session(true);
        } else {
            self.autoscroll.stop();
        }
    }

    fn keyboard_anchor(&self) -> Option<Pos2> {
        let entry = self.draggables.get(self.keyboard_focus?)?;
        if entry.disabled || !entry.rect.is_finite() {
            return None;
        }
        Some(entry.rect.center())
    }

    fn on_start(&mut self, event: UnifiedEvent) {
        if self.session.is_some() {
            // One session per engine. The unifier should already serialize
            // gestures, but a rejected start must not leave it owning one.
            self.unifier.reset();
            return;
        }

        let draggable = match event.source {
            InputSource::Keyboard => self.keyboard_focus,
            InputSource::Pointer | InputSource::Touch => self.draggables.draggable_at(event.pos),
        };
        let Some(id) = draggable else {
            self.unifier.reset();
            return;
        };
        let Some(entry) = self.draggables.get(id) else {
            self.unifier.reset();
            return;
        };
        if entry.disabled {
            self.unifier.reset();
            return;
        }
        if let Some(pred) = &entry.can_drag
            && !call_predicate(pred, &entry.payload)
        {
            if self.options.debug_event_log {
                self.debug_log_event(format!("start rejected by can_drag id={id:?}"));
            }
            self.unifier.reset();
            return;
        }

        let session = DragSession {
            draggable: id,
            payload: entry.payload.clone(),
            kind: entry.kind.clone(),
            source: event.source,
            start_position: event.pos,
            current_position: event.pos,
            drag_offset: event.pos - entry.rect.min,
            drop_target: None,
            can_drop: false,
            phase: DragPhase::Pending,
            constraints: entry.constraints,
            parent_bounds: entry.parent_bounds,
        };
        log::trace!(
            "drag pending: draggable={id:?} source={:?} at ({:.1},{:.1})",
            event.source,
            event.pos.x,
            event.pos.y
        );
        if self.options.debug_event_log {
            self.debug_log_event(format!(
                "session PENDING draggable={id:?} source={:?}",
                event.source
            ));
        }
        self.session = Some(session);
    }

    fn on_move(&mut self, event: UnifiedEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.phase {
            DragPhase::Pending => {
                // Below the threshold the machine tracks position but ignores
                // drop targets entirely — this is what keeps clicks from
                // becoming accidental drags.
                session.current_position = event.pos;
                let displacement = (event.pos - session.start_position).length();
                if displacement < session.constraints.drag_threshold {
                    return;
                }
                session.phase = DragPhase::Dragging;
                let payload = session.payload.clone();
                let offset = session.drag_offset;
                let source = session.source;
                log::trace!("drag started: source={source:?} displacement={displacement:.1}");
                if self.options.debug_event_log {
                    self.debug_log_event(format!("session START source={source:?}"));
                }
                self.events.push_back(DragEvent::Started {
                    payload,
                    offset,
                    source,
                });
                self.process_drag_move(event.pos);
            }
            DragPhase::Dragging => self.process_drag_move(event.pos),
            DragPhase::Idle | DragPhase::Resolved => {}
        }
    }

    /// The per-move pipeline, in its fixed order: constraint resolve, hit test,
    /// `can_drop` recompute, enter/leave, auto-scroll edge update.
    fn process_drag_move(&mut self, raw_pos: Pos2) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let constrained = constraints::resolve_position(
            session.start_position,
            raw_pos,
            &session.constraints,
            session.parent_bounds,
        );
        session.current_position = constrained;

        let payload = session.payload.clone();
        let kind = session.kind.clone();
        let source = session.source;
        let previous = session.drop_target;

        let candidate = self.registry.hit_test(constrained, self.options.hit_test_order);
        let can_drop = candidate
            .is_some_and(|id| self.registry.target_accepts(id, kind.as_deref(), &payload));

        if candidate != previous {
            if let Some(old) = previous {
                self.registry.fire_leave(old, &payload);
            }
            if let Some(new) = candidate {
                self.registry.fire_enter(new, &payload);
            }
            if self.options.debug_event_log {
                self.debug_log_event(format!(
                    "target change {previous:?} -> {candidate:?} can_drop={can_drop}"
                ));
            }
        }
        if let Some(session) = self.session.as_mut() {
            session.set_candidate(candidate, can_drop);
        }

        self.events.push_back(DragEvent::Over {
            payload,
            position: constrained,
            source,
        });

        if let Some(viewport) = self.viewport {
            self.autoscroll
                .update(raw_pos, viewport, self.options.scroll_edge_threshold);
        }
    }

    /// Resolve and tear down the session. Taking the session up-front
    /// guarantees the engine is back in `Idle` with auto-scroll stopped even if
    /// a registrant's callback panics along the way.
    fn resolve_session(&mut self, cancelled: bool) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        self.autoscroll.stop();

        match session.phase {
            DragPhase::Pending => {
                // A click: the threshold was never crossed, so no lifecycle
                // events were promised and none are emitted.
                if self.options.debug_event_log {
                    self.debug_log_event("session END below threshold (click)");
                }
            }
            DragPhase::Dragging => {
                session.phase = DragPhase::Resolved;
                let payload = session.payload.clone();
                let position = session.current_position;
                let dropped = !cancelled && session.can_drop && session.drop_target.is_some();

                if dropped {
                    if let Some(target) = session.drop_target {
                        self.registry.fire_drop(target, &payload, position);
                        self.events.push_back(DragEvent::Dropped {
                            payload: payload.clone(),
                            target,
                            position,
                        });
                    }
                } else if let Some(target) = session.drop_target {
                    // The hovered target never receives the drop; tell it the
                    // payload left.
                    self.registry.fire_leave(target, &payload);
                }

                log::trace!(
                    "drag ended: dropped={dropped} cancelled={cancelled} source={:?}",
                    session.source
                );
                if self.options.debug_event_log {
                    self.debug_log_event(format!(
                        "session END dropped={dropped} cancelled={cancelled}"
                    ));
                }
                self.events.push_back(DragEvent::Ended {
                    payload,
                    dropped,
                    cancelled,
                    source: session.source,
                });
            }
            DragPhase::Idle | DragPhase::Resolved => {}
        }
    }

    // ------------------------------------------------------------------------
    // Tab cycling

    fn cycle_tab(&mut self, reverse: bool) {
        if self.phase() == DragPhase::Dragging {
            self.cycle_drop_candidate(reverse);
        } else if self.session.is_none() {
            self.focused_target = Self::cycle_id(&self.registry.ids(), self.focused_target, reverse);
        }
    }

    /// While dragging, Tab warps the position to the next target's center and
    /// runs it through the normal move pipeline, so constraints and predicates
    /// still apply.
    fn cycle_drop_candidate(&mut self, reverse: bool) {
        let ids = self.registry.ids();
        let current = self.session.as_ref().and_then(|s| s.drop_target);
        let Some(next) = Self::cycle_id(&ids, current, reverse) else {
            return;
        };
        if let Some(center) = self.registry.rect(next).map(|r| r.center()) {
            self.process_drag_move(center);
        }
    }

    fn cycle_id(
        ids: &[DropTargetId],
        current: Option<DropTargetId>,
        reverse: bool,
    ) -> Option<DropTargetId> {
        if ids.is_empty() {
            return None;
        }
        let index = current.and_then(|cur| ids.iter().find_position(|&&id| id == cur).map(|(i, _)| i));
        let next = match (index, reverse) {
            (Some(i), false) => (i + 1) % ids.len(),
            (Some(i), true) => (i + ids.len() - 1) % ids.len(),
            (None, false) => 0,
            (None, true) => ids.len() - 1,
        };
        ids.get(next).copied()
    }
}
