use egui::{Key, Modifiers, Pos2, Vec2, vec2};

use super::options::KeyboardSteps;

/// Which physical input source produced (or owns) a gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    Touch,
    Keyboard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Raw input as delivered by the host (winit, a browser shim, a test driver).
#[derive(Clone, Copy, Debug)]
pub enum RawInput {
    PointerButton {
        pos: Pos2,
        pressed: bool,
        modifiers: Modifiers,
    },
    PointerMoved {
        pos: Pos2,
        modifiers: Modifiers,
    },
    Touch {
        id: u64,
        phase: TouchPhase,
        pos: Pos2,
        modifiers: Modifiers,
    },
    Key {
        key: Key,
        pressed: bool,
        modifiers: Modifiers,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnifiedPhase {
    Start,
    Move,
    End { cancelled: bool },
}

/// One canonical event, regardless of which device produced it.
#[derive(Clone, Copy, Debug)]
pub struct UnifiedEvent {
    pub pos: Pos2,
    pub modifiers: Modifiers,
    pub phase: UnifiedPhase,
    pub source: InputSource,
}

/// Arrow-key step size. Precise movement wins: Ctrl beats Shift when both are held.
pub(super) fn keyboard_step(modifiers: Modifiers, steps: &KeyboardSteps) -> f32 {
    if modifiers.ctrl {
        steps.fine
    } else if modifiers.shift {
        steps.coarse
    } else {
        steps.base
    }
}

/// Folds mouse, touch, and keyboard input into one start/move/end stream.
///
/// Whichever source emitted `Start` owns the gesture until it ends; input from
/// the other sources is ignored meanwhile. The only cross-source event is
/// `Escape`, which may cancel a gesture owned by any source.
#[derive(Debug, Default)]
pub(super) struct InputUnifier {
    owner: Option<InputSource>,
    active_touch: Option<u64>,
    pointer_down: bool,
    last_pos: Pos2,
}

impl InputUnifier {
    pub(super) fn owner(&self) -> Option<InputSource> {
        self.owner
    }

    /// Forget any gesture in progress (engine rejected the start, or forced teardown).
    pub(super) fn reset(&mut self) {
        self.owner = None;
        self.active_touch = None;
        self.pointer_down = false;
    }

    /// `keyboard_anchor` is the focused draggable's center; a keyboard gesture
    /// cannot start without one.
    pub(super) fn unify(
        &mut self,
        raw: RawInput,
        keyboard_anchor: Option<Pos2>,
        steps: &KeyboardSteps,
    ) -> Option<UnifiedEvent> {
        match raw {
            RawInput::PointerButton {
                pos,
                pressed: true,
                modifiers,
            } => {
                if self.owner.is_some() {
                    return None;
                }
                self.owner = Some(InputSource::Pointer);
                self.pointer_down = true;
                self.emit(pos, modifiers, UnifiedPhase::Start, InputSource::Pointer)
            }
            RawInput::PointerButton {
                pos,
                pressed: false,
                modifiers,
            } => {
                if self.owner != Some(InputSource::Pointer) {
                    return None;
                }
                self.reset();
                self.emit(
                    pos,
                    modifiers,
                    UnifiedPhase::End { cancelled: false },
                    InputSource::Pointer,
                )
            }
            RawInput::PointerMoved { pos, modifiers } => {
                if self.owner != Some(InputSource::Pointer) || !self.pointer_down {
                    return None;
                }
                self.emit(pos, modifiers, UnifiedPhase::Move, InputSource::Pointer)
            }
            RawInput::Touch {
                id,
                phase,
                pos,
                modifiers,
            } => self.unify_touch(id, phase, pos, modifiers),
            RawInput::Key {
                key,
                pressed: true,
                modifiers,
            } => self.unify_key(key, modifiers, keyboard_anchor, steps),
            RawInput::Key { pressed: false, .. } => None,
        }
    }

    fn unify_touch(
        &mut self,
        id: u64,
        phase: TouchPhase,
        pos: Pos2,
        modifiers: Modifiers,
    ) -> Option<UnifiedEvent> {
        match phase {
            TouchPhase::Start => {
                // First active touch point owns the gesture; later fingers are ignored.
                if self.owner.is_some() {
                    return None;
                }
                self.owner = Some(InputSource::Touch);
                self.active_touch = Some(id);
                self.emit(pos, modifiers, UnifiedPhase::Start, InputSource::Touch)
            }
            TouchPhase::Move => {
                if self.owner != Some(InputSource::Touch) || self.active_touch != Some(id) {
                    return None;
                }
                self.emit(pos, modifiers, UnifiedPhase::Move, InputSource::Touch)
            }
            TouchPhase::End | TouchPhase::Cancel => {
                if self.owner != Some(InputSource::Touch) || self.active_touch != Some(id) {
                    return None;
                }
                self.reset();
                self.emit(
                    pos,
                    modifiers,
                    UnifiedPhase::End {
                        cancelled: phase == TouchPhase::Cancel,
                    },
                    InputSource::Touch,
                )
            }
        }
    }

    fn unify_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        keyboard_anchor: Option<Pos2>,
        steps: &KeyboardSteps,
    ) -> Option<UnifiedEvent> {
        match key {
            Key::Escape => {
                let source = self.owner?;
                let pos = self.last_pos;
                self.reset();
                self.emit(pos, modifiers, UnifiedPhase::End { cancelled: true }, source)
            }
            Key::Space | Key::Enter => match self.owner {
                None => {
                    let anchor = keyboard_anchor?;
                    self.owner = Some(InputSource::Keyboard);
                    self.emit(anchor, modifiers, UnifiedPhase::Start, InputSource::Keyboard)
                }
                Some(InputSource::Keyboard) => {
                    let pos = self.last_pos;
                    self.reset();
                    self.emit(
                        pos,
                        modifiers,
                        UnifiedPhase::End { cancelled: false },
                        InputSource::Keyboard,
                    )
                }
                Some(_) => None,
            },
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                if self.owner != Some(InputSource::Keyboard) {
                    return None;
                }
                let step = keyboard_step(modifiers, steps);
                let delta: Vec2 = match key {
                    Key::ArrowLeft => vec2(-step, 0.0),
                    Key::ArrowRight => vec2(step, 0.0),
                    Key::ArrowUp => vec2(0.0, -step),
                    _ => vec2(0.0, step),
                };
                let pos = self.last_pos + delta;
                self.emit(pos, modifiers, UnifiedPhase::Move, InputSource::Keyboard)
            }
            _ => None,
        }
    }

    fn emit(
        &mut self,
        pos: Pos2,
        modifiers: Modifiers,
        phase: UnifiedPhase,
        source: InputSource,
    ) -> Option<UnifiedEvent> {
        self.last_pos = pos;
        Some(UnifiedEvent {
            pos,
            modifiers,
            phase,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn steps() -> KeyboardSteps {
        KeyboardSteps::default()
    }

    fn press(pos: Pos2) -> RawInput {
        RawInput::PointerButton {
            pos,
            pressed: true,
            modifiers: Modifiers::default(),
        }
    }

    fn key(key: Key, modifiers: Modifiers) -> RawInput {
        RawInput::Key {
            key,
            pressed: true,
            modifiers,
        }
    }

    #[test]
    fn step_precedence_ctrl_wins() {
        let s = steps();
        assert_eq!(keyboard_step(Modifiers::default(), &s), 5.0);
        assert_eq!(keyboard_step(Modifiers::SHIFT, &s), 10.0);
        assert_eq!(keyboard_step(Modifiers::CTRL, &s), 1.0);
        assert_eq!(keyboard_step(Modifiers::CTRL | Modifiers::SHIFT, &s), 1.0);
    }

    #[test]
    fn first_touch_owns_the_gesture() {
        let mut u = InputUnifier::default();
        let m = Modifiers::default();
        let ev = u
            .unify(
                RawInput::Touch {
                    id: 7,
                    phase: TouchPhase::Start,
                    pos: pos2(1.0, 1.0),
                    modifiers: m,
                },
                None,
                &steps(),
            )
            .unwrap();
        assert_eq!(ev.phase, UnifiedPhase::Start);
        assert_eq!(ev.source, InputSource::Touch);

        // A second finger must not disturb the stream.
        assert!(
            u.unify(
                RawInput::Touch {
                    id: 8,
                    phase: TouchPhase::Start,
                    pos: pos2(9.0, 9.0),
                    modifiers: m,
                },
                None,
                &steps(),
            )
            .is_none()
        );
        assert!(
            u.unify(
                RawInput::Touch {
                    id: 8,
                    phase: TouchPhase::Move,
                    pos: pos2(9.0, 9.0),
                    modifiers: m,
                },
                None,
                &steps(),
            )
            .is_none()
        );

        let ev = u
            .unify(
                RawInput::Touch {
                    id: 7,
                    phase: TouchPhase::End,
                    pos: pos2(2.0, 2.0),
                    modifiers: m,
                },
                None,
                &steps(),
            )
            .unwrap();
        assert_eq!(ev.phase, UnifiedPhase::End { cancelled: false });
    }

    #[test]
    fn touch_cancel_reports_cancelled() {
        let mut u = InputUnifier::default();
        let m = Modifiers::default();
        u.unify(
            RawInput::Touch {
                id: 1,
                phase: TouchPhase::Start,
                pos: pos2(0.0, 0.0),
                modifiers: m,
            },
            None,
            &steps(),
        );
        let ev = u
            .unify(
                RawInput::Touch {
                    id: 1,
                    phase: TouchPhase::Cancel,
                    pos: pos2(0.0, 0.0),
                    modifiers: m,
                },
                None,
                &steps(),
            )
            .unwrap();
        assert_eq!(ev.phase, UnifiedPhase::End { cancelled: true });
    }

    #[test]
    fn keyboard_start_requires_anchor() {
        let mut u = InputUnifier::default();
        assert!(
            u.unify(key(Key::Space, Modifiers::default()), None, &steps())
                .is_none()
        );
        let ev = u
            .unify(
                key(Key::Space, Modifiers::default()),
                Some(pos2(50.0, 60.0)),
                &steps(),
            )
            .unwrap();
        assert_eq!(ev.phase, UnifiedPhase::Start);
        assert_eq!(ev.pos, pos2(50.0, 60.0));
        assert_eq!(ev.source, InputSource::Keyboard);
    }

    #[test]
    fn arrow_keys_move_from_last_position() {
        let mut u = InputUnifier::default();
        u.unify(
            key(Key::Enter, Modifiers::default()),
            Some(pos2(100.0, 100.0)),
            &steps(),
        );
        let ev = u
            .unify(key(Key::ArrowRight, Modifiers::default()), None, &steps())
            .unwrap();
        assert_eq!(ev.pos, pos2(105.0, 100.0));
        let ev = u
            .unify(key(Key::ArrowDown, Modifiers::SHIFT), None, &steps())
            .unwrap();
        assert_eq!(ev.pos, pos2(105.0, 110.0));
        let ev = u
            .unify(key(Key::ArrowLeft, Modifiers::CTRL), None, &steps())
            .unwrap();
        assert_eq!(ev.pos, pos2(104.0, 110.0));
    }

    #[test]
    fn escape_cancels_any_owner() {
        let mut u = InputUnifier::default();
        u.unify(press(pos2(3.0, 3.0)), None, &steps());
        let ev = u
            .unify(key(Key::Escape, Modifiers::default()), None, &steps())
            .unwrap();
        assert_eq!(ev.phase, UnifiedPhase::End { cancelled: true });
        assert!(u.owner().is_none());
    }

    #[test]
    fn space_does_not_commit_a_pointer_gesture() {
        let mut u = InputUnifier::default();
        u.unify(press(pos2(3.0, 3.0)), None, &steps());
        assert!(
            u.unify(key(Key::Space, Modifiers::default()), None, &steps())
                .is_none()
        );
        assert_eq!(u.owner(), Some(InputSource::Pointer));
    }
}
