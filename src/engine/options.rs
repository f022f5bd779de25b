/// Arrow-key movement steps, in points per key press.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyboardSteps {
    pub base: f32,
    /// With Shift held.
    pub coarse: f32,
    /// With Ctrl held. Ctrl wins over Shift when both are held.
    pub fine: f32,
}

impl Default for KeyboardSteps {
    fn default() -> Self {
        Self {
            base: 5.0,
            coarse: 10.0,
            fine: 1.0,
        }
    }
}

/// How overlapping drop regions are resolved by the hit tester.
///
/// The engine does not know the visual stacking order of its registrants, so
/// the tie-break has to be an explicit policy rather than an accident of
/// iteration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitTestOrder {
    /// First registered wins. Deterministic and cheap; the default.
    #[default]
    RegistrationOrder,
    /// Last registered wins. Matches paint order for UIs that draw later
    /// registrations on top.
    TopmostFirst,
}

/// Options for [`super::DragEngine`].
#[derive(Clone, Debug)]
pub struct DragEngineOptions {
    /// Distance from a viewport edge (in points) that triggers auto-scrolling
    /// while a drag is active.
    pub scroll_edge_threshold: f32,

    /// Auto-scroll speed in points per tick. The host drives ticks, nominally
    /// every ~16 ms.
    pub scroll_speed: f32,

    pub keyboard_steps: KeyboardSteps,

    pub hit_test_order: HitTestOrder,

    /// If true, record engine decisions (session start/end, target changes,
    /// rejected starts) in a small ring buffer for easy copy-paste debugging.
    pub debug_event_log: bool,

    /// Maximum number of debug log lines to keep (ring buffer).
    pub debug_event_log_capacity: usize,
}

impl Default for DragEngineOptions {
    fn default() -> Self {
        Self {
            scroll_edge_threshold: 40.0,
            scroll_speed: 10.0,
            keyboard_steps: KeyboardSteps::default(),
            hit_test_order: HitTestOrder::default(),
            debug_event_log: false,
            debug_event_log_capacity: 200,
        }
    }
}
