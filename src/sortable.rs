//! Linear-collection adapter: translates engine drops into list reorders.

use egui::Rect;

use crate::engine::{
    DragEngine, DragEvent, DraggableId, DraggableOptions, DropTargetId, DropTargetOptions,
};

/// Move the item at `from` to `to`, shifting everything in between.
///
/// The output is always a permutation of the input (nothing created or
/// destroyed), and items not involved in the move keep their relative order.
/// Out-of-range indices are a no-op.
pub fn apply_reorder<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from == to {
        return true;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Wraps [`DragEngine`] for an ordered collection: one draggable and one drop
/// slot per item, payload = source index.
///
/// The owner pushes slot rects each layout pass via [`Self::sync_slots`] and
/// forwards drained engine events to [`Self::handle_event`]; on a successful
/// drop the list reorders itself and invokes `on_reorder`.
pub struct SortableList<T> {
    items: Vec<T>,
    draggables: Vec<DraggableId>,
    slots: Vec<DropTargetId>,
    on_reorder: Option<Box<dyn FnMut(&[T])>>,
}

impl<T> SortableList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            draggables: Vec::new(),
            slots: Vec::new(),
            on_reorder: None,
        }
    }

    pub fn with_on_reorder(items: Vec<T>, on_reorder: impl FnMut(&[T]) + 'static) -> Self {
        Self {
            on_reorder: Some(Box::new(on_reorder)),
            ..Self::new(items)
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// (Re-)register one draggable and one drop slot per item with the current
    /// row rects. Previous registrations are removed first, so calling this on
    /// every layout change cannot leak registry entries.
    pub fn sync_slots(&mut self, engine: &mut DragEngine<usize>, slot_rects: &[Rect]) {
        self.detach(engine);
        for (index, &rect) in slot_rects.iter().take(self.items.len()).enumerate() {
            self.draggables
                .push(engine.register_draggable(rect, index, DraggableOptions::default()));
            self.slots
                .push(engine.register_drop_target(rect, index, DropTargetOptions::default()));
        }
    }

    /// Deregister everything this list owns. Must be called when the list's UI
    /// unmounts; leaked slots would keep hit-testing forever.
    pub fn detach(&mut self, engine: &mut DragEngine<usize>) {
        for id in self.draggables.drain(..) {
            engine.remove_draggable(id);
        }
        for id in self.slots.drain(..) {
            engine.remove_drop_target(id);
        }
    }

    /// React to a drained engine event. Returns the `(from, to)` move when the
    /// event completed a reorder.
    pub fn handle_event(&mut self, event: &DragEvent<usize>) -> Option<(usize, usize)> {
        let DragEvent::Dropped {
            payload: from,
            target,
            ..
        } = event
        else {
            return None;
        };
        let to = self.slots.iter().position(|id| id == target)?;
        if *from == to {
            // Dropped back onto its own slot: nothing moved, no callback.
            return None;
        }
        if !apply_reorder(&mut self.items, *from, to) {
            return None;
        }
        if let Some(cb) = self.on_reorder.as_mut() {
            cb(&self.items);
        }
        Some((*from, to))
    }
}
