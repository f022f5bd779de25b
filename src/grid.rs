//! Responsive 2-D grid adapter: maps grid cells to pixel rects per breakpoint
//! and applies engine drops as cell moves.

use egui::{Pos2, Rect, pos2, vec2};

use crate::engine::DragEvent;

/// One width threshold in the responsive table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Breakpoint {
    pub name: String,
    /// The breakpoint is active when `container_width >= min_width` (and no
    /// later entry in the table also satisfies that).
    pub min_width: f32,
    pub cols: u32,
}

impl Breakpoint {
    pub fn new(name: impl Into<String>, min_width: f32, cols: u32) -> Self {
        Self {
            name: name.into(),
            min_width,
            cols,
        }
    }

    /// The conventional dashboard table: lg/md/sm/xs/xxs, widest last.
    pub fn default_table() -> Vec<Self> {
        vec![
            Self::new("xxs", 0.0, 2),
            Self::new("xs", 480.0, 4),
            Self::new("sm", 768.0, 6),
            Self::new("md", 996.0, 10),
            Self::new("lg", 1200.0, 12),
        ]
    }
}

/// A grid region in cell units: origin `(x, y)`, span `(w, h)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridCell {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// A placed item. The id is caller-chosen and doubles as the engine payload in
/// the usual composition (`DragEngine<u64>`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridItem {
    pub id: u64,
    pub cell: GridCell,
}

/// Cell ⇄ pixel mapping plus occupancy for a responsive dashboard grid.
///
/// Column width follows the standard formula
/// `(container_width − 2·padding − (cols − 1)·margin) / cols`, recomputed
/// whenever the container width moves across a breakpoint. Occupancy checks
/// live here, not in the base engine: the engine only reports where a payload
/// was dropped.
pub struct GridLayout {
    breakpoints: Vec<Breakpoint>,
    container_width: f32,
    margin: f32,
    padding: f32,
    row_height: f32,
    items: Vec<GridItem>,
}

impl GridLayout {
    /// `breakpoints` must be ordered by ascending `min_width`; the active entry
    /// is the last one the container width still satisfies. An empty table is
    /// normalized to a single 1-column entry so geometry queries stay total.
    pub fn new(breakpoints: Vec<Breakpoint>, margin: f32, padding: f32, row_height: f32) -> Self {
        debug_assert!(
            breakpoints
                .windows(2)
                .all(|pair| pair[0].min_width <= pair[1].min_width),
            "breakpoints must be sorted by min_width"
        );
        let breakpoints = if breakpoints.is_empty() {
            vec![Breakpoint::new("default", 0.0, 1)]
        } else {
            breakpoints
        };
        Self {
            breakpoints,
            container_width: 0.0,
            margin,
            padding,
            row_height,
            items: Vec::new(),
        }
    }

    /// Returns true when the active breakpoint changed, i.e. cell → pixel
    /// mappings are now stale and any cached rects must be recomputed.
    pub fn set_container_width(&mut self, width: f32) -> bool {
        let before = self.active_breakpoint_index();
        self.container_width = width;
        before != self.active_breakpoint_index()
    }

    pub fn container_width(&self) -> f32 {
        self.container_width
    }

    fn active_breakpoint_index(&self) -> usize {
        self.breakpoints
            .iter()
            .rposition(|bp| bp.min_width <= self.container_width)
            .unwrap_or(0)
    }

    pub fn active_breakpoint(&self) -> &Breakpoint {
        &self.breakpoints[self.active_breakpoint_index()]
    }

    pub fn cols(&self) -> u32 {
        self.active_breakpoint().cols.max(1)
    }

    pub fn column_width(&self) -> f32 {
        let cols = self.cols();
        (self.container_width - 2.0 * self.padding - (cols - 1) as f32 * self.margin)
            / cols as f32
    }

    /// Pixel rect for a cell region under the current breakpoint.
    pub fn cell_to_rect(&self, cell: GridCell) -> Rect {
        let col_w = self.column_width();
        let x = self.padding + cell.x as f32 * (col_w + self.margin);
        let y = self.padding + cell.y as f32 * (self.row_height + self.margin);
        let w = cell.w as f32 * col_w + cell.w.saturating_sub(1) as f32 * self.margin;
        let h = cell.h as f32 * self.row_height + cell.h.saturating_sub(1) as f32 * self.margin;
        Rect::from_min_size(pos2(x, y), vec2(w, h))
    }

    /// Inverse mapping: the cell origin under a pixel position, clamped into
    /// the grid's column range.
    pub fn cell_origin_at(&self, pos: Pos2) -> (u32, u32) {
        let col_w = self.column_width();
        let cx = if col_w + self.margin > 0.0 {
            ((pos.x - self.padding) / (col_w + self.margin)).floor().max(0.0) as u32
        } else {
            0
        };
        let cy = if self.row_height + self.margin > 0.0 {
            ((pos.y - self.padding) / (self.row_height + self.margin))
                .floor()
                .max(0.0) as u32
        } else {
            0
        };
        (cx.min(self.cols().saturating_sub(1)), cy)
    }

    // ------------------------------------------------------------------------
    // Items / occupancy

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn item(&self, id: u64) -> Option<&GridItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Insert fails on duplicate ids, occupied regions, and out-of-bounds columns.
    pub fn insert_item(&mut self, item: GridItem) -> bool {
        if self.item(item.id).is_some() || !self.region_ok(item.cell, None) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove_item(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Is the region free (ignoring `ignoring`, normally the moved item itself)?
    pub fn is_free(&self, cell: GridCell, ignoring: Option<u64>) -> bool {
        self.items
            .iter()
            .filter(|item| Some(item.id) != ignoring)
            .all(|item| !item.cell.overlaps(&cell))
    }

    fn region_ok(&self, cell: GridCell, ignoring: Option<u64>) -> bool {
        cell.w >= 1
            && cell.h >= 1
            // Overflowing spans are out of bounds, not a panic.
            && cell.x.checked_add(cell.w).is_some_and(|end| end <= self.cols())
            && self.is_free(cell, ignoring)
    }

    /// Move an item's origin to `(x, y)`, keeping its span. Rejected when the
    /// target region is occupied or out of bounds.
    pub fn apply_drop(&mut self, id: u64, x: u32, y: u32) -> bool {
        let Some(current) = self.item(id).copied() else {
            return false;
        };
        let target = GridCell::new(x, y, current.cell.w, current.cell.h);
        if !self.region_ok(target, Some(id)) {
            return false;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.cell = target;
        }
        true
    }

    /// Convenience for the usual composition with `DragEngine<u64>`: resolve a
    /// `Dropped` event's position to a cell origin and move the item there.
    pub fn handle_event(&mut self, event: &DragEvent<u64>) -> Option<GridCell> {
        let DragEvent::Dropped {
            payload: id,
            position,
            ..
        } = event
        else {
            return None;
        };
        let (x, y) = self.cell_origin_at(*position);
        if self.apply_drop(*id, x, y) {
            self.item(*id).map(|item| item.cell)
        } else {
            None
        }
    }
}
