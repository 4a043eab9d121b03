//! Tile slot storage and the transactional regrid.
//!
//! A regrid happens in two phases. `plan` performs every fallible step
//! (slot array for the new layout, freshly filled tiles for the sweep) while
//! the current grid stays untouched; `commit` then moves tile ownership into
//! the new array and cannot fail.

use model::{Rect, TileGridLayout, TilePos};

use crate::dirty::TileDirtyBitset;
use crate::error::TileAllocError;
use crate::tile::Tile;

#[derive(Debug, Clone)]
pub(crate) struct TileGrid<const TILE_SIZE: u32> {
    layout: TileGridLayout<TILE_SIZE>,
    // slots.len() == layout.max_tiles() == dirty.len()
    slots: Vec<Option<Tile<TILE_SIZE>>>,
    dirty: TileDirtyBitset,
}

/// Everything a commit needs, built without touching the live grid.
pub(crate) struct GridPlan<const TILE_SIZE: u32> {
    layout: TileGridLayout<TILE_SIZE>,
    resized: Option<Resize<TILE_SIZE>>,
    staged: Vec<(usize, Tile<TILE_SIZE>)>,
}

struct Resize<const TILE_SIZE: u32> {
    slots: Vec<Option<Tile<TILE_SIZE>>>,
    offset: TilePos,
}

impl<const TILE_SIZE: u32> GridPlan<TILE_SIZE> {
    pub(crate) fn staged_count(&self) -> usize {
        self.staged.len()
    }

    pub(crate) fn resizes(&self) -> bool {
        self.resized.is_some()
    }
}

fn absent_slots<const TILE_SIZE: u32>(
    count: usize,
) -> Result<Vec<Option<Tile<TILE_SIZE>>>, TileAllocError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(count)?;
    slots.resize_with(count, || None);
    Ok(slots)
}

impl<const TILE_SIZE: u32> TileGrid<TILE_SIZE> {
    pub(crate) fn empty() -> Self {
        Self {
            layout: TileGridLayout::EMPTY,
            slots: Vec::new(),
            dirty: TileDirtyBitset::default(),
        }
    }

    pub(crate) fn layout(&self) -> TileGridLayout<TILE_SIZE> {
        self.layout
    }

    #[inline]
    pub(crate) fn slot(&self, index: usize) -> Option<&Tile<TILE_SIZE>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut Tile<TILE_SIZE>> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn present_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub(crate) fn first_absent(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub(crate) fn iter_present(&self) -> impl Iterator<Item = (usize, &Tile<TILE_SIZE>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|tile| (index, tile)))
    }

    pub(crate) fn dirty(&self) -> &TileDirtyBitset {
        &self.dirty
    }

    pub(crate) fn dirty_mut(&mut self) -> &mut TileDirtyBitset {
        &mut self.dirty
    }

    pub(crate) fn translate(&mut self, dx: i32, dy: i32) {
        self.layout = self.layout.translated(dx, dy);
    }

    /// Prepares a grid with `layout` (which must contain the current one on
    /// the same lattice) where every slot overlapping `sweep` is present.
    pub(crate) fn plan(
        &self,
        layout: TileGridLayout<TILE_SIZE>,
        sweep: Rect,
        fill: u8,
    ) -> Result<GridPlan<TILE_SIZE>, TileAllocError> {
        let offset = self
            .layout
            .offset_within(&layout)
            .ok_or(TileAllocError::GridOverflow)?;
        let resized = if layout == self.layout {
            None
        } else {
            Some(Resize {
                slots: absent_slots(layout.max_tiles())?,
                offset,
            })
        };

        let mut staged = Vec::new();
        if let Some(span) = layout.tile_span(sweep) {
            for pos in span.iter() {
                if self.is_present_at(pos, offset) {
                    continue;
                }
                let index = layout.tile_index(pos)?;
                staged.try_reserve(1)?;
                staged.push((index, Tile::try_filled(fill)?));
            }
        }

        Ok(GridPlan {
            layout,
            resized,
            staged,
        })
    }

    /// Whether every slot overlapping `rect` is present. False as soon as
    /// `rect` reaches outside the grid.
    pub(crate) fn covers(&self, rect: Rect) -> bool {
        if !self.layout.pixel_rect().contains(rect) {
            return false;
        }
        let Some(span) = self.layout.tile_span(rect) else {
            return rect.is_empty();
        };
        span.iter()
            .all(|pos| self.is_present_at(pos, TilePos { x: 0, y: 0 }))
    }

    /// Puts `tile` into an absent slot and marks it dirty. Returns false
    /// when the slot does not exist or is already taken.
    pub(crate) fn install(&mut self, index: usize, tile: Tile<TILE_SIZE>) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(tile);
        self.dirty.set(index);
        true
    }

    /// Whether the slot that lands on `pos` after shifting by `offset` is
    /// already present in this grid.
    fn is_present_at(&self, pos: TilePos, offset: TilePos) -> bool {
        let (Some(x), Some(y)) = (pos.x.checked_sub(offset.x), pos.y.checked_sub(offset.y)) else {
            return false;
        };
        self.layout
            .tile_index(TilePos { x, y })
            .is_ok_and(|index| self.slots[index].is_some())
    }

    /// Installs a plan. Returns how many existing tiles changed slots.
    pub(crate) fn commit(&mut self, plan: GridPlan<TILE_SIZE>) -> usize {
        let GridPlan {
            layout,
            resized,
            staged,
        } = plan;

        let mut moved = 0;
        if let Some(Resize { mut slots, offset }) = resized {
            let mut dirty = TileDirtyBitset::new(slots.len());
            let old_row = self.layout.tiles_per_row() as usize;
            let new_row = layout.tiles_per_row() as usize;
            for (old_index, slot) in self.slots.iter_mut().enumerate() {
                let col = old_index % old_row + offset.x as usize;
                let row = old_index / old_row + offset.y as usize;
                let new_index = row * new_row + col;
                if self.dirty.is_dirty(old_index) {
                    dirty.set(new_index);
                }
                if let Some(tile) = slot.take() {
                    slots[new_index] = Some(tile);
                    moved += 1;
                }
            }
            self.slots = slots;
            self.dirty = dirty;
            self.layout = layout;
        }

        for (index, tile) in staged {
            self.slots[index] = Some(tile);
            self.dirty.set(index);
        }
        moved
    }

    /// Allocates every absent slot of the current layout.
    pub(crate) fn fill_absent(&mut self, fill: u8) -> Result<usize, TileAllocError> {
        let plan = self.plan(self.layout, self.layout.pixel_rect(), fill)?;
        let allocated = plan.staged_count();
        self.commit(plan);
        Ok(allocated)
    }
}
