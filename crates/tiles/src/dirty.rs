use bitvec::prelude::{BitVec, Lsb0};

/// Per-slot dirty flags, indexed exactly like the tile grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileDirtyBitset {
    bits: BitVec<usize, Lsb0>,
    dirty_count: usize,
}

impl TileDirtyBitset {
    pub fn new(tile_count: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, tile_count),
            dirty_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_count == 0
    }

    pub fn is_full(&self) -> bool {
        self.dirty_count == self.bits.len() && !self.bits.is_empty()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty_count
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.bits.get(index).is_some_and(|bit| *bit)
    }

    /// Marks one slot; indices past the end are ignored.
    #[inline]
    pub fn set(&mut self, index: usize) {
        let Some(mut slot) = self.bits.get_mut(index) else {
            return;
        };
        if !*slot {
            *slot = true;
            self.dirty_count += 1;
        }
    }

    pub fn clear(&mut self) {
        self.bits.fill(false);
        self.dirty_count = 0;
    }

    pub fn iter_dirty(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }
}
