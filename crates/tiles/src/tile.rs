use crate::error::TileAllocError;

/// One square block of single-byte samples, row-major.
///
/// A tile is only ever owned by a grid slot; moving it between grids moves
/// the box, never the samples.
#[derive(Clone, PartialEq, Eq)]
pub struct Tile<const TILE_SIZE: u32> {
    samples: Box<[u8]>,
}

impl<const TILE_SIZE: u32> Tile<TILE_SIZE> {
    pub const LEN: usize = TILE_SIZE as usize * TILE_SIZE as usize;

    /// Allocates a tile with every sample set to `value`, reporting
    /// allocation failure instead of aborting.
    pub fn try_filled(value: u8) -> Result<Self, TileAllocError> {
        let mut samples = Vec::new();
        samples.try_reserve_exact(Self::LEN)?;
        samples.resize(Self::LEN, value);
        Ok(Self {
            samples: samples.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.samples
    }

    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// Samples of one row inside the tile.
    pub fn row(&self, row: usize) -> &[u8] {
        let width = TILE_SIZE as usize;
        &self.samples[row * width..(row + 1) * width]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        let width = TILE_SIZE as usize;
        &mut self.samples[row * width..(row + 1) * width]
    }

    pub fn fill(&mut self, value: u8) {
        self.samples.fill(value);
    }
}

impl<const TILE_SIZE: u32> std::fmt::Debug for Tile<TILE_SIZE> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Tile")
            .field("size", &TILE_SIZE)
            .finish_non_exhaustive()
    }
}
