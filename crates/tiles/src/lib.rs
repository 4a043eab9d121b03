//! Tiled, lazily allocated storage for one raster channel.
//!
//! [`TiledChannelBuffer`] keeps a row-major grid of optional square tiles.
//! Tiles appear when [`TiledChannelBuffer::allocate_rect`] first covers them
//! and are never copied afterwards: growing the grid moves tile ownership
//! into a larger slot array. The raw content can be streamed out and back in
//! tile-major order through [`TileSink`] and [`TileSource`].

use static_assertions::const_assert;

pub use model::{ChannelKind, DEFAULT_TILE_SIZE, Rect, TileGridLayout, TilePos};

const_assert!(DEFAULT_TILE_SIZE > 0);
const_assert!(DEFAULT_TILE_SIZE.is_power_of_two());

/// Channel buffer with the engine-wide tile size.
pub type ChannelBuffer = TiledChannelBuffer<DEFAULT_TILE_SIZE>;

/// Construction parameters of a channel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    pub kind: ChannelKind,
    /// Replaces the kind's fill byte for freshly allocated tiles.
    pub default_fill: Option<u8>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::for_kind(ChannelKind::Color)
    }
}

impl ChannelConfig {
    pub const fn for_kind(kind: ChannelKind) -> Self {
        Self {
            kind,
            default_fill: None,
        }
    }

    pub const fn fill_value(&self) -> u8 {
        match self.default_fill {
            Some(value) => value,
            None => self.kind.default_fill(),
        }
    }
}

mod channel;
mod dirty;
mod error;
mod grid;
mod region;
mod shared;
mod stream;
mod tile;

pub use channel::TiledChannelBuffer;
pub use dirty::TileDirtyBitset;
pub use error::{ExtentError, PixelAccessError, RegionError, StreamError, TileAllocError};
pub use shared::{SharedBufferError, SharedChannelBuffer};
pub use stream::{IoSink, IoSource, MemoryStore, TileSink, TileSource};
pub use tile::Tile;
