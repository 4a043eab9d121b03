use std::io;

use model::GridLayoutError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileAllocError {
    #[error("tile memory allocation failed")]
    OutOfMemory,
    #[error("tile grid would exceed the addressable canvas")]
    GridOverflow,
}

impl From<GridLayoutError> for TileAllocError {
    fn from(_: GridLayoutError) -> Self {
        TileAllocError::GridOverflow
    }
}

impl From<std::collections::TryReserveError> for TileAllocError {
    fn from(_: std::collections::TryReserveError) -> Self {
        TileAllocError::OutOfMemory
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtentError {
    #[error(transparent)]
    Alloc(#[from] TileAllocError),
    #[error("image rect is not contained in the tile grid")]
    ImageOutsideGrid,
}

/// Returned by the checked pixel accessors only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PixelAccessError {
    #[error("pixel ({x}, {y}) is outside the image rect")]
    OutsideImage { x: i32, y: i32 },
    #[error("pixel ({x}, {y}) lies in a tile that was never allocated")]
    TileAbsent { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("row stride {stride} is smaller than region width {width}")]
    StrideTooSmall { stride: usize, width: u32 },
    #[error("linear buffer holds {actual} bytes, region needs {required}")]
    BufferTooShort { required: usize, actual: usize },
    #[error(transparent)]
    Alloc(#[from] TileAllocError),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("backing store is not open")]
    StoreClosed,
    #[error("tile slot {index} is absent and cannot be serialized")]
    AbsentTile { index: usize },
    #[error(transparent)]
    Alloc(#[from] TileAllocError),
    #[error("tile stream i/o failed: {0}")]
    Io(#[from] io::Error),
}
