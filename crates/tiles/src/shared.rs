use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use model::Rect;
use thiserror::Error;

use crate::channel::TiledChannelBuffer;
use crate::error::{StreamError, TileAllocError};
use crate::stream::{TileSink, TileSource};

#[derive(Debug, Error)]
pub enum SharedBufferError {
    #[error("channel buffer lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Alloc(#[from] TileAllocError),
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Channel buffer behind one read-write lock.
///
/// Growth, translation, pixel writes and stream reads take the write lock;
/// pixel reads and stream writes share the read lock, so no reader ever sees
/// a grid halfway through a resize.
#[derive(Debug, Clone)]
pub struct SharedChannelBuffer<const TILE_SIZE: u32> {
    inner: Arc<RwLock<TiledChannelBuffer<TILE_SIZE>>>,
}

impl<const TILE_SIZE: u32> SharedChannelBuffer<TILE_SIZE> {
    pub fn new(buffer: TiledChannelBuffer<TILE_SIZE>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(buffer)),
        }
    }

    pub fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, TiledChannelBuffer<TILE_SIZE>>, SharedBufferError> {
        self.inner.read().map_err(|_| SharedBufferError::Poisoned)
    }

    pub fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, TiledChannelBuffer<TILE_SIZE>>, SharedBufferError> {
        self.inner.write().map_err(|_| SharedBufferError::Poisoned)
    }

    pub fn get(&self, x: i32, y: i32) -> Result<u8, SharedBufferError> {
        Ok(self.read()?.get(x, y))
    }

    pub fn set(&self, x: i32, y: i32, value: u8) -> Result<(), SharedBufferError> {
        self.write()?.set(x, y, value);
        Ok(())
    }

    pub fn image_rect(&self) -> Result<Rect, SharedBufferError> {
        Ok(self.read()?.image_rect())
    }

    pub fn allocate_rect(&self, rect: Rect) -> Result<(), SharedBufferError> {
        self.write()?.allocate_rect(rect)?;
        Ok(())
    }

    pub fn move_by(&self, dx: i32, dy: i32) -> Result<(), SharedBufferError> {
        self.write()?.move_by(dx, dy);
        Ok(())
    }

    pub fn write_to(&self, sink: &mut dyn TileSink) -> Result<(), SharedBufferError> {
        self.read()?.write_to(sink)?;
        Ok(())
    }

    pub fn read_from(&self, source: &mut dyn TileSource) -> Result<(), SharedBufferError> {
        self.write()?.read_from(source)?;
        Ok(())
    }

    /// Unwraps the buffer when this is the last handle.
    pub fn try_unwrap(self) -> Result<TiledChannelBuffer<TILE_SIZE>, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => Ok(lock.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())),
            Err(inner) => Err(Self { inner }),
        }
    }
}
