//! Raw tile stream: tiles in row-major tile order, samples row-major inside
//! each tile, no header and no length prefix.
//!
//! The stream is exactly `TILE_SIZE² × x_tile_count × y_tile_count` bytes.
//! Grid dimensions are not recorded; whoever reads the stream must shape the
//! buffer first.

use std::io;
use std::mem;

use tracing::warn;

use crate::channel::TiledChannelBuffer;
use crate::error::StreamError;
use crate::tile::Tile;

/// Sequential byte sink a channel can be written to.
pub trait TileSink {
    fn is_open(&self) -> bool {
        true
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Sequential byte source a channel can be read from.
pub trait TileSource {
    fn is_open(&self) -> bool {
        true
    }

    /// Reads up to `dst.len()` bytes and returns the count. Zero means the
    /// source is exhausted.
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize>;
}

/// Adapts any [`io::Write`] into a [`TileSink`].
#[derive(Debug)]
pub struct IoSink<W>(pub W);

impl<W: io::Write> TileSink for IoSink<W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.0.write_all(bytes)
    }
}

/// Adapts any [`io::Read`] into a [`TileSource`].
#[derive(Debug)]
pub struct IoSource<R>(pub R);

impl<R: io::Read> TileSource for IoSource<R> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.0.read(dst) {
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }
}

/// In-memory store with an explicit open/closed state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    bytes: Vec<u8>,
    position: usize,
    open: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An open, empty store.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            position: 0,
            open: true,
        }
    }

    /// An open store positioned at the start of `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            position: 0,
            open: true,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.position = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl TileSink for MemoryStore {
    fn is_open(&self) -> bool {
        self.open
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "store is closed"));
        }
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }
}

impl TileSource for MemoryStore {
    fn is_open(&self) -> bool {
        self.open
    }

    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "store is closed"));
        }
        let remaining = &self.bytes[self.position..];
        let count = remaining.len().min(dst.len());
        dst[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        Ok(count)
    }
}

fn read_exact(source: &mut dyn TileSource, dst: &mut [u8]) -> io::Result<()> {
    let mut filled = 0;
    while filled < dst.len() {
        let count = source.read(&mut dst[filled..])?;
        if count == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("tile stream ended after {filled} of {} bytes", dst.len()),
            ));
        }
        filled += count;
    }
    Ok(())
}

impl<const TILE_SIZE: u32> TiledChannelBuffer<TILE_SIZE> {
    /// Byte length of the raw stream for the current grid.
    pub fn stream_len(&self) -> usize {
        Tile::<TILE_SIZE>::LEN * self.tile_count()
    }

    /// Writes every tile to `sink`.
    ///
    /// All slots must be present; an absent slot fails the call before any
    /// byte is written. Call [`fill_absent_tiles`](Self::fill_absent_tiles)
    /// first to serialize a sparse buffer.
    pub fn write_to(&self, sink: &mut dyn TileSink) -> Result<(), StreamError> {
        if !sink.is_open() {
            return Err(StreamError::StoreClosed);
        }
        if let Some(index) = self.grid().first_absent() {
            return Err(StreamError::AbsentTile { index });
        }
        for (index, tile) in self.grid().iter_present() {
            sink.write(tile.bytes()).inspect_err(|error| {
                warn!(tile_index = index, %error, "tile stream write failed");
            })?;
        }
        Ok(())
    }

    /// Overwrites every tile from `source`, the inverse of
    /// [`write_to`](Self::write_to).
    ///
    /// The grid must already have the shape the stream was written with.
    /// Each tile is replaced only once all of its bytes have arrived, and an
    /// absent slot becomes present only at that point. A short stream
    /// reports `UnexpectedEof` and leaves the tail slots, present or absent,
    /// as they were.
    pub fn read_from(&mut self, source: &mut dyn TileSource) -> Result<(), StreamError> {
        if !source.is_open() {
            return Err(StreamError::StoreClosed);
        }
        let fill = self.default_fill();
        let mut scratch = Tile::<TILE_SIZE>::try_filled(fill)?;
        for index in 0..self.tile_count() {
            read_exact(source, scratch.bytes_mut()).inspect_err(|error| {
                warn!(tile_index = index, %error, "tile stream read failed");
            })?;
            let grid = self.grid_mut();
            match grid.slot_mut(index) {
                Some(tile) => {
                    tile.bytes_mut().copy_from_slice(scratch.bytes());
                    grid.dirty_mut().set(index);
                }
                None => {
                    let next = Tile::try_filled(fill)?;
                    grid.install(index, mem::replace(&mut scratch, next));
                }
            }
        }
        Ok(())
    }
}
