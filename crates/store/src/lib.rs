//! Framed persistence for one channel buffer.
//!
//! The raw tile stream carries no dimensions, so a saved channel is one JSON
//! header line describing the grid followed by the raw stream:
//!
//! ```text
//! {"version":1,"tile_size":64,"kind":"Alpha",...}\n
//! <TILE_SIZE² × x_tile_count × y_tile_count bytes>
//! ```

use std::io::{BufRead, Read, Write};

use model::{ChannelKind, GridLayoutError, Rect, TileGridLayout};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiles::{
    ChannelConfig, ExtentError, IoSink, IoSource, StreamError, TileAllocError, TiledChannelBuffer,
};
use tracing::debug;

pub const CHANNEL_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHeader {
    pub version: u16,
    pub tile_size: u32,
    pub kind: ChannelKind,
    pub default_fill: u8,
    pub tile_origin_x: i32,
    pub tile_origin_y: i32,
    pub x_tile_count: u32,
    pub y_tile_count: u32,
    pub image_rect: Rect,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("channel file has no header line")]
    MissingHeader,
    #[error("parse channel header failed: {0}")]
    Header(#[from] serde_json::Error),
    #[error("unsupported channel format version {found}")]
    UnsupportedVersion { found: u16 },
    #[error("channel was saved with tile size {found}, expected {expected}")]
    TileSizeMismatch { expected: u32, found: u32 },
    #[error("channel grid of {x_tile_count}x{y_tile_count} tiles of size {tile_size} overflows")]
    GridTooLarge {
        tile_size: u32,
        x_tile_count: u32,
        y_tile_count: u32,
    },
    #[error("channel has {absent} absent tiles; allocate them before saving")]
    SparseBuffer { absent: usize },
    #[error("channel header describes an invalid grid: {0}")]
    Layout(#[from] GridLayoutError),
    #[error(transparent)]
    Extent(#[from] ExtentError),
    #[error(transparent)]
    Alloc(#[from] TileAllocError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error("channel file i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ChannelHeader {
    pub fn describe<const TILE_SIZE: u32>(buffer: &TiledChannelBuffer<TILE_SIZE>) -> Self {
        let (tile_origin_x, tile_origin_y) = buffer.tile_origin();
        Self {
            version: CHANNEL_FORMAT_VERSION,
            tile_size: TILE_SIZE,
            kind: buffer.kind(),
            default_fill: buffer.default_fill(),
            tile_origin_x,
            tile_origin_y,
            x_tile_count: buffer.x_tile_count(),
            y_tile_count: buffer.y_tile_count(),
            image_rect: buffer.image_rect(),
        }
    }

    /// `None` when the count does not fit in `usize`.
    pub fn tile_count(&self) -> Option<usize> {
        (self.x_tile_count as usize).checked_mul(self.y_tile_count as usize)
    }

    /// Length of the raw stream following the header, `None` on overflow.
    pub fn stream_len(&self) -> Option<usize> {
        let tile_len = (self.tile_size as usize).checked_mul(self.tile_size as usize)?;
        self.tile_count()?.checked_mul(tile_len)
    }

    pub fn layout<const TILE_SIZE: u32>(&self) -> Result<TileGridLayout<TILE_SIZE>, StoreError> {
        if self.tile_size != TILE_SIZE {
            return Err(StoreError::TileSizeMismatch {
                expected: TILE_SIZE,
                found: self.tile_size,
            });
        }
        Ok(TileGridLayout::new(
            self.tile_origin_x,
            self.tile_origin_y,
            self.x_tile_count,
            self.y_tile_count,
        )?)
    }

    pub fn config(&self) -> ChannelConfig {
        ChannelConfig {
            kind: self.kind,
            default_fill: Some(self.default_fill),
        }
    }
}

/// Allocates every absent slot so that a sparse buffer can be saved. The
/// image rect is left as it is.
pub fn prepare_for_save<const TILE_SIZE: u32>(
    buffer: &mut TiledChannelBuffer<TILE_SIZE>,
) -> Result<usize, StoreError> {
    Ok(buffer.fill_absent_tiles()?)
}

pub fn write_header(writer: &mut dyn Write, header: &ChannelHeader) -> Result<(), StoreError> {
    serde_json::to_writer(&mut *writer, header)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub fn read_header(reader: &mut dyn BufRead) -> Result<ChannelHeader, StoreError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 || line.trim().is_empty() {
        return Err(StoreError::MissingHeader);
    }
    let header = serde_json::from_str::<ChannelHeader>(&line)?;
    if header.version != CHANNEL_FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: header.version,
        });
    }
    if header.stream_len().is_none() {
        return Err(StoreError::GridTooLarge {
            tile_size: header.tile_size,
            x_tile_count: header.x_tile_count,
            y_tile_count: header.y_tile_count,
        });
    }
    Ok(header)
}

/// Writes the header line and the raw tile stream. Every tile must be
/// present, see [`prepare_for_save`].
pub fn save_channel<const TILE_SIZE: u32>(
    writer: &mut dyn Write,
    buffer: &TiledChannelBuffer<TILE_SIZE>,
) -> Result<(), StoreError> {
    let absent = buffer.tile_count() - buffer.present_tile_count();
    if absent > 0 {
        return Err(StoreError::SparseBuffer { absent });
    }
    let header = ChannelHeader::describe(buffer);
    write_header(writer, &header)?;
    buffer.write_to(&mut IoSink(&mut *writer))?;
    debug!(
        tiles = buffer.tile_count(),
        bytes = buffer.stream_len(),
        image_rect = ?header.image_rect,
        "channel saved"
    );
    Ok(())
}

/// Rebuilds a buffer from an already parsed header and the raw stream that
/// follows it.
pub fn load_body<const TILE_SIZE: u32>(
    header: &ChannelHeader,
    reader: &mut dyn Read,
) -> Result<TiledChannelBuffer<TILE_SIZE>, StoreError> {
    let layout = header.layout::<TILE_SIZE>()?;
    let mut buffer = TiledChannelBuffer::with_extent(header.config(), layout, header.image_rect)?;
    buffer.read_from(&mut IoSource(&mut *reader))?;
    buffer.take_dirty();
    debug!(
        tiles = buffer.tile_count(),
        image_rect = ?header.image_rect,
        "channel loaded"
    );
    Ok(buffer)
}

pub fn load_channel<const TILE_SIZE: u32>(
    reader: &mut dyn BufRead,
) -> Result<TiledChannelBuffer<TILE_SIZE>, StoreError> {
    let header = read_header(reader)?;
    load_body(&header, reader)
}
