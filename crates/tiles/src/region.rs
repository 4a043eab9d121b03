//! Rectangle-level reads and writes on top of the per-pixel accessors.

use model::Rect;

use crate::channel::TiledChannelBuffer;
use crate::error::RegionError;

/// Part of a request rectangle that falls into one tile.
struct TilePart {
    index: usize,
    tile_x: usize,
    tile_y: usize,
    linear_x: usize,
    linear_y: usize,
    width: usize,
    height: usize,
}

fn check_linear(rect: Rect, len: usize, row_stride: usize) -> Result<(), RegionError> {
    if row_stride < rect.width as usize {
        return Err(RegionError::StrideTooSmall {
            stride: row_stride,
            width: rect.width,
        });
    }
    let required = (rect.height as usize - 1) * row_stride + rect.width as usize;
    if len < required {
        return Err(RegionError::BufferTooShort {
            required,
            actual: len,
        });
    }
    Ok(())
}

impl<const TILE_SIZE: u32> TiledChannelBuffer<TILE_SIZE> {
    fn tile_parts(&self, rect: Rect) -> Vec<TilePart> {
        let layout = self.layout();
        let Some(span) = layout.tile_span(rect) else {
            return Vec::new();
        };
        span.iter()
            .filter_map(|pos| {
                let index = layout.tile_index(pos).ok()?;
                let tile_rect = layout.tile_rect(index).ok()?;
                let part = tile_rect.intersection(rect);
                Some(TilePart {
                    index,
                    tile_x: (part.left() - tile_rect.left()) as usize,
                    tile_y: (part.top() - tile_rect.top()) as usize,
                    linear_x: (part.left() - rect.left()) as usize,
                    linear_y: (part.top() - rect.top()) as usize,
                    width: part.width as usize,
                    height: part.height as usize,
                })
            })
            .collect()
    }

    /// Sets every pixel of `rect` that lies in a present tile to `value`.
    /// Absent tiles stay absent.
    pub fn clear_rect(&mut self, rect: Rect, value: u8) {
        if rect.is_empty() {
            return;
        }
        for part in self.tile_parts(rect) {
            let Some(tile) = self.grid_mut().slot_mut(part.index) else {
                continue;
            };
            for row in part.tile_y..part.tile_y + part.height {
                tile.row_mut(row)[part.tile_x..part.tile_x + part.width].fill(value);
            }
            self.grid_mut().dirty_mut().set(part.index);
        }
    }

    /// Allocates `rect` and then sets every pixel in it to `value`.
    pub fn fill_rect(&mut self, rect: Rect, value: u8) -> Result<(), RegionError> {
        self.allocate_rect(rect)?;
        self.clear_rect(rect, value);
        Ok(())
    }

    /// Copies `rect` into a row-major linear buffer with `row_stride` bytes
    /// per row. Pixels without a present tile read as the default fill.
    pub fn read_bytes(
        &self,
        rect: Rect,
        dst: &mut [u8],
        row_stride: usize,
    ) -> Result<(), RegionError> {
        if rect.is_empty() {
            return Ok(());
        }
        check_linear(rect, dst.len(), row_stride)?;
        let width = rect.width as usize;
        for row in 0..rect.height as usize {
            dst[row * row_stride..row * row_stride + width].fill(self.default_fill());
        }
        for part in self.tile_parts(rect) {
            let Some(tile) = self.grid().slot(part.index) else {
                continue;
            };
            for row in 0..part.height {
                let src = &tile.row(part.tile_y + row)[part.tile_x..part.tile_x + part.width];
                let start = (part.linear_y + row) * row_stride + part.linear_x;
                dst[start..start + part.width].copy_from_slice(src);
            }
        }
        Ok(())
    }

    /// Copies a row-major linear buffer into `rect`. Pixels whose tile is
    /// absent are skipped, as with [`set`](Self::set).
    pub fn write_bytes(
        &mut self,
        rect: Rect,
        src: &[u8],
        row_stride: usize,
    ) -> Result<(), RegionError> {
        if rect.is_empty() {
            return Ok(());
        }
        check_linear(rect, src.len(), row_stride)?;
        for part in self.tile_parts(rect) {
            let Some(tile) = self.grid_mut().slot_mut(part.index) else {
                continue;
            };
            for row in 0..part.height {
                let start = (part.linear_y + row) * row_stride + part.linear_x;
                tile.row_mut(part.tile_y + row)[part.tile_x..part.tile_x + part.width]
                    .copy_from_slice(&src[start..start + part.width]);
            }
            self.grid_mut().dirty_mut().set(part.index);
        }
        Ok(())
    }
}
