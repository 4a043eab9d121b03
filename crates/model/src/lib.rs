//! Canvas geometry and tile-grid layout shared by channel storage and its callers.
//!
//! Everything here is plain arithmetic: no tile memory is owned by this crate.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TILE_SIZE: u32 = 64;

/// What a channel buffer stores. Only used to pick the fill byte of fresh tiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Coverage channel, fresh tiles are fully transparent.
    Alpha,
    /// Color component, fresh tiles are fully opaque.
    Color,
}

impl ChannelKind {
    pub const fn default_fill(self) -> u8 {
        match self {
            ChannelKind::Alpha => 0,
            ChannelKind::Color => u8::MAX,
        }
    }
}

/// Half-open rectangle in canvas coordinates.
///
/// A rectangle with zero width or height is empty regardless of its origin.
/// Right and bottom edges are reported as `i64` so that `x + width` never
/// overflows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const EMPTY: Rect = Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from edges, `None` when an edge leaves the `i32`
    /// origin range or a side does not fit `u32`. Inverted edges give `EMPTY`.
    pub fn from_edges(left: i64, top: i64, right: i64, bottom: i64) -> Option<Self> {
        if right <= left || bottom <= top {
            return Some(Rect::EMPTY);
        }
        Some(Self {
            x: i32::try_from(left).ok()?,
            y: i32::try_from(top).ok()?,
            width: u32::try_from(right - left).ok()?,
            height: u32::try_from(bottom - top).ok()?,
        })
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn left(self) -> i64 {
        self.x as i64
    }

    pub const fn top(self) -> i64 {
        self.y as i64
    }

    /// Exclusive right edge.
    pub const fn right(self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub const fn bottom(self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn contains_point(self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// Every rectangle contains the empty rectangle; an empty rectangle
    /// contains nothing else.
    pub fn contains(self, other: Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(self, other: Rect) -> bool {
        !self.intersection(other).is_empty()
    }

    pub fn intersection(self, other: Rect) -> Rect {
        if self.is_empty() || other.is_empty() {
            return Rect::EMPTY;
        }
        // Both inputs are valid rectangles, so the intersection is too.
        Rect::from_edges(
            self.left().max(other.left()),
            self.top().max(other.top()),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        )
        .unwrap_or(Rect::EMPTY)
    }

    /// Bounding box of both rectangles, ignoring empty ones. `None` when the
    /// box is too large to be represented.
    pub fn union(self, other: Rect) -> Option<Rect> {
        if self.is_empty() {
            return Some(other);
        }
        if other.is_empty() {
            return Some(self);
        }
        Rect::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    pub const fn translated(self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            width: self.width,
            height: self.height,
        }
    }
}

/// Rounds `value` down onto the lattice `anchor + k * tile_size`.
pub const fn align_down(value: i64, anchor: i64, tile_size: u32) -> i64 {
    let tile = tile_size as i64;
    anchor + (value - anchor).div_euclid(tile) * tile
}

/// Rounds `value` up onto the lattice `anchor + k * tile_size`.
pub const fn align_up(value: i64, anchor: i64, tile_size: u32) -> i64 {
    let tile = tile_size as i64;
    anchor + (value - anchor + tile - 1).div_euclid(tile) * tile
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLayoutError {
    TileIndexOutOfBounds,
    GridTooLarge,
}

impl std::fmt::Display for GridLayoutError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridLayoutError::TileIndexOutOfBounds => {
                write!(formatter, "tile index is outside the tile grid")
            }
            GridLayoutError::GridTooLarge => {
                write!(formatter, "tile grid extent exceeds the canvas coordinate range")
            }
        }
    }
}

impl std::error::Error for GridLayoutError {}

/// Footprint of a tile grid: its origin and tile counts.
///
/// The pixel extent is `tiles_per_row * TILE_SIZE` by
/// `tiles_per_column * TILE_SIZE`, so it is a multiple of the tile size by
/// construction. Slots are addressed row-major.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TileGridLayout<const TILE_SIZE: u32> {
    origin_x: i32,
    origin_y: i32,
    tiles_per_row: u32,
    tiles_per_column: u32,
}

impl<const TILE_SIZE: u32> Default for TileGridLayout<TILE_SIZE> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<const TILE_SIZE: u32> TileGridLayout<TILE_SIZE> {
    const TILE_SIZE_IS_NONZERO: () = assert!(TILE_SIZE > 0, "TILE_SIZE must be at least 1");

    pub const TILE_PIXELS: usize = TILE_SIZE as usize * TILE_SIZE as usize;

    pub const EMPTY: Self = Self {
        origin_x: 0,
        origin_y: 0,
        tiles_per_row: 0,
        tiles_per_column: 0,
    };

    pub fn new(
        origin_x: i32,
        origin_y: i32,
        tiles_per_row: u32,
        tiles_per_column: u32,
    ) -> Result<Self, GridLayoutError> {
        let () = Self::TILE_SIZE_IS_NONZERO;
        let width = tiles_per_row
            .checked_mul(TILE_SIZE)
            .ok_or(GridLayoutError::GridTooLarge)?;
        let height = tiles_per_column
            .checked_mul(TILE_SIZE)
            .ok_or(GridLayoutError::GridTooLarge)?;
        // Every pixel of the grid must be addressable with i32 coordinates.
        if i64::from(origin_x) + i64::from(width) > i64::from(i32::MAX) + 1
            || i64::from(origin_y) + i64::from(height) > i64::from(i32::MAX) + 1
        {
            return Err(GridLayoutError::GridTooLarge);
        }
        (tiles_per_row as usize)
            .checked_mul(tiles_per_column as usize)
            .ok_or(GridLayoutError::GridTooLarge)?;
        if tiles_per_row == 0 || tiles_per_column == 0 {
            return Ok(Self::EMPTY);
        }
        Ok(Self {
            origin_x,
            origin_y,
            tiles_per_row,
            tiles_per_column,
        })
    }

    /// Smallest grid on the lattice anchored at `(anchor_x, anchor_y)` whose
    /// footprint contains `rect`.
    pub fn covering(anchor_x: i32, anchor_y: i32, rect: Rect) -> Result<Self, GridLayoutError> {
        let () = Self::TILE_SIZE_IS_NONZERO;
        if rect.is_empty() {
            return Ok(Self::EMPTY);
        }
        let left = align_down(rect.left(), i64::from(anchor_x), TILE_SIZE);
        let top = align_down(rect.top(), i64::from(anchor_y), TILE_SIZE);
        let right = align_up(rect.right(), i64::from(anchor_x), TILE_SIZE);
        let bottom = align_up(rect.bottom(), i64::from(anchor_y), TILE_SIZE);
        let tile = i64::from(TILE_SIZE);
        let tiles_per_row =
            u32::try_from((right - left) / tile).map_err(|_| GridLayoutError::GridTooLarge)?;
        let tiles_per_column =
            u32::try_from((bottom - top) / tile).map_err(|_| GridLayoutError::GridTooLarge)?;
        Self::new(
            i32::try_from(left).map_err(|_| GridLayoutError::GridTooLarge)?,
            i32::try_from(top).map_err(|_| GridLayoutError::GridTooLarge)?,
            tiles_per_row,
            tiles_per_column,
        )
    }

    pub const fn origin(self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    pub const fn tiles_per_row(self) -> u32 {
        self.tiles_per_row
    }

    pub const fn tiles_per_column(self) -> u32 {
        self.tiles_per_column
    }

    pub const fn is_empty(self) -> bool {
        self.tiles_per_row == 0 || self.tiles_per_column == 0
    }

    pub const fn max_tiles(self) -> usize {
        self.tiles_per_row as usize * self.tiles_per_column as usize
    }

    /// Pixel footprint of the whole grid.
    pub const fn pixel_rect(self) -> Rect {
        if self.is_empty() {
            return Rect::EMPTY;
        }
        Rect {
            x: self.origin_x,
            y: self.origin_y,
            width: self.tiles_per_row * TILE_SIZE,
            height: self.tiles_per_column * TILE_SIZE,
        }
    }

    pub fn tile_index(&self, tile: TilePos) -> Result<usize, GridLayoutError> {
        if tile.x >= self.tiles_per_row || tile.y >= self.tiles_per_column {
            Err(GridLayoutError::TileIndexOutOfBounds)
        } else {
            Ok(tile.y as usize * self.tiles_per_row as usize + tile.x as usize)
        }
    }

    pub fn tile_pos(&self, index: usize) -> Result<TilePos, GridLayoutError> {
        if index >= self.max_tiles() {
            Err(GridLayoutError::TileIndexOutOfBounds)
        } else {
            let x = index % self.tiles_per_row as usize;
            let y = index / self.tiles_per_row as usize;
            Ok(TilePos {
                x: x as u32,
                y: y as u32,
            })
        }
    }

    /// Canvas rectangle covered by the tile at `index`.
    pub fn tile_rect(&self, index: usize) -> Result<Rect, GridLayoutError> {
        let pos = self.tile_pos(index)?;
        // In range because the whole grid was validated in `new`.
        Ok(Rect {
            x: (i64::from(self.origin_x) + i64::from(pos.x) * i64::from(TILE_SIZE)) as i32,
            y: (i64::from(self.origin_y) + i64::from(pos.y) * i64::from(TILE_SIZE)) as i32,
            width: TILE_SIZE,
            height: TILE_SIZE,
        })
    }

    /// Slot index and in-tile byte offset of a canvas pixel, `None` outside
    /// the grid.
    #[inline]
    pub fn locate(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let local_x = i64::from(x) - i64::from(self.origin_x);
        let local_y = i64::from(y) - i64::from(self.origin_y);
        let tile = i64::from(TILE_SIZE);
        if local_x < 0
            || local_y < 0
            || local_x >= i64::from(self.tiles_per_row) * tile
            || local_y >= i64::from(self.tiles_per_column) * tile
        {
            return None;
        }
        let (local_x, local_y) = (local_x as usize, local_y as usize);
        let tile = TILE_SIZE as usize;
        let index = (local_y / tile) * self.tiles_per_row as usize + local_x / tile;
        let offset = (local_y % tile) * tile + local_x % tile;
        Some((index, offset))
    }

    /// Tiles overlapping `rect`, clipped to the grid. Partial tiles count.
    pub fn tile_span(&self, rect: Rect) -> Option<TileSpan> {
        let clipped = rect.intersection(self.pixel_rect());
        if clipped.is_empty() {
            return None;
        }
        let tile = i64::from(TILE_SIZE);
        let to_col = |x: i64| ((x - i64::from(self.origin_x)) / tile) as u32;
        let to_row = |y: i64| ((y - i64::from(self.origin_y)) / tile) as u32;
        Some(TileSpan {
            first: TilePos {
                x: to_col(clipped.left()),
                y: to_row(clipped.top()),
            },
            last: TilePos {
                x: to_col(clipped.right() - 1),
                y: to_row(clipped.bottom() - 1),
            },
        })
    }

    /// Tile offset of `self` inside `outer`, when `outer` contains `self` on
    /// the same lattice.
    pub fn offset_within(&self, outer: &Self) -> Option<TilePos> {
        if self.is_empty() {
            return Some(TilePos { x: 0, y: 0 });
        }
        if !outer.pixel_rect().contains(self.pixel_rect()) {
            return None;
        }
        let dx = i64::from(self.origin_x) - i64::from(outer.origin_x);
        let dy = i64::from(self.origin_y) - i64::from(outer.origin_y);
        let tile = i64::from(TILE_SIZE);
        if dx % tile != 0 || dy % tile != 0 {
            return None;
        }
        Some(TilePos {
            x: (dx / tile) as u32,
            y: (dy / tile) as u32,
        })
    }

    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            origin_x: self.origin_x.wrapping_add(dx),
            origin_y: self.origin_y.wrapping_add(dy),
            tiles_per_row: self.tiles_per_row,
            tiles_per_column: self.tiles_per_column,
        }
    }
}

/// Inclusive range of tile positions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TileSpan {
    pub first: TilePos,
    pub last: TilePos,
}

impl TileSpan {
    pub fn iter(self) -> impl Iterator<Item = TilePos> {
        (self.first.y..=self.last.y)
            .flat_map(move |y| (self.first.x..=self.last.x).map(move |x| TilePos { x, y }))
    }
}

#[cfg(test)]
mod tests;
