use model::{ChannelKind, Rect, TileGridLayout};
use tracing::{debug, trace};

use crate::ChannelConfig;
use crate::error::{ExtentError, PixelAccessError, TileAllocError};
use crate::grid::TileGrid;

/// Sparse single-channel raster made of `TILE_SIZE`-square tiles.
///
/// The buffer claims `image_rect` as its content and keeps a tile grid whose
/// footprint (`tile_rect`) always contains it. Tiles are allocated lazily by
/// [`allocate_rect`](Self::allocate_rect) and filled with the channel's
/// default byte.
#[derive(Debug, Clone)]
pub struct TiledChannelBuffer<const TILE_SIZE: u32> {
    kind: ChannelKind,
    default_fill: u8,
    image_rect: Rect,
    grid: TileGrid<TILE_SIZE>,
}

impl<const TILE_SIZE: u32> TiledChannelBuffer<TILE_SIZE> {
    pub const TILE_SIZE: u32 = TILE_SIZE;

    pub fn new(kind: ChannelKind) -> Self {
        Self::with_config(ChannelConfig::for_kind(kind))
    }

    pub fn with_config(config: ChannelConfig) -> Self {
        Self {
            kind: config.kind,
            default_fill: config.fill_value(),
            image_rect: Rect::EMPTY,
            grid: TileGrid::empty(),
        }
    }

    /// Builds a buffer with an exact grid, every tile present and filled
    /// with the default byte. Used to re-establish a saved grid shape before
    /// reading a raw tile stream.
    pub fn with_extent(
        config: ChannelConfig,
        layout: TileGridLayout<TILE_SIZE>,
        image_rect: Rect,
    ) -> Result<Self, ExtentError> {
        if !layout.pixel_rect().contains(image_rect) {
            return Err(ExtentError::ImageOutsideGrid);
        }
        let mut buffer = Self::with_config(config);
        let plan = buffer
            .grid
            .plan(layout, layout.pixel_rect(), buffer.default_fill)?;
        buffer.grid.commit(plan);
        buffer.image_rect = image_rect;
        Ok(buffer)
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn default_fill(&self) -> u8 {
        self.default_fill
    }

    pub fn image_rect(&self) -> Rect {
        self.image_rect
    }

    pub fn tile_rect(&self) -> Rect {
        self.grid.layout().pixel_rect()
    }

    pub fn layout(&self) -> TileGridLayout<TILE_SIZE> {
        self.grid.layout()
    }

    /// Top-left corner of tile (0, 0).
    pub fn tile_origin(&self) -> (i32, i32) {
        self.grid.layout().origin()
    }

    pub fn x_tile_count(&self) -> u32 {
        self.grid.layout().tiles_per_row()
    }

    pub fn y_tile_count(&self) -> u32 {
        self.grid.layout().tiles_per_column()
    }

    /// Number of slots in the grid, present or not.
    pub fn tile_count(&self) -> usize {
        self.grid.slot_count()
    }

    pub fn present_tile_count(&self) -> usize {
        self.grid.present_count()
    }

    /// Reads one pixel.
    ///
    /// Hot path: `(x, y)` is expected inside `image_rect` and nothing checks
    /// that. A pixel in an absent tile, or outside the grid entirely, reads
    /// as the channel's default fill. Use [`try_get`](Self::try_get) when the
    /// coordinates are not known to be valid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        match self.grid.layout().locate(x, y) {
            Some((index, offset)) => match self.grid.slot(index) {
                Some(tile) => tile.bytes()[offset],
                None => self.default_fill,
            },
            None => self.default_fill,
        }
    }

    /// Writes one pixel.
    ///
    /// Same contract as [`get`](Self::get): writes into an absent tile or
    /// outside the grid are dropped silently. Call
    /// [`allocate_rect`](Self::allocate_rect) before painting new areas.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: u8) {
        let Some((index, offset)) = self.grid.layout().locate(x, y) else {
            return;
        };
        if let Some(tile) = self.grid.slot_mut(index) {
            tile.bytes_mut()[offset] = value;
            self.grid.dirty_mut().set(index);
        }
    }

    /// Checked read for callers that cannot guarantee bounds.
    pub fn try_get(&self, x: i32, y: i32) -> Result<u8, PixelAccessError> {
        let (index, offset) = self.checked_index(x, y)?;
        match self.grid.slot(index) {
            Some(tile) => Ok(tile.bytes()[offset]),
            None => Err(PixelAccessError::TileAbsent { x, y }),
        }
    }

    /// Checked write for callers that cannot guarantee bounds.
    pub fn try_set(&mut self, x: i32, y: i32, value: u8) -> Result<(), PixelAccessError> {
        let (index, offset) = self.checked_index(x, y)?;
        let Some(tile) = self.grid.slot_mut(index) else {
            return Err(PixelAccessError::TileAbsent { x, y });
        };
        tile.bytes_mut()[offset] = value;
        self.grid.dirty_mut().set(index);
        Ok(())
    }

    fn checked_index(&self, x: i32, y: i32) -> Result<(usize, usize), PixelAccessError> {
        if !self.image_rect.contains_point(x, y) {
            return Err(PixelAccessError::OutsideImage { x, y });
        }
        self.grid
            .layout()
            .locate(x, y)
            .ok_or(PixelAccessError::OutsideImage { x, y })
    }

    pub fn tile_is_present(&self, x: i32, y: i32) -> bool {
        self.grid
            .layout()
            .locate(x, y)
            .is_some_and(|(index, _)| self.grid.slot(index).is_some())
    }

    /// Grows the buffer so that `image_rect` contains `new_rect` and every
    /// tile overlapping `new_rect` is present.
    ///
    /// Requests already inside `image_rect` whose tiles are all present
    /// return immediately. `image_rect` is a bounding box and may hold slots
    /// no request ever swept, so containment alone is not enough. Requests
    /// inside the current grid only allocate missing tiles. Anything else
    /// regrids: the footprint is widened to the tile-aligned union of the old
    /// grid and `new_rect`, and existing tiles move into the new slot array
    /// without their samples being touched.
    ///
    /// On error the buffer is unchanged.
    pub fn allocate_rect(&mut self, new_rect: Rect) -> Result<(), TileAllocError> {
        if new_rect.is_empty()
            || (self.image_rect.contains(new_rect) && self.grid.covers(new_rect))
        {
            return Ok(());
        }

        let image_rect = self
            .image_rect
            .union(new_rect)
            .ok_or(TileAllocError::GridOverflow)?;
        let current = self.grid.layout();
        let layout = if current.pixel_rect().contains(new_rect) {
            current
        } else {
            let (anchor_x, anchor_y) = if current.is_empty() {
                (new_rect.x, new_rect.y)
            } else {
                current.origin()
            };
            let extents = current
                .pixel_rect()
                .union(new_rect)
                .ok_or(TileAllocError::GridOverflow)?;
            TileGridLayout::covering(anchor_x, anchor_y, extents)?
        };

        let plan = self.grid.plan(layout, new_rect, self.default_fill)?;
        let resized = plan.resizes();
        let allocated = plan.staged_count();
        let moved = self.grid.commit(plan);
        self.image_rect = image_rect;

        if resized {
            debug!(
                old_tile_rect = ?current.pixel_rect(),
                new_tile_rect = ?layout.pixel_rect(),
                moved_tiles = moved,
                "tile grid resized"
            );
        }
        trace!(
            rect = ?new_rect,
            allocated_tiles = allocated,
            "allocate_rect sweep"
        );
        Ok(())
    }

    /// Shifts the buffer by `(dx, dy)` without touching any tile.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.image_rect = self.image_rect.translated(dx, dy);
        self.grid.translate(dx, dy);
    }

    /// Moves the buffer so that the top-left of `image_rect` lands on
    /// `(x, y)`.
    pub fn move_to(&mut self, x: i32, y: i32) {
        let dx = x.wrapping_sub(self.image_rect.x);
        let dy = y.wrapping_sub(self.image_rect.y);
        self.move_by(dx, dy);
    }

    /// Canvas rectangle of the slot at `index`, whether present or not.
    /// `None` when `index` is outside the grid.
    pub fn tile_rect_for(&self, index: usize) -> Option<Rect> {
        self.grid.layout().tile_rect(index).ok()
    }

    /// Width of the rightmost tile column that falls inside `image_rect`.
    pub fn last_tile_width_in_image(&self) -> u32 {
        let overhang = self.tile_rect().right() - self.image_rect.right();
        Self::last_tile_extent(overhang)
    }

    /// Height of the bottom tile row that falls inside `image_rect`.
    pub fn last_tile_height_in_image(&self) -> u32 {
        let overhang = self.tile_rect().bottom() - self.image_rect.bottom();
        Self::last_tile_extent(overhang)
    }

    fn last_tile_extent(overhang: i64) -> u32 {
        let overhang = overhang.rem_euclid(i64::from(TILE_SIZE)) as u32;
        TILE_SIZE - overhang
    }

    /// Present tiles in slot order with their canvas rectangle and samples.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, Rect, &[u8])> + '_ {
        let layout = self.grid.layout();
        self.grid.iter_present().filter_map(move |(index, tile)| {
            let rect = layout.tile_rect(index).ok()?;
            Some((index, rect, tile.bytes()))
        })
    }

    /// Canvas rectangles of all present tiles.
    pub fn region(&self) -> Vec<Rect> {
        self.tiles().map(|(_, rect, _)| rect).collect()
    }

    /// Drops every tile and forgets the extent.
    pub fn reset(&mut self) {
        self.grid = TileGrid::empty();
        self.image_rect = Rect::EMPTY;
    }

    /// Allocates every absent slot of the current grid. `image_rect` is
    /// unchanged.
    pub fn fill_absent_tiles(&mut self) -> Result<usize, TileAllocError> {
        self.grid.fill_absent(self.default_fill)
    }

    pub fn is_tile_dirty(&self, index: usize) -> bool {
        self.grid.dirty().is_dirty(index)
    }

    pub fn dirty_tile_count(&self) -> usize {
        self.grid.dirty().dirty_count()
    }

    pub fn dirty_tiles(&self) -> impl Iterator<Item = usize> + '_ {
        self.grid.dirty().iter_dirty()
    }

    /// Returns the dirty slot indices and clears them.
    pub fn take_dirty(&mut self) -> Vec<usize> {
        let dirty = self.grid.dirty().iter_dirty().collect();
        self.grid.dirty_mut().clear();
        dirty
    }

    pub(crate) fn grid(&self) -> &TileGrid<TILE_SIZE> {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut TileGrid<TILE_SIZE> {
        &mut self.grid
    }
}
