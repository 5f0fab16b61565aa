//! # Tile Index
//!
//! Pre-allocated table mapping every tile to the arena position of its first
//! element.
//!
//! The table uses a dense row-major array:
//! - All slots are allocated when the map is sized
//! - Lookup is O(1)
//! - Heads are strictly increasing in row-major order once initialized, so
//!   the tile owning any arena position is a binary search away

use crate::coords::TileCoord;
use crate::element::TileElement;
use crate::error::LoadError;

/// Largest supported map edge, in tiles.
pub const MAX_MAP_SIZE: u32 = 256;

/// Head value of a tile that has never been initialized.
pub const UNDEFINED_HEAD: u32 = u32::MAX;

/// Per-tile chain heads.
///
/// # Example
///
/// ```rust,ignore
/// let mut index = TileIndex::new(256, 256);
/// let next_free = index.rebuild_all(arena.as_slice())?;
/// let head = index.lookup(12, 40);
/// ```
#[derive(Clone, Debug)]
pub struct TileIndex {
    /// Head position per tile, row-major.
    heads: Box<[u32]>,
    /// Tiles per row.
    width: u32,
    /// Rows.
    height: u32,
}

impl TileIndex {
    /// Creates an index with every entry undefined.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or above [`MAX_MAP_SIZE`].
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(
            width > 0 && height > 0 && width <= MAX_MAP_SIZE && height <= MAX_MAP_SIZE,
            "Map dimensions must be within 1..=256"
        );

        let heads = vec![UNDEFINED_HEAD; (width * height) as usize].into_boxed_slice();
        Self {
            heads,
            width,
            height,
        }
    }

    /// Builds an index over a freshly loaded element buffer.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the buffer runs out before a tile's terminal
    /// element or a tile holds tombstones only.
    pub fn build(width: u32, height: u32, elements: &[TileElement]) -> Result<(Self, usize), LoadError> {
        let mut index = Self::new(width, height);
        let next_free = index.rebuild_all(elements)?;
        Ok((index, next_free))
    }

    /// Tiles per row.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total tiles.
    #[inline]
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.heads.len()
    }

    /// Returns true if (x, y) is on the grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Row-major slot of (x, y), or None if off the grid.
    #[inline]
    #[must_use]
    pub const fn slot(&self, x: u32, y: u32) -> Option<usize> {
        if self.contains(x, y) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Coordinate of a row-major slot.
    #[inline]
    #[must_use]
    pub fn coord_of(&self, slot: usize) -> TileCoord {
        let slot = u32::try_from(slot).unwrap_or(u32::MAX);
        TileCoord::new(slot % self.width, slot / self.width)
    }

    /// Head of tile (x, y).
    ///
    /// Off-grid coordinates are a caller defect: they are logged and yield
    /// `None`, never a panic.
    #[must_use]
    pub fn lookup(&self, x: u32, y: u32) -> Option<usize> {
        let Some(slot) = self.slot(x, y) else {
            tracing::error!(x, y, "tile lookup outside of map");
            return None;
        };
        self.head(slot)
    }

    /// Head of a row-major slot, `None` when undefined.
    #[inline]
    #[must_use]
    pub fn head(&self, slot: usize) -> Option<usize> {
        match self.heads.get(slot) {
            Some(&UNDEFINED_HEAD) | None => None,
            Some(&head) => Some(head as usize),
        }
    }

    /// Points tile (x, y) at `head`.
    ///
    /// # Returns
    ///
    /// `false` if (x, y) is off the grid.
    pub fn patch(&mut self, x: u32, y: u32, head: usize) -> bool {
        let Some(slot) = self.slot(x, y) else {
            tracing::error!(x, y, "tile patch outside of map");
            return false;
        };
        self.heads[slot] = position_u32(head);
        true
    }

    /// Returns true once every tile has a head.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.heads.iter().all(|&head| head != UNDEFINED_HEAD)
    }

    /// Marks every tile undefined.
    pub fn clear(&mut self) {
        self.heads.fill(UNDEFINED_HEAD);
    }

    /// Recomputes every head from a linear scan of `elements`.
    ///
    /// Tiles are visited row-major: each tile's run starts right after the
    /// previous tile's terminal element. Anything after the last tile's run is
    /// ignored.
    ///
    /// # Returns
    ///
    /// The position just past the last tile's run (the arena's next free slot).
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] on a missing terminal or an all-tombstone tile;
    /// the index is left cleared in that case.
    pub fn rebuild_all(&mut self, elements: &[TileElement]) -> Result<usize, LoadError> {
        self.clear();

        let mut position = 0usize;
        for slot in 0..self.heads.len() {
            let head = position;
            let mut live = 0usize;
            loop {
                let Some(element) = elements.get(position) else {
                    let coord = self.coord_of(slot);
                    self.clear();
                    return Err(LoadError::MissingTerminal { x: coord.x, y: coord.y });
                };
                position += 1;
                if !element.is_tombstone() {
                    live += 1;
                }
                if element.is_last_for_tile() {
                    break;
                }
            }

            if live == 0 {
                let coord = self.coord_of(slot);
                self.clear();
                return Err(LoadError::EmptyTile { x: coord.x, y: coord.y });
            }
            self.heads[slot] = position_u32(head);
        }

        Ok(position)
    }

    /// Slot of the tile whose run contains `position`.
    ///
    /// Requires a fully defined index.
    #[must_use]
    pub fn tile_at(&self, position: usize) -> Option<usize> {
        let position = position_u32(position);
        let after = self.heads.partition_point(|&head| head <= position);
        after.checked_sub(1)
    }

    /// Moves the head of every tile after `slot` up one position.
    ///
    /// Used after a shifting insert inside `slot`'s run.
    pub fn shift_after(&mut self, slot: usize) {
        if let Some(later) = self.heads.get_mut(slot + 1..) {
            for head in later {
                *head += 1;
            }
        }
    }

    /// Re-points heads after the compactor slid `start + distance..end` down
    /// to `start`.
    ///
    /// Heads inside the moved run drop by `distance`; a head that sat in the
    /// swept tombstones lands on `start`.
    ///
    /// # Returns
    ///
    /// Number of heads patched.
    pub fn slide_range(&mut self, start: usize, end: usize, distance: usize) -> usize {
        let (start, end, distance) = (position_u32(start), position_u32(end), position_u32(distance));
        let first = self.heads.partition_point(|&head| head < start);
        let last = self.heads.partition_point(|&head| head < end);

        for head in &mut self.heads[first..last] {
            *head = head.saturating_sub(distance).max(start);
        }
        last - first
    }

    /// Raw heads, row-major.
    #[inline]
    #[must_use]
    pub fn heads(&self) -> &[u32] {
        &self.heads
    }
}

/// Arena positions are bounded by the arena capacity, which fits in a `u32`.
fn position_u32(position: usize) -> u32 {
    u32::try_from(position).unwrap_or(UNDEFINED_HEAD)
}
