//! # Map Coordinates
//!
//! Tile coordinates, inclusive tile rectangles and the four map directions.
//!
//! World units are 32 per tile; element heights are 8 world units per step.

/// World units per tile edge.
pub const TILE_SIZE: i32 = 32;

/// World units per element height step.
pub const HEIGHT_STEP: i32 = 8;

/// A tile position on the map grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Converts world units to the containing tile. Negative input has no tile.
    #[must_use]
    pub fn from_world(world_x: i32, world_y: i32) -> Option<Self> {
        let x = u32::try_from(world_x.div_euclid(TILE_SIZE)).ok()?;
        let y = u32::try_from(world_y.div_euclid(TILE_SIZE)).ok()?;
        Some(Self { x, y })
    }

    /// World x of the tile's corner.
    #[inline]
    #[must_use]
    pub fn world_x(self) -> i64 {
        i64::from(self.x) * i64::from(TILE_SIZE)
    }

    /// World y of the tile's corner.
    #[inline]
    #[must_use]
    pub fn world_y(self) -> i64 {
        i64::from(self.y) * i64::from(TILE_SIZE)
    }

    /// Neighbouring tile in `direction`, if it does not underflow.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.tile_delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y })
    }
}

/// The four map directions, in element `type_` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// -x
    West = 0,
    /// +y
    North = 1,
    /// +x
    East = 2,
    /// -y
    South = 3,
}

impl Direction {
    /// All directions in index order.
    pub const ALL: [Self; 4] = [Self::West, Self::North, Self::East, Self::South];

    /// Decodes the low two bits of `value`.
    #[inline]
    #[must_use]
    pub const fn from_bits(value: u8) -> Self {
        match value & 3 {
            0 => Self::West,
            1 => Self::North,
            2 => Self::East,
            _ => Self::South,
        }
    }

    /// Step to the neighbouring tile, in tiles.
    #[inline]
    #[must_use]
    pub const fn tile_delta(self) -> (i32, i32) {
        match self {
            Self::West => (-1, 0),
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
        }
    }

    /// Step to the neighbouring tile, in world units.
    #[inline]
    #[must_use]
    pub const fn world_delta(self) -> (i32, i32) {
        let (dx, dy) = self.tile_delta();
        (dx * TILE_SIZE, dy * TILE_SIZE)
    }

    /// Direction rotated a quarter turn clockwise `turns` times.
    #[inline]
    #[must_use]
    pub const fn rotated(self, turns: u8) -> Self {
        Self::from_bits((self as u8).wrapping_add(turns))
    }
}

/// Rotates a world-unit offset into the frame of `rotation`.
///
/// West is the identity frame.
#[must_use]
pub const fn rotate_map_coordinates(x: i16, y: i16, rotation: Direction) -> (i16, i16) {
    match rotation {
        Direction::West => (x, y),
        Direction::North => (y, -x),
        Direction::East => (-x, -y),
        Direction::South => (-y, x),
    }
}

/// Inclusive rectangle of tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRect {
    /// Lowest corner (inclusive).
    pub min: TileCoord,
    /// Highest corner (inclusive).
    pub max: TileCoord,
}

impl TileRect {
    /// Creates a rectangle from two corners in any order.
    #[must_use]
    pub fn new(a: TileCoord, b: TileCoord) -> Self {
        Self {
            min: TileCoord::new(a.x.min(b.x), a.y.min(b.y)),
            max: TileCoord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// The whole grid of `width` x `height` tiles.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn full(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Grid dimensions must be non-zero");
        Self {
            min: TileCoord::new(0, 0),
            max: TileCoord::new(width - 1, height - 1),
        }
    }

    /// Returns true if `coord` lies inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.min.x && coord.x <= self.max.x && coord.y >= self.min.y && coord.y <= self.max.y
    }

    /// Number of tiles covered.
    #[inline]
    #[must_use]
    pub const fn tile_count(&self) -> u64 {
        let columns = self.max.x.saturating_sub(self.min.x) as u64 + 1;
        let rows = self.max.y.saturating_sub(self.min.y) as u64 + 1;
        columns * rows
    }

    /// Intersection with a `width` x `height` grid, `None` if disjoint.
    #[must_use]
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || self.min.x >= width || self.min.y >= height {
            return None;
        }
        Some(Self {
            min: self.min,
            max: TileCoord::new(self.max.x.min(width - 1), self.max.y.min(height - 1)),
        })
    }
}
