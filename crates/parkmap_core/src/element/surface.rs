//! # Surface Elements
//!
//! Terrain and terrain-edge ids are 4 bits each, split across two bytes: the
//! low three bits live in bits 5-7 of a payload byte and the high bit in the
//! element tag.
//!
//! | id | low bits | high bit |
//! |----|----------|----------|
//! | terrain | `properties[1]` bits 5-7 | `tag` bit 0 |
//! | edge | `properties[0]` bits 5-7 | `tag` bit 7 |

use super::{ElementKind, TileElement};

/// Terrain style ids.
pub mod terrain {
    /// Grass.
    pub const GRASS: u8 = 0;
    /// Sand.
    pub const SAND: u8 = 1;
    /// Dirt.
    pub const DIRT: u8 = 2;
    /// Rock.
    pub const ROCK: u8 = 3;
    /// Martian.
    pub const MARTIAN: u8 = 4;
    /// Checkerboard.
    pub const CHECKERBOARD: u8 = 5;
    /// Grass clumps.
    pub const GRASS_CLUMPS: u8 = 6;
    /// Ice.
    pub const ICE: u8 = 7;
    /// Red grid.
    pub const GRID_RED: u8 = 8;
    /// Yellow grid.
    pub const GRID_YELLOW: u8 = 9;
    /// Blue grid.
    pub const GRID_BLUE: u8 = 10;
    /// Green grid.
    pub const GRID_GREEN: u8 = 11;
    /// Dark sand.
    pub const SAND_DARK: u8 = 12;
    /// Light sand.
    pub const SAND_LIGHT: u8 = 13;
}

/// Terrain edge style ids.
pub mod terrain_edge {
    /// Rock.
    pub const ROCK: u8 = 0;
    /// Red wood.
    pub const WOOD_RED: u8 = 1;
    /// Black wood.
    pub const WOOD_BLACK: u8 = 2;
    /// Ice.
    pub const ICE: u8 = 3;
}

/// Land ownership bits of the ownership byte.
pub mod ownership {
    /// Construction rights above and below the surface are owned.
    pub const CONSTRUCTION_RIGHTS_OWNED: u8 = 1 << 4;
    /// The land is part of the park.
    pub const OWNED: u8 = 1 << 5;
    /// Construction rights are for sale.
    pub const CONSTRUCTION_RIGHTS_AVAILABLE: u8 = 1 << 6;
    /// The land is for sale.
    pub const AVAILABLE: u8 = 1 << 7;
}

/// Grass lengths, stored in the low three bits of the grass byte.
///
/// The high nibble counts ticks towards the next growth step.
pub mod grass {
    /// Freshly mowed.
    pub const MOWED: u8 = 0;
    /// Short, as laid by map initialization.
    pub const CLEAR_0: u8 = 1;
    /// Short.
    pub const CLEAR_1: u8 = 2;
    /// Short, about to clump.
    pub const CLEAR_2: u8 = 3;
    /// Clumped.
    pub const CLUMPS_0: u8 = 4;
    /// Clumped.
    pub const CLUMPS_1: u8 = 5;
    /// Fully grown.
    pub const CLUMPS_2: u8 = 6;
    /// Mask of the length bits.
    pub const LENGTH_MASK: u8 = 0x07;
}

/// Slope bit that doubles the raised corner's height.
pub const SLOPE_DOUBLE_HEIGHT: u8 = 0x10;

/// Default height of a freshly initialized surface.
pub const DEFAULT_SURFACE_HEIGHT: u8 = 14;

const SLOPE_BYTE: usize = 0;
const TERRAIN_BYTE: usize = 1;
const GRASS_BYTE: usize = 2;
const OWNERSHIP_BYTE: usize = 3;

const LOW_BITS_MASK: u8 = 0xE0;
const LOW_BITS_SHIFT: u8 = 5;
const FIELD_MASK: u8 = 0x1F;
const TERRAIN_HIGH_BIT: u8 = 0x01;
const EDGE_HIGH_BIT: u8 = 0x80;

impl TileElement {
    /// Creates a surface element with the given terrain and edge style.
    #[must_use]
    pub fn surface(base_height: u8, terrain: u8, edge: u8) -> Self {
        let mut element = Self::new(ElementKind::Surface, base_height, base_height);
        element.set_terrain(terrain);
        element.set_terrain_edge(edge);
        element
    }

    /// Terrain style id (0-15).
    #[inline]
    #[must_use]
    pub const fn terrain(&self) -> u8 {
        let mut terrain = (self.properties[TERRAIN_BYTE] >> LOW_BITS_SHIFT) & 7;
        if self.tag & TERRAIN_HIGH_BIT != 0 {
            terrain |= 1 << 3;
        }
        terrain
    }

    /// Sets the terrain style id; bits above 3 are ignored.
    #[inline]
    pub fn set_terrain(&mut self, terrain: u8) {
        if terrain & 8 != 0 {
            self.tag |= TERRAIN_HIGH_BIT;
        } else {
            self.tag &= !TERRAIN_HIGH_BIT;
        }
        self.properties[TERRAIN_BYTE] &= !LOW_BITS_MASK;
        self.properties[TERRAIN_BYTE] |= (terrain & 7) << LOW_BITS_SHIFT;
    }

    /// Terrain edge style id (0-15).
    #[inline]
    #[must_use]
    pub const fn terrain_edge(&self) -> u8 {
        let mut edge = (self.properties[SLOPE_BYTE] >> LOW_BITS_SHIFT) & 7;
        if self.tag & EDGE_HIGH_BIT != 0 {
            edge |= 1 << 3;
        }
        edge
    }

    /// Sets the terrain edge style id; bits above 3 are ignored.
    #[inline]
    pub fn set_terrain_edge(&mut self, edge: u8) {
        if edge & 8 != 0 {
            self.tag |= EDGE_HIGH_BIT;
        } else {
            self.tag &= !EDGE_HIGH_BIT;
        }
        self.properties[SLOPE_BYTE] &= !LOW_BITS_MASK;
        self.properties[SLOPE_BYTE] |= (edge & 7) << LOW_BITS_SHIFT;
    }

    /// Corner slope bits (0-31).
    #[inline]
    #[must_use]
    pub const fn slope(&self) -> u8 {
        self.properties[SLOPE_BYTE] & FIELD_MASK
    }

    /// Sets the corner slope bits, keeping the edge style.
    #[inline]
    pub fn set_slope(&mut self, slope: u8) {
        self.properties[SLOPE_BYTE] = (self.properties[SLOPE_BYTE] & !FIELD_MASK) | (slope & FIELD_MASK);
    }

    /// Water level in height steps, 0 when dry.
    #[inline]
    #[must_use]
    pub const fn water_height(&self) -> u8 {
        (self.properties[TERRAIN_BYTE] & FIELD_MASK) * 2
    }

    /// Sets the water level in height steps (stored halved).
    #[inline]
    pub fn set_water_height(&mut self, height: u8) {
        let stored = (height / 2) & FIELD_MASK;
        self.properties[TERRAIN_BYTE] = (self.properties[TERRAIN_BYTE] & !FIELD_MASK) | stored;
    }

    /// Raw grass length byte.
    #[inline]
    #[must_use]
    pub const fn grass_length(&self) -> u8 {
        self.properties[GRASS_BYTE]
    }

    /// Sets the raw grass length byte.
    #[inline]
    pub fn set_grass_length(&mut self, length: u8) {
        self.properties[GRASS_BYTE] = length;
    }

    /// Land ownership bits.
    #[inline]
    #[must_use]
    pub const fn ownership(&self) -> u8 {
        self.properties[OWNERSHIP_BYTE]
    }

    /// Sets the land ownership bits.
    #[inline]
    pub fn set_ownership(&mut self, ownership: u8) {
        self.properties[OWNERSHIP_BYTE] = ownership;
    }
}
