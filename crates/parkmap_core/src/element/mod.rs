//! # Tile Elements
//!
//! Elements are pure 8-byte records with no behaviour beyond bit-field access.
//! They must be `Pod` so a decoded scenario buffer can be copied straight into
//! the arena.
//!
//! ## Record Layout
//!
//! | byte | field | contents |
//! |------|-------|----------|
//! | 0 | `tag` | bits 0-1 direction, 2-5 kind, 6-7 quadrant |
//! | 1 | `flags` | [`ElementFlags`] |
//! | 2 | `base_height` | 255 marks a tombstone |
//! | 3 | `clearance_height` | |
//! | 4-7 | `properties` | kind-specific payload |

pub mod payload;
pub mod surface;

use std::ops::{BitOr, BitOrAssign};

use bytemuck::{Pod, Zeroable};

use crate::coords::Direction;

/// Base height value reserved for tombstones.
pub const TOMBSTONE_HEIGHT: u8 = 255;

const KIND_MASK: u8 = 0x3C;
const KIND_SHIFT: u8 = 2;
const DIRECTION_MASK: u8 = 0x03;
const QUADRANT_MASK: u8 = 0xC0;
const QUADRANT_SHIFT: u8 = 6;

/// What physically occupies the element's slice of the tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementKind {
    /// Ground surface.
    Surface = 0,
    /// Footpath or queue.
    Path = 1,
    /// Ride track piece.
    Track = 2,
    /// Small scenery.
    Scenery = 3,
    /// Ride entrance/exit or park entrance.
    Entrance = 4,
    /// Fence/wall on a tile edge.
    Fence = 5,
    /// One tile of a multi-tile scenery object.
    LargeScenerySegment = 6,
    /// Banner.
    Banner = 7,
    /// Unknown kind bits.
    Undefined = 0xFF,
}

impl ElementKind {
    /// Decodes kind bits (already shifted down).
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::Surface,
            1 => Self::Path,
            2 => Self::Track,
            3 => Self::Scenery,
            4 => Self::Entrance,
            5 => Self::Fence,
            6 => Self::LargeScenerySegment,
            7 => Self::Banner,
            _ => Self::Undefined,
        }
    }
}

/// Per-element flag bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct ElementFlags(pub u8);

impl ElementFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Construction preview, not yet built.
    pub const GHOST: Self = Self(1 << 4);
    /// Broken down (rides).
    pub const BROKEN: Self = Self(1 << 5);
    /// Track that scenario rules forbid demolishing.
    pub const INDESTRUCTIBLE_TRACK: Self = Self(1 << 6);
    /// Last element of the tile's run.
    pub const LAST_FOR_TILE: Self = Self(1 << 7);

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the bits of `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the bits of `other`.
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Sets or clears the bits of `other`.
    #[inline]
    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    /// Copy with the bits of `other` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for ElementFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ElementFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A single element record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct TileElement {
    /// Kind, direction and quadrant bits.
    pub tag: u8,
    /// Flag bits.
    pub flags: ElementFlags,
    /// Vertical base in height steps.
    pub base_height: u8,
    /// Vertical top in height steps.
    pub clearance_height: u8,
    /// Kind-specific payload.
    pub properties: [u8; 4],
}

impl TileElement {
    /// A free slot. Tombstones have no kind and no flags.
    pub const TOMBSTONE: Self = Self {
        tag: 0,
        flags: ElementFlags::NONE,
        base_height: TOMBSTONE_HEIGHT,
        clearance_height: 0,
        properties: [0; 4],
    };

    /// Creates an element of `kind` spanning `base_height..=clearance_height`.
    #[inline]
    #[must_use]
    pub const fn new(kind: ElementKind, base_height: u8, clearance_height: u8) -> Self {
        Self {
            tag: ((kind as u8) << KIND_SHIFT) & KIND_MASK,
            flags: ElementFlags::NONE,
            base_height,
            clearance_height,
            properties: [0; 4],
        }
    }

    /// Decoded element kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        ElementKind::from_bits((self.tag & KIND_MASK) >> KIND_SHIFT)
    }

    /// Replaces the kind bits, keeping direction and quadrant.
    #[inline]
    pub fn set_kind(&mut self, kind: ElementKind) {
        let bits = match kind {
            ElementKind::Undefined => 0x0F,
            other => other as u8,
        };
        self.tag = (self.tag & !KIND_MASK) | (bits << KIND_SHIFT);
    }

    /// Direction the element faces (fences, entrances, track, banners).
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        Direction::from_bits(self.tag & DIRECTION_MASK)
    }

    /// Sets the facing direction.
    #[inline]
    pub fn set_direction(&mut self, direction: Direction) {
        self.tag = (self.tag & !DIRECTION_MASK) | direction as u8;
    }

    /// Occupied quadrant for quarter-tile scenery (0-3).
    #[inline]
    #[must_use]
    pub const fn quadrant(&self) -> u8 {
        (self.tag & QUADRANT_MASK) >> QUADRANT_SHIFT
    }

    /// Sets the occupied quadrant (low two bits of `quadrant`).
    #[inline]
    pub fn set_quadrant(&mut self, quadrant: u8) {
        self.tag = (self.tag & !QUADRANT_MASK) | ((quadrant & 3) << QUADRANT_SHIFT);
    }

    /// Returns true if this slot has been removed.
    #[inline]
    #[must_use]
    pub const fn is_tombstone(&self) -> bool {
        self.base_height == TOMBSTONE_HEIGHT
    }

    /// Returns true if this is the last element of its tile's run.
    #[inline]
    #[must_use]
    pub const fn is_last_for_tile(&self) -> bool {
        self.flags.contains(ElementFlags::LAST_FOR_TILE)
    }

    /// Sets or clears the terminal flag.
    #[inline]
    pub fn set_last_for_tile(&mut self, last: bool) {
        self.flags.set(ElementFlags::LAST_FOR_TILE, last);
    }

    /// Returns true for construction previews.
    #[inline]
    #[must_use]
    pub const fn is_ghost(&self) -> bool {
        self.flags.contains(ElementFlags::GHOST)
    }

    /// Absolute world height of the element's base.
    #[inline]
    #[must_use]
    pub fn base_z(&self) -> i32 {
        i32::from(self.base_height) * crate::coords::HEIGHT_STEP
    }
}
