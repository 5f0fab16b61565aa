//! # Land Queries
//!
//! Height and ownership lookups against the surface element of a tile.
//! Positions are world units (32 per tile edge, 8 per height step).

use parkmap_core::coords::HEIGHT_STEP;
use parkmap_core::element::surface::{ownership, SLOPE_DOUBLE_HEIGHT};
use parkmap_core::{ElementKind, TileCoord, TileElement, WorldStore};

/// Last world offset inside a tile.
const TILE_EDGE: i32 = 31;

/// Land height reported for positions off the map.
pub const OFF_MAP_HEIGHT: i32 = 16;

/// Terrain height at a world position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainHeight {
    /// Land height in world units, slope included.
    pub land: i32,
    /// Water surface in world units, 0 when dry.
    pub water: i32,
}

impl TerrainHeight {
    /// Returns true if water stands above the land.
    #[inline]
    #[must_use]
    pub const fn is_underwater(&self) -> bool {
        self.water > self.land
    }
}

fn surface_at_world(store: &WorldStore, world_x: i32, world_y: i32) -> Option<&TileElement> {
    let coord = TileCoord::from_world(world_x, world_y)?;
    if coord.x >= store.width() || coord.y >= store.height() {
        return None;
    }
    store
        .tile_elements(coord.x, coord.y)
        .find(|e| e.kind() == ElementKind::Surface)
}

/// Height of the land at a world position, following the surface slope.
///
/// Positions off the map (or on a tile without a surface) report
/// [`OFF_MAP_HEIGHT`] and no water.
#[must_use]
pub fn element_height(store: &WorldStore, world_x: i32, world_y: i32) -> TerrainHeight {
    let Some(surface) = surface_at_world(store, world_x, world_y) else {
        return TerrainHeight {
            land: OFF_MAP_HEIGHT,
            water: 0,
        };
    };

    let xl = world_x & TILE_EDGE;
    let yl = world_y & TILE_EDGE;
    TerrainHeight {
        land: land_height(surface.base_height, surface.slope(), xl, yl),
        water: i32::from(surface.water_height()) * HEIGHT_STEP,
    }
}

/// Land height inside one tile; `xl`/`yl` are offsets 0..=31 from its corner.
///
/// Each of the low four slope bits raises one corner; the double-height bit
/// only matters when three corners are raised.
fn land_height(base_height: u8, slope: u8, xl: i32, yl: i32) -> i32 {
    let base = i32::from(base_height) * HEIGHT_STEP;
    let double = slope & SLOPE_DOUBLE_HEIGHT != 0;

    let rise = match slope & 0x0F {
        // One corner up
        1 => (xl + yl - TILE_EDGE).max(0) / 2,
        2 => (xl - yl).max(0) / 2,
        4 => (TILE_EDGE - yl - xl).max(0) / 2,
        8 => (yl - xl).max(0) / 2,

        // One side up
        3 => xl / 2 + 1,
        6 => (TILE_EDGE - yl) / 2,
        9 => yl / 2 + 1,
        12 => (TILE_EDGE - xl) / 2,

        // One corner down
        corner @ (7 | 11 | 13 | 14) => {
            let (rise_double, dip) = match corner {
                7 => (xl + TILE_EDGE - yl, xl - yl),
                11 => (xl + yl, xl + yl - TILE_EDGE - 1),
                13 => (TILE_EDGE - xl + yl, yl - xl),
                _ => ((TILE_EDGE - xl) + (TILE_EDGE - yl), TILE_EDGE - yl - xl - 1),
            };
            if double {
                rise_double / 2 + 1
            } else {
                2 * HEIGHT_STEP + dip.min(0) / 2
            }
        }

        // NE-SW valley; the NW-SE valley stays at base height
        10 => (xl - yl).max(0) / 2,

        _ => 0,
    };
    base + rise
}

/// Extra height of a sloped path at a world position.
///
/// Bit 2 of `slope` marks the path as sloped and the low two bits give the
/// direction it rises towards.
#[must_use]
pub const fn height_from_slope(world_x: i32, world_y: i32, slope: u8) -> i32 {
    if slope & 4 == 0 {
        return 0;
    }
    match slope & 3 {
        0 => (TILE_EDGE - (world_x & TILE_EDGE)) / 2,
        1 => (world_y & TILE_EDGE) / 2,
        2 => (world_x & TILE_EDGE) / 2,
        _ => (TILE_EDGE - (world_y & TILE_EDGE)) / 2,
    }
}

/// Returns true if the park may build at world position (x, y, z).
///
/// Owned land allows any height. Construction rights allow building below
/// the surface's base or more than two steps above it.
#[must_use]
pub fn is_location_owned(store: &WorldStore, world_x: i32, world_y: i32, world_z: i32) -> bool {
    let Some(surface) = surface_at_world(store, world_x, world_y) else {
        return false;
    };
    let bits = surface.ownership();
    if bits & ownership::OWNED != 0 {
        return true;
    }
    if bits & ownership::CONSTRUCTION_RIGHTS_OWNED != 0 {
        let z = world_z / HEIGHT_STEP;
        let base = i32::from(surface.base_height);
        return z < base || z - 2 > base;
    }
    false
}

/// Returns true if world position (x, y) lies on park-owned land.
#[must_use]
pub fn is_location_in_park(store: &WorldStore, world_x: i32, world_y: i32) -> bool {
    surface_at_world(store, world_x, world_y)
        .is_some_and(|surface| surface.ownership() & ownership::OWNED != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::surface_element_at;

    fn store() -> WorldStore {
        let mut store = WorldStore::new();
        store.init(4, 4, 64).unwrap();
        store
    }

    fn edit_surface(store: &mut WorldStore, x: u32, y: u32, edit: impl FnOnce(&mut TileElement)) {
        let handle = surface_element_at(store, x, y).unwrap();
        let mut surface = store.resolve_mut(handle).unwrap();
        edit(&mut *surface);
    }

    #[test]
    fn test_flat_and_off_map_height() {
        let store = store();
        assert_eq!(element_height(&store, 40, 70).land, 14 * 8);
        assert_eq!(element_height(&store, 40, 70).water, 0);
        assert_eq!(element_height(&store, 200, 0).land, OFF_MAP_HEIGHT);
        assert_eq!(element_height(&store, -5, 0).land, OFF_MAP_HEIGHT);
    }

    #[test]
    fn test_sloped_heights() {
        let base = 14 * 8;
        // East side up: rises across x
        assert_eq!(land_height(14, 3, 0, 10), base + 1);
        assert_eq!(land_height(14, 3, 31, 10), base + 16);
        // One corner up: only its half of the tile rises
        assert_eq!(land_height(14, 1, 31, 31), base + 15);
        assert_eq!(land_height(14, 1, 0, 0), base);
        // One corner down sits a full step up away from the dip
        assert_eq!(land_height(14, 11, 31, 31), base + 16);
        assert_eq!(land_height(14, 11, 0, 0), base + 16 - 16);
        // Double height reaches two steps
        assert_eq!(land_height(14, 11 | SLOPE_DOUBLE_HEIGHT, 31, 31), base + 32);
        // Valleys
        assert_eq!(land_height(14, 10, 31, 0), base + 15);
        assert_eq!(land_height(14, 5, 31, 31), base);
    }

    #[test]
    fn test_element_height_reads_surface() {
        let mut store = store();
        edit_surface(&mut store, 1, 2, |surface| {
            surface.set_slope(3);
            surface.set_water_height(20);
        });

        let height = element_height(&store, 32 + 31, 64 + 5);
        assert_eq!(height.land, 14 * 8 + 16);
        assert_eq!(height.water, 20 * 8);
        assert!(height.is_underwater());
    }

    #[test]
    fn test_height_from_slope() {
        assert_eq!(height_from_slope(10, 10, 0), 0);
        assert_eq!(height_from_slope(0, 0, 4), 15);
        assert_eq!(height_from_slope(31, 0, 4 | 2), 15);
        assert_eq!(height_from_slope(0, 20, 4 | 1), 10);
        assert_eq!(height_from_slope(0, 20, 4 | 3), 5);
    }

    #[test]
    fn test_ownership_queries() {
        let mut store = store();
        edit_surface(&mut store, 0, 0, |s| s.set_ownership(ownership::OWNED));
        edit_surface(&mut store, 1, 0, |s| {
            s.set_ownership(ownership::CONSTRUCTION_RIGHTS_OWNED);
        });

        assert!(is_location_in_park(&store, 5, 5));
        assert!(is_location_owned(&store, 5, 5, 14 * 8));
        assert!(!is_location_in_park(&store, 40, 5));

        // Construction rights: below the base or above base + 2 only
        assert!(is_location_owned(&store, 40, 5, 13 * 8));
        assert!(!is_location_owned(&store, 40, 5, 15 * 8));
        assert!(is_location_owned(&store, 40, 5, 17 * 8));

        assert!(!is_location_owned(&store, 70, 5, 0));
        assert!(!is_location_in_park(&store, 1000, 5));
    }
}
