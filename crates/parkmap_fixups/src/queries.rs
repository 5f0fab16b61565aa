//! # Tile Queries
//!
//! Single-tile lookups used by game commands before they mutate.

use parkmap_core::{
    Direction, ElementHandle, ElementKind, TileCoord, TileElementIterator, TileRect, WorldStore,
};

use crate::error::FixupResult;

fn tile_cursor(x: u32, y: u32) -> TileElementIterator {
    let coord = TileCoord::new(x, y);
    TileElementIterator::over_region(TileRect::new(coord, coord))
}

/// Surface element of tile (x, y).
///
/// Off-grid tiles are logged by the tile index and yield `None`.
#[must_use]
pub fn surface_element_at(store: &WorldStore, x: u32, y: u32) -> Option<ElementHandle> {
    let mut it = tile_cursor(x, y);
    while it.advance(store) {
        if it.element(store)?.kind() == ElementKind::Surface {
            return it.handle(store);
        }
    }
    None
}

/// Path element of tile (x, y) whose base sits at `base_height`.
#[must_use]
pub fn path_element_at(store: &WorldStore, x: u32, y: u32, base_height: u8) -> Option<ElementHandle> {
    let mut it = tile_cursor(x, y);
    while it.advance(store) {
        let element = it.element(store)?;
        if element.kind() == ElementKind::Path && element.base_height == base_height {
            return it.handle(store);
        }
    }
    None
}

/// Returns true if a path on tile (x, y) meets height `z` when entered
/// facing `face`.
///
/// Flat paths connect at their base. Sloped paths connect at their top
/// from the side they rise towards, and at their base from the opposite side.
#[must_use]
pub fn coord_is_connected(store: &WorldStore, x: u32, y: u32, z: u8, face: Direction) -> bool {
    store
        .tile_elements(x, y)
        .filter(|e| e.kind() == ElementKind::Path)
        .any(|path| {
            let base = path.base_height;
            if !path.is_sloped_path() {
                return z == base;
            }
            let rises = path.path_slope_direction();
            if rises == face {
                u16::from(z) == u16::from(base) + 2
            } else {
                rises.rotated(2) == face && z == base
            }
        })
}

/// Removes every fence on `direction`'s edge of tile (x, y) that overlaps
/// the height span `z0..z1`.
///
/// # Returns
///
/// Number of fences removed.
///
/// # Errors
///
/// Returns [`FixupError::Store`](crate::FixupError::Store) if a removal is
/// rejected (a fence that is the tile's only element).
pub fn remove_intersecting_fences(
    store: &mut WorldStore,
    x: u32,
    y: u32,
    z0: u8,
    z1: u8,
    direction: Direction,
) -> FixupResult<usize> {
    let mut removed = 0;
    let mut it = tile_cursor(x, y);

    while it.advance(store) {
        let (Some(handle), Some(element)) = (it.handle(store), it.element(store)) else {
            continue;
        };
        if element.kind() != ElementKind::Fence || element.direction() != direction {
            continue;
        }
        if z0 >= element.clearance_height || z1 <= element.base_height {
            continue;
        }

        store.remove(handle)?;
        removed += 1;
        it.restart_current_tile();
    }

    if removed > 0 {
        tracing::trace!(x, y, removed, "removed intersecting fences");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkmap_core::{ElementFlags, TileElement};

    fn store() -> WorldStore {
        let mut store = WorldStore::new();
        store.init(3, 3, 64).unwrap();
        store
    }

    fn fence(base: u8, clearance: u8, direction: Direction) -> TileElement {
        let mut fence = TileElement::new(ElementKind::Fence, base, clearance);
        fence.set_direction(direction);
        fence
    }

    #[test]
    fn test_surface_element_at() {
        let mut store = store();
        store.insert(1, 1, 2, ElementFlags::NONE).unwrap();
        let mut path = TileElement::new(ElementKind::Path, 4, 6);
        path.set_path_type(1);
        store.insert_element(1, 1, path).unwrap();

        let handle = surface_element_at(&store, 1, 1).unwrap();
        assert_eq!(store.resolve(handle).unwrap().base_height, 2);
        assert!(surface_element_at(&store, 3, 1).is_none());
    }

    #[test]
    fn test_path_element_at() {
        let mut store = store();
        for height in [16, 24] {
            store
                .insert_element(2, 0, TileElement::new(ElementKind::Path, height, height + 2))
                .unwrap();
        }

        let handle = path_element_at(&store, 2, 0, 24).unwrap();
        assert_eq!(store.resolve(handle).unwrap().base_height, 24);
        assert!(path_element_at(&store, 2, 0, 20).is_none());
        assert!(path_element_at(&store, 0, 0, 14).is_none());
    }

    #[test]
    fn test_coord_is_connected() {
        let mut store = store();
        let mut flat = TileElement::new(ElementKind::Path, 20, 22);
        flat.set_path_type(0x10);
        store.insert_element(1, 0, flat).unwrap();

        let mut sloped = TileElement::new(ElementKind::Path, 30, 34);
        sloped.set_path_type(0x04 | Direction::North as u8);
        store.insert_element(2, 0, sloped).unwrap();

        assert!(coord_is_connected(&store, 1, 0, 20, Direction::East));
        assert!(!coord_is_connected(&store, 1, 0, 22, Direction::East));

        assert!(coord_is_connected(&store, 2, 0, 32, Direction::North));
        assert!(!coord_is_connected(&store, 2, 0, 30, Direction::North));
        assert!(coord_is_connected(&store, 2, 0, 30, Direction::South));
        assert!(!coord_is_connected(&store, 2, 0, 30, Direction::West));

        assert!(!coord_is_connected(&store, 0, 0, 14, Direction::West));
    }

    #[test]
    fn test_remove_intersecting_fences() {
        let mut store = store();
        store.insert_element(0, 2, fence(14, 18, Direction::North)).unwrap();
        store.insert_element(0, 2, fence(20, 24, Direction::North)).unwrap();
        store.insert_element(0, 2, fence(14, 18, Direction::East)).unwrap();
        store.insert_element(0, 2, fence(30, 34, Direction::North)).unwrap();

        let removed = remove_intersecting_fences(&mut store, 0, 2, 16, 22, Direction::North).unwrap();
        assert_eq!(removed, 2);

        let left: Vec<(u8, Direction)> = store
            .tile_elements(0, 2)
            .filter(|e| e.kind() == ElementKind::Fence)
            .map(|e| (e.base_height, e.direction()))
            .collect();
        assert_eq!(left, vec![(14, Direction::East), (30, Direction::North)]);
        assert!(store.is_consistent());
    }
}
