//! # Whole-Map Passes
//!
//! Run once after a scenario loads, before the first tick.
//!
//! Every pass walks the map with a [`TileElementIterator`], reading the
//! element under the cursor and mutating through its handle. Handles are
//! taken fresh at every step, so a pass never holds one across a mutation
//! that could move elements.

use parkmap_core::element::payload::ENTRANCE_TYPE_PARK_ENTRANCE;
use parkmap_core::{
    Direction, ElementFlags, ElementKind, StoreError, TileCoord, TileElement, TileElementIterator, TileRect,
    WorldStore,
};

use crate::error::FixupResult;

/// Most park entrances a map can have.
pub const MAX_PARK_ENTRANCES: usize = 4;

/// Terrain ids of the old surface set, indexed by old id.
const LEGACY_TERRAIN: [u8; 16] = [0, 1, 2, 3, 4, 5, 6, 2, 7, 2, 2, 2, 8, 9, 10, 11];

/// Edge style ids of the old surface set, indexed by old id.
const LEGACY_EDGE: [u8; 16] = [0, 0, 0, 1, 0, 0, 2, 0, 3, 0, 0, 0, 0, 0, 0, 0];

/// Geometric sculptures whose second colour was implicit.
const LEGACY_SCULPTURES: [u8; 5] = [157, 162, 168, 170, 171];

/// Counters from [`remove_all_rides`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RideRemovalReport {
    /// Track pieces removed.
    pub track_removed: usize,
    /// Ride entrances and exits removed.
    pub entrances_removed: usize,
    /// Queue paths detached from their ride.
    pub queues_unlinked: usize,
    /// Surfaces inserted so no tile ends up empty.
    pub placeholders: usize,
}

/// Origin tile of a park entrance, in world units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParkEntrance {
    /// World x of the tile corner.
    pub x: i64,
    /// World y of the tile corner.
    pub y: i64,
    /// World z of the entrance base.
    pub z: i32,
    /// Facing direction.
    pub direction: Direction,
}

/// Strips every ride from the map.
///
/// Track and ride entrances/exits are removed; queue paths stay but lose their
/// ride link. Park entrances are kept. A ride element that is the only thing
/// on its tile is first joined by a default surface, so the tile never empties.
///
/// # Errors
///
/// Returns [`FixupError::Store`](crate::FixupError::Store) if a placeholder
/// cannot be inserted (arena full).
pub fn remove_all_rides(store: &mut WorldStore) -> FixupResult<RideRemovalReport> {
    let mut report = RideRemovalReport::default();
    let mut it = TileElementIterator::new(store);

    while it.advance(store) {
        let (Some(handle), Some(&element)) = (it.handle(store), it.element(store)) else {
            continue;
        };

        let ride_part = match element.kind() {
            ElementKind::Track => true,
            ElementKind::Entrance => element.entrance_type() != ENTRANCE_TYPE_PARK_ENTRANCE,
            ElementKind::Path => {
                if element.is_queue() && (element.has_ride_link() || element.addition_status() != 0xFF) {
                    if let Some(mut path) = store.resolve_mut(handle) {
                        path.clear_ride_link();
                        report.queues_unlinked += 1;
                    }
                }
                false
            }
            _ => false,
        };
        if !ride_part {
            continue;
        }

        match store.remove(handle) {
            Ok(()) => {
                if element.kind() == ElementKind::Track {
                    report.track_removed += 1;
                } else {
                    report.entrances_removed += 1;
                }
            }
            Err(StoreError::LastElementInTile { x, y }) => {
                // The element is removed when the tile is revisited.
                let surface = placeholder_surface(store);
                store.insert_element(x, y, surface)?;
                report.placeholders += 1;
            }
            Err(e) => return Err(e.into()),
        }
        it.restart_current_tile();
    }

    tracing::debug!(
        track = report.track_removed,
        entrances = report.entrances_removed,
        queues = report.queues_unlinked,
        placeholders = report.placeholders,
        "removed all rides"
    );
    Ok(report)
}

fn placeholder_surface(store: &WorldStore) -> TileElement {
    let config = store.config();
    let mut surface = TileElement::surface(config.surface_height, config.surface_terrain, config.surface_edge);
    surface.set_grass_length(1);
    surface
}

/// Converts surface styles from the old terrain set to the current one.
///
/// # Returns
///
/// Number of surfaces whose terrain or edge changed.
pub fn remap_legacy_terrain(store: &mut WorldStore) -> usize {
    let mut changed = 0;
    let mut it = TileElementIterator::new(store);

    while it.advance(store) {
        let Some(mut element) = it.element_mut(store) else {
            continue;
        };
        if element.kind() != ElementKind::Surface {
            continue;
        }

        let terrain = LEGACY_TERRAIN[usize::from(element.terrain() & 0x0F)];
        let edge = LEGACY_EDGE[usize::from(element.terrain_edge() & 0x0F)];
        if terrain != element.terrain() || edge != element.terrain_edge() {
            element.set_terrain(terrain);
            element.set_terrain_edge(edge);
            changed += 1;
        }
    }

    tracing::debug!(changed, "remapped legacy terrain");
    changed
}

/// Gives the old geometric sculptures their implicit second colour.
///
/// # Returns
///
/// Number of scenery elements updated.
pub fn fix_legacy_scenery(store: &mut WorldStore) -> usize {
    let mut fixed = 0;
    let mut it = TileElementIterator::new(store);

    while it.advance(store) {
        let Some(mut element) = it.element_mut(store) else {
            continue;
        };
        if element.kind() == ElementKind::Scenery && LEGACY_SCULPTURES.contains(&element.scenery_type()) {
            let colour_1 = element.colour_1();
            element.set_colours(colour_1, 2);
            fixed += 1;
        }
    }
    fixed
}

/// Finds the origin tile of every park entrance, at most
/// [`MAX_PARK_ENTRANCES`].
#[must_use]
pub fn find_park_entrances(store: &WorldStore) -> Vec<ParkEntrance> {
    let mut entrances = Vec::with_capacity(MAX_PARK_ENTRANCES);
    let mut it = TileElementIterator::new(store);

    while entrances.len() < MAX_PARK_ENTRANCES && it.advance(store) {
        let Some(element) = it.element(store) else {
            continue;
        };
        if element.kind() != ElementKind::Entrance
            || element.entrance_type() != ENTRANCE_TYPE_PARK_ENTRANCE
            || element.entrance_index() & 0x0F != 0
        {
            continue;
        }

        let coord = it.coord();
        entrances.push(ParkEntrance {
            x: coord.world_x(),
            y: coord.world_y(),
            z: element.base_z(),
            direction: element.direction(),
        });
    }
    entrances
}

/// Clears the path style drawn under the park entrance on tile (x, y).
///
/// # Returns
///
/// `true` if the tile had a park entrance.
pub fn reset_park_entrance_path(store: &mut WorldStore, x: u32, y: u32) -> bool {
    let coord = TileCoord::new(x, y);
    let mut it = TileElementIterator::over_region(TileRect::new(coord, coord));

    while it.advance(store) {
        let Some(mut element) = it.element_mut(store) else {
            continue;
        };
        if element.kind() == ElementKind::Entrance && element.entrance_type() == ENTRANCE_TYPE_PARK_ENTRANCE {
            element.set_entrance_path_type(0);
            return true;
        }
    }
    false
}

/// Sets or clears the indestructible flag on every track piece.
///
/// # Returns
///
/// Number of track pieces visited.
pub fn set_track_indestructible(store: &mut WorldStore, indestructible: bool) -> usize {
    let mut count = 0;
    let mut it = TileElementIterator::new(store);

    while it.advance(store) {
        let Some(mut element) = it.element_mut(store) else {
            continue;
        };
        if element.kind() == ElementKind::Track {
            element.flags.set(ElementFlags::INDESTRUCTIBLE_TRACK, indestructible);
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkmap_core::element::payload::ENTRANCE_TYPE_RIDE_EXIT;
    use parkmap_core::element::surface::{terrain, terrain_edge};

    fn store() -> WorldStore {
        let mut store = WorldStore::new();
        store.init(4, 4, 128).unwrap();
        store
    }

    fn track(height: u8) -> TileElement {
        TileElement::new(ElementKind::Track, height, height + 2)
    }

    #[test]
    fn test_remove_all_rides() {
        let mut store = store();
        store.insert_element(1, 1, track(20)).unwrap();
        store.insert_element(1, 1, track(30)).unwrap();

        let mut exit = TileElement::new(ElementKind::Entrance, 14, 18);
        exit.set_entrance_type(ENTRANCE_TYPE_RIDE_EXIT);
        store.insert_element(2, 3, exit).unwrap();

        let mut park = TileElement::new(ElementKind::Entrance, 14, 18);
        park.set_entrance_type(ENTRANCE_TYPE_PARK_ENTRANCE);
        store.insert_element(0, 0, park).unwrap();

        let mut queue = TileElement::new(ElementKind::Path, 14, 16);
        queue.set_queue(true);
        queue.set_path_type(0x08 | 0x02);
        queue.set_ride_index(3);
        store.insert_element(3, 0, queue).unwrap();

        let report = remove_all_rides(&mut store).unwrap();
        assert_eq!(report.track_removed, 2);
        assert_eq!(report.entrances_removed, 1);
        assert_eq!(report.queues_unlinked, 1);
        assert_eq!(report.placeholders, 0);

        assert_eq!(store.elements().count(), 16 + 2);
        let queue = store.tile_elements(3, 0).find(|e| e.kind() == ElementKind::Path).unwrap();
        assert_eq!(queue.path_type(), 0x02);
        assert_eq!(queue.addition_status(), 0xFF);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_remove_all_rides_keeps_tile_populated() {
        let mut store = store();
        let mut elements: Vec<TileElement> = store.arena().as_slice().to_vec();
        let mut lone = track(40);
        lone.set_last_for_tile(true);
        elements[5] = lone;
        store.load_elements(&elements).unwrap();

        let report = remove_all_rides(&mut store).unwrap();
        assert_eq!(report.track_removed, 1);
        assert_eq!(report.placeholders, 1);

        let tile: Vec<&TileElement> = store.tile_elements(1, 1).collect();
        assert_eq!(tile.len(), 1);
        assert_eq!(tile[0].kind(), ElementKind::Surface);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_remap_legacy_terrain() {
        let mut store = store();
        let handle = store.first_element_at(2, 2).unwrap();
        {
            let mut surface = store.resolve_mut(handle).unwrap();
            surface.set_terrain(7);
            surface.set_terrain_edge(3);
        }

        // Every other tile is grass/rock, which maps onto itself.
        assert_eq!(remap_legacy_terrain(&mut store), 1);
        let surface = store.tile_elements(2, 2).next().unwrap();
        assert_eq!(surface.terrain(), terrain::DIRT);
        assert_eq!(surface.terrain_edge(), terrain_edge::WOOD_RED);
    }

    #[test]
    fn test_fix_legacy_scenery() {
        let mut store = store();
        for (x, id) in [(0, 157u8), (1, 158), (2, 171)] {
            let mut scenery = TileElement::new(ElementKind::Scenery, 14, 20);
            scenery.set_scenery_type(id);
            scenery.set_colours(5, 0);
            store.insert_element(x, 0, scenery).unwrap();
        }

        assert_eq!(fix_legacy_scenery(&mut store), 2);
        let colours: Vec<(u8, u8)> = store
            .elements()
            .filter(|(_, e)| e.kind() == ElementKind::Scenery)
            .map(|(_, e)| (e.colour_1(), e.colour_2()))
            .collect();
        assert_eq!(colours, vec![(5, 2), (5, 0), (5, 2)]);
    }

    #[test]
    fn test_find_park_entrances() {
        let mut store = store();
        for (x, index) in [(1, 0x00u8), (2, 0x01), (3, 0x10)] {
            let mut entrance = TileElement::new(ElementKind::Entrance, 16, 20);
            entrance.set_entrance_type(ENTRANCE_TYPE_PARK_ENTRANCE);
            entrance.set_entrance_index(index);
            entrance.set_direction(Direction::East);
            store.insert_element(x, 2, entrance).unwrap();
        }

        let entrances = find_park_entrances(&store);
        assert_eq!(
            entrances,
            vec![
                ParkEntrance { x: 32, y: 64, z: 128, direction: Direction::East },
                ParkEntrance { x: 96, y: 64, z: 128, direction: Direction::East },
            ]
        );

        assert!(reset_park_entrance_path(&mut store, 1, 2));
        assert!(!reset_park_entrance_path(&mut store, 0, 2));
    }

    #[test]
    fn test_set_track_indestructible() {
        let mut store = store();
        store.insert_element(0, 1, track(20)).unwrap();
        store.insert_element(3, 3, track(20)).unwrap();

        assert_eq!(set_track_indestructible(&mut store, true), 2);
        assert!(store
            .elements()
            .filter(|(_, e)| e.kind() == ElementKind::Track)
            .all(|(_, e)| e.is_indestructible()));

        set_track_indestructible(&mut store, false);
        assert!(!store.elements().any(|(_, e)| e.is_indestructible()));
    }
}
