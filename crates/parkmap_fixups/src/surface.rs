//! # Surface Painting
//!
//! The mechanical half of "change surface style": restyle every surface in a
//! box. Costing and ownership checks belong to the caller.

use parkmap_core::{ElementKind, TileElementIterator, TileRect, WorldStore};

use crate::error::{FixupError, FixupResult};

const STYLE_MAX: u8 = 0x0F;

/// Sets terrain and edge style on every surface inside `region`.
///
/// `None` leaves that style untouched. The region is clamped to the map.
///
/// # Returns
///
/// Number of surfaces that changed.
///
/// # Errors
///
/// - [`FixupError::InvalidStyle`] for ids above 15
/// - [`FixupError::RegionOutsideMap`] if `region` misses the map entirely
pub fn paint_surface(
    store: &mut WorldStore,
    region: TileRect,
    terrain: Option<u8>,
    edge: Option<u8>,
) -> FixupResult<usize> {
    if terrain.is_some_and(|t| t > STYLE_MAX) || edge.is_some_and(|e| e > STYLE_MAX) {
        return Err(FixupError::InvalidStyle {
            terrain: terrain.unwrap_or(0),
            edge: edge.unwrap_or(0),
        });
    }
    let region = region
        .clamp_to(store.width(), store.height())
        .ok_or(FixupError::RegionOutsideMap)?;

    let mut changed = 0;
    let mut it = TileElementIterator::over_region(region);
    while it.advance(store) {
        let Some(mut element) = it.element_mut(store) else {
            continue;
        };
        if element.kind() != ElementKind::Surface {
            continue;
        }

        let current = (element.terrain(), element.terrain_edge());
        let new_terrain = terrain.unwrap_or(current.0);
        let new_edge = edge.unwrap_or(current.1);
        if (new_terrain, new_edge) != current {
            element.set_terrain(new_terrain);
            element.set_terrain_edge(new_edge);
            changed += 1;
        }
    }

    tracing::trace!(changed, "painted surfaces");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkmap_core::element::surface::{terrain, terrain_edge};
    use parkmap_core::TileCoord;

    fn store() -> WorldStore {
        let mut store = WorldStore::new();
        store.init(4, 4, 64).unwrap();
        store
    }

    #[test]
    fn test_paint_box() {
        let mut store = store();
        let region = TileRect::new(TileCoord::new(1, 1), TileCoord::new(2, 2));
        let changed = paint_surface(&mut store, region, Some(terrain::SAND), None).unwrap();
        assert_eq!(changed, 4);

        let sand: Vec<TileCoord> = store
            .elements()
            .filter(|(_, e)| e.terrain() == terrain::SAND)
            .map(|(coord, _)| coord)
            .collect();
        assert_eq!(sand.len(), 4);
        assert!(sand.iter().all(|&coord| region.contains(coord)));

        // Repainting the same style changes nothing.
        assert_eq!(paint_surface(&mut store, region, Some(terrain::SAND), None).unwrap(), 0);
    }

    #[test]
    fn test_paint_edge_clamped() {
        let mut store = store();
        let region = TileRect::new(TileCoord::new(3, 0), TileCoord::new(9, 9));
        let changed = paint_surface(&mut store, region, None, Some(terrain_edge::ICE)).unwrap();
        assert_eq!(changed, 4);
        let surface = store.tile_elements(3, 3).next().unwrap();
        assert_eq!(surface.terrain_edge(), terrain_edge::ICE);
        assert_eq!(surface.terrain(), terrain::GRASS);
    }

    #[test]
    fn test_paint_errors() {
        let mut store = store();
        let full = TileRect::full(4, 4);
        assert_eq!(
            paint_surface(&mut store, full, Some(16), None),
            Err(FixupError::InvalidStyle { terrain: 16, edge: 0 })
        );
        let outside = TileRect::new(TileCoord::new(8, 8), TileCoord::new(9, 9));
        assert_eq!(
            paint_surface(&mut store, outside, Some(1), Some(1)),
            Err(FixupError::RegionOutsideMap)
        );
    }
}
