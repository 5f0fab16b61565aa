//! # Grass Growth
//!
//! A bounded per-tick sweep over the map's surfaces. Each tick examines a
//! fixed number of tile positions and persists its position, so growth work
//! stays flat no matter how large the map is.
//!
//! Positions are visited in bit-reversed interleaved order over the smallest
//! power-of-two square covering the map, which spreads consecutive updates
//! across the whole park instead of sweeping row by row. Positions outside a
//! non-square map still count against the budget.

use parkmap_core::element::surface::{grass, ownership, terrain, SLOPE_DOUBLE_HEIGHT};
use parkmap_core::{ElementKind, TileElement, WorldStore};
use rand::Rng;

use crate::queries::surface_element_at;

/// Tile positions examined per tick by default.
pub const DEFAULT_TILES_PER_TICK: usize = 43;

/// Growth counter step, added to the high nibble of the grass byte.
const GROWTH_STEP: u8 = 0x10;

/// Toggles between the random-delay phase and the lengthening phase.
const GROWTH_PHASE_BIT: u8 = 0x08;

/// Random part of the next growth delay.
const GROWTH_DELAY_MASK: u8 = 0x70;

/// Counts from one [`GrassUpdater::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrassReport {
    /// Positions examined, on or off the map.
    pub examined: usize,
    /// Surfaces whose grass length went up.
    pub lengthened: usize,
    /// Surfaces cut back because they are flooded or outside the park.
    pub cleared: usize,
}

/// Persistent cursor of the grass sweep.
#[derive(Clone, Debug)]
pub struct GrassUpdater {
    position: u32,
    tiles_per_tick: usize,
}

impl Default for GrassUpdater {
    fn default() -> Self {
        Self::new(DEFAULT_TILES_PER_TICK)
    }
}

impl GrassUpdater {
    /// Creates an updater examining `tiles_per_tick` positions per tick.
    ///
    /// # Panics
    ///
    /// Panics if `tiles_per_tick` is zero.
    #[must_use]
    pub fn new(tiles_per_tick: usize) -> Self {
        assert!(tiles_per_tick > 0, "Grass update budget must be non-zero");
        Self {
            position: 0,
            tiles_per_tick,
        }
    }

    /// Positions examined per tick.
    #[inline]
    #[must_use]
    pub const fn tiles_per_tick(&self) -> usize {
        self.tiles_per_tick
    }

    /// Advances the sweep by one tick's worth of positions.
    ///
    /// `rng` picks the random delay between growth steps.
    pub fn tick<R: Rng + ?Sized>(&mut self, store: &mut WorldStore, rng: &mut R) -> GrassReport {
        let mut report = GrassReport::default();
        if !store.is_initialized() {
            return report;
        }

        let bits = store.width().max(store.height()).next_power_of_two().trailing_zeros();
        let positions = 1u64 << (2 * bits);

        for _ in 0..self.tiles_per_tick {
            let (x, y) = deinterleave(self.position, bits);
            self.position = ((u64::from(self.position) + 1) % positions) as u32;
            report.examined += 1;

            if x < store.width() && y < store.height() {
                match update_grass_length(store, x, y, rng) {
                    Some(GrassChange::Lengthened) => report.lengthened += 1,
                    Some(GrassChange::Cleared) => report.cleared += 1,
                    None => {}
                }
            }
        }

        if report.lengthened + report.cleared > 0 {
            tracing::trace!(
                lengthened = report.lengthened,
                cleared = report.cleared,
                "grass updated"
            );
        }
        report
    }
}

/// Splits a sweep position into tile coordinates, lowest bits first.
fn deinterleave(mut position: u32, bits: u32) -> (u32, u32) {
    let (mut x, mut y) = (0, 0);
    for _ in 0..bits {
        x = (x << 1) | (position & 1);
        position >>= 1;
        y = (y << 1) | (position & 1);
        position >>= 1;
    }
    (x, y)
}

enum GrassChange {
    Lengthened,
    Cleared,
}

/// Advances the grass on the surface of tile (x, y).
fn update_grass_length<R: Rng + ?Sized>(
    store: &mut WorldStore,
    x: u32,
    y: u32,
    rng: &mut R,
) -> Option<GrassChange> {
    let (surface, covered) = {
        let mut elements = store.tile_elements(x, y);
        let surface = *elements.find(|e| e.kind() == ElementKind::Surface)?;
        let covered = elements.any(|above| covers_grass(&surface, above));
        (surface, covered)
    };

    if surface.terrain() != terrain::GRASS {
        return None;
    }

    let byte = surface.grass_length();
    let length = byte & grass::LENGTH_MASK;

    let flooded = surface.water_height() > surface.base_height;
    let in_park = surface.ownership() & ownership::OWNED != 0;
    if flooded || !in_park {
        if length == grass::CLEAR_0 {
            return None;
        }
        set_grass(store, x, y, grass::CLEAR_0)?;
        return Some(GrassChange::Cleared);
    }

    if length == grass::CLUMPS_2 || covered {
        return None;
    }

    if byte < 0xF0 {
        set_grass(store, x, y, byte + GROWTH_STEP)?;
        return None;
    }

    let next = byte.wrapping_add(GROWTH_STEP) ^ GROWTH_PHASE_BIT;
    if next & GROWTH_PHASE_BIT != 0 {
        set_grass(store, x, y, next | (rng.gen::<u8>() & GROWTH_DELAY_MASK))?;
        None
    } else {
        set_grass(store, x, y, length + 1)?;
        Some(GrassChange::Lengthened)
    }
}

/// Returns true if `above` sits low enough on the surface to stop growth.
/// Fences never do.
fn covers_grass(surface: &TileElement, above: &TileElement) -> bool {
    if above.kind() == ElementKind::Fence {
        return false;
    }
    let z0 = surface.base_height;
    let mut z1 = surface.base_height.saturating_add(2);
    if surface.slope() & SLOPE_DOUBLE_HEIGHT != 0 {
        z1 = z1.saturating_add(2);
    }
    z0 < above.clearance_height && z1 >= above.base_height
}

fn set_grass(store: &mut WorldStore, x: u32, y: u32, byte: u8) -> Option<()> {
    let handle = surface_element_at(store, x, y)?;
    store.resolve_mut(handle)?.set_grass_length(byte);
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkmap_core::ElementHandle;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn store() -> WorldStore {
        let mut store = WorldStore::new();
        store.init(4, 4, 64).unwrap();
        store
    }

    fn surface(store: &WorldStore, x: u32, y: u32) -> TileElement {
        *store.resolve(surface_element_at(store, x, y).unwrap()).unwrap()
    }

    fn edit(store: &mut WorldStore, x: u32, y: u32, edit: impl FnOnce(&mut TileElement)) {
        let handle: ElementHandle = surface_element_at(store, x, y).unwrap();
        let mut surface = store.resolve_mut(handle).unwrap();
        edit(&mut *surface);
    }

    fn own_everything(store: &mut WorldStore) {
        for y in 0..4 {
            for x in 0..4 {
                edit(store, x, y, |s| s.set_ownership(ownership::OWNED));
            }
        }
    }

    #[test]
    fn test_deinterleave_covers_square() {
        let mut seen: Vec<(u32, u32)> = (0..16).map(|p| deinterleave(p, 2)).collect();
        assert_eq!(deinterleave(1, 2), (2, 0));
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 16);
        assert!(seen.iter().all(|&(x, y)| x < 4 && y < 4));
    }

    #[test]
    fn test_budget_bounds_each_tick() {
        let mut store = store();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut updater = GrassUpdater::new(5);
        for _ in 0..10 {
            assert_eq!(updater.tick(&mut store, &mut rng).examined, 5);
        }
    }

    #[test]
    fn test_grass_grows_in_park() {
        let mut store = store();
        own_everything(&mut store);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut updater = GrassUpdater::new(16);

        // 15 ticks fill the growth counter, the 16th starts a random delay.
        for _ in 0..16 {
            updater.tick(&mut store, &mut rng);
        }
        let byte = surface(&store, 2, 3).grass_length();
        assert_eq!(byte & 0x0F, grass::CLEAR_0 | GROWTH_PHASE_BIT);

        let mut lengthened = 0;
        for _ in 0..32 {
            lengthened += updater.tick(&mut store, &mut rng).lengthened;
            if surface(&store, 2, 3).grass_length() & grass::LENGTH_MASK == grass::CLEAR_1 {
                break;
            }
        }
        assert_eq!(surface(&store, 2, 3).grass_length(), grass::CLEAR_1);
        assert!(lengthened >= 1);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_covered_grass_does_not_grow() {
        let mut store = store();
        own_everything(&mut store);
        store
            .insert_element(1, 1, TileElement::new(ElementKind::Scenery, 14, 20))
            .unwrap();
        store
            .insert_element(2, 1, TileElement::new(ElementKind::Fence, 14, 18))
            .unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut updater = GrassUpdater::new(16);
        updater.tick(&mut store, &mut rng);

        assert_eq!(surface(&store, 1, 1).grass_length(), grass::CLEAR_0);
        assert_eq!(surface(&store, 2, 1).grass_length(), grass::CLEAR_0 + GROWTH_STEP);
    }

    #[test]
    fn test_flooded_and_unowned_grass_is_cleared() {
        let mut store = store();
        own_everything(&mut store);
        edit(&mut store, 0, 0, |s| {
            s.set_grass_length(grass::CLUMPS_0);
            s.set_water_height(20);
        });
        edit(&mut store, 3, 0, |s| {
            s.set_grass_length(grass::CLUMPS_1);
            s.set_ownership(0);
        });
        edit(&mut store, 0, 3, |s| {
            s.set_grass_length(grass::CLUMPS_1);
            s.set_terrain(terrain::SAND);
            s.set_ownership(0);
        });

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let report = GrassUpdater::new(16).tick(&mut store, &mut rng);

        assert_eq!(report.cleared, 2);
        assert_eq!(surface(&store, 0, 0).grass_length(), grass::CLEAR_0);
        assert_eq!(surface(&store, 3, 0).grass_length(), grass::CLEAR_0);
        assert_eq!(surface(&store, 0, 3).grass_length(), grass::CLUMPS_1);
    }

    #[test]
    fn test_fully_grown_grass_stays() {
        let mut store = store();
        own_everything(&mut store);
        edit(&mut store, 1, 2, |s| s.set_grass_length(grass::CLUMPS_2));

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        GrassUpdater::new(16).tick(&mut store, &mut rng);
        assert_eq!(surface(&store, 1, 2).grass_length(), grass::CLUMPS_2);
    }

    #[test]
    fn test_uninitialized_store_is_skipped() {
        let mut store = WorldStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(GrassUpdater::default().tick(&mut store, &mut rng), GrassReport::default());
    }
}
