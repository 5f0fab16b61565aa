//! # PARKMAP Fix-ups
//!
//! Whole-map passes, tile and land queries, and the grass sweep, built on
//! the core iterator protocol.
//!
//! ## Rules
//!
//! 1. **Mechanical only** - No costing or object lookups
//! 2. **Restart on mutation** - Any removal or insertion inside the tile being
//!    visited restarts that tile
//! 3. **One tick** - Passes finish before the next compaction step
//! 4. **Bounded sweeps** - Per-tick work ([`GrassUpdater`]) examines a fixed
//!    number of tiles and resumes where it stopped
//!
//! ## Example
//!
//! ```rust,ignore
//! use parkmap_fixups::{remap_legacy_terrain, remove_all_rides};
//!
//! store.load_bytes(&scenario)?;
//! remap_legacy_terrain(&mut store);
//! let report = remove_all_rides(&mut store)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod grass;
pub mod land;
pub mod passes;
pub mod queries;
pub mod surface;

pub use error::{FixupError, FixupResult};
pub use grass::{GrassReport, GrassUpdater, DEFAULT_TILES_PER_TICK};
pub use land::{
    element_height, height_from_slope, is_location_in_park, is_location_owned, TerrainHeight,
    OFF_MAP_HEIGHT,
};
pub use passes::{
    find_park_entrances, fix_legacy_scenery, remap_legacy_terrain, remove_all_rides,
    reset_park_entrance_path, set_track_indestructible, ParkEntrance, RideRemovalReport,
    MAX_PARK_ENTRANCES,
};
pub use queries::{
    coord_is_connected, path_element_at, remove_intersecting_fences, surface_element_at,
};
pub use surface::paint_surface;
