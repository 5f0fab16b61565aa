//! # PARKMAP Core
//!
//! The tile element store: every element of every tile packed into one
//! contiguous arena, addressed through a per-tile head index.
//!
//! ## Architecture Rules
//!
//! 1. **One arena** - Elements of a tile form a contiguous run, tiles are laid
//!    out row-major, the last element of a run carries the terminal flag
//! 2. **Removal tombstones** - Nothing moves on removal
//! 3. **Insertion shifts** - Everything after the insertion point moves up one slot
//! 4. **Compaction is bounded** - A fixed amount of work per tick
//! 5. **No raw positions across a tick** - Handles carry the epoch that produced them
//!
//! ## Example
//!
//! ```rust,ignore
//! use parkmap_core::{ElementFlags, ElementKind, WorldStore};
//!
//! let mut store = WorldStore::new();
//! store.init(256, 256, 196_608)?;
//!
//! let handle = store.insert(10, 12, 20, ElementFlags::NONE)?;
//! if let Some(mut element) = store.resolve_mut(handle) {
//!     element.set_kind(ElementKind::Scenery);
//! }
//!
//! // Once per tick: bounded compaction, handles from this tick go stale
//! store.tick();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod compact;
pub mod config;
pub mod coords;
pub mod element;
pub mod error;
pub mod index;
pub mod iter;
pub mod memory;
pub mod store;

pub use compact::{CompactionReport, Compactor};
pub use config::StoreConfig;
pub use coords::{Direction, TileCoord, TileRect};
pub use element::{ElementFlags, ElementKind, TileElement};
pub use error::{LoadError, StoreError, StoreResult};
pub use index::TileIndex;
pub use iter::{Elements, TileElementIterator, TileElements};
pub use memory::{ElementArena, ElementHandle};
pub use store::{ElementMut, WorldStore};
