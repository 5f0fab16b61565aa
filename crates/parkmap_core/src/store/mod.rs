//! # World Store
//!
//! Owns the arena, the tile index and the compactor, and enforces the run
//! invariants across every mutation.
//!
//! ## Lifecycle
//!
//! - [`WorldStore::new`] gives an empty, uninitialized store
//! - [`WorldStore::init`] sizes the map and places one surface per tile
//! - [`WorldStore::load_elements`] replaces the world with a decoded buffer
//! - [`WorldStore::tick`] runs one compaction step and advances the epoch
//! - [`WorldStore::teardown`] releases every element

mod insert;
mod load;
mod remove;

use crate::compact::{CompactionReport, Compactor};
use crate::config::StoreConfig;
use crate::coords::{TileCoord, TileRect};
use crate::element::{ElementFlags, TileElement};
use crate::error::{StoreError, StoreResult};
use crate::index::{TileIndex, MAX_MAP_SIZE};
use crate::iter::{Elements, TileElements};
use crate::memory::{ElementArena, ElementHandle};

/// The tile element store.
///
/// # Example
///
/// ```rust,ignore
/// let mut store = WorldStore::from_config(&StoreConfig::small(4, 4))?;
/// assert_eq!(store.elements().count(), 16);
/// ```
pub struct WorldStore {
    /// Element storage.
    arena: ElementArena,
    /// Per-tile heads.
    index: TileIndex,
    /// Incremental tombstone reclaimer.
    compactor: Compactor,
    /// Defaults for `init`.
    config: StoreConfig,
    /// Advances whenever positions may have changed meaning.
    epoch: u32,
    /// Ticks run since creation.
    ticks: u64,
    /// False until `init` or a successful load.
    initialized: bool,
}

impl WorldStore {
    /// Creates an uninitialized store with the default configuration.
    ///
    /// Memory for the map is not allocated until [`init`](Self::init).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an uninitialized store that will use `config` defaults.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            arena: ElementArena::new(1),
            index: TileIndex::new(1, 1),
            compactor: Compactor::new(config.compaction_budget.max(1)),
            config,
            epoch: 0,
            ticks: 0,
            initialized: false,
        }
    }

    /// Creates and initializes a store from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let mut store = Self::with_config(config.clone());
        store.init(config.width, config.height, config.capacity)?;
        Ok(store)
    }

    /// Sizes the map and fills every tile with one default surface.
    ///
    /// Any previous world is discarded and all handles go stale.
    ///
    /// # Arguments
    ///
    /// * `width` - Tiles per row, 1..=256
    /// * `height` - Rows, 1..=256
    /// * `capacity` - Arena slots, at least one per tile
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDimensions`] or
    /// [`StoreError::CapacityExceeded`]; the store is unchanged on error.
    pub fn init(&mut self, width: u32, height: u32, capacity: usize) -> StoreResult<()> {
        if width == 0 || height == 0 || width > MAX_MAP_SIZE || height > MAX_MAP_SIZE {
            tracing::warn!(width, height, "rejected map dimensions");
            return Err(StoreError::InvalidDimensions { width, height });
        }
        let tiles = width as usize * height as usize;
        if capacity < tiles || u32::try_from(capacity).is_err() {
            tracing::warn!(capacity, tiles, "arena too small for map");
            return Err(StoreError::CapacityExceeded { capacity });
        }

        if self.arena.capacity() == capacity {
            self.arena.reset();
        } else {
            self.arena = ElementArena::new(capacity);
        }

        let mut surface = TileElement::surface(
            self.config.surface_height,
            self.config.surface_terrain,
            self.config.surface_edge,
        );
        surface.set_grass_length(1);
        surface.set_last_for_tile(true);
        for _ in 0..tiles {
            if self.arena.push(surface).is_none() {
                return Err(StoreError::CapacityExceeded { capacity });
            }
        }

        let (index, _) = TileIndex::build(width, height, self.arena.as_slice())?;
        self.index = index;
        self.compactor.restart();
        self.initialized = true;
        self.bump_epoch();

        tracing::debug!(width, height, capacity, "world store initialized");
        Ok(())
    }

    /// Releases every element and marks the store uninitialized.
    pub fn teardown(&mut self) {
        self.arena.reset();
        self.index.clear();
        self.compactor.restart();
        self.initialized = false;
        self.bump_epoch();
        tracing::debug!("world store torn down");
    }

    /// Returns true after a successful `init` or load.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Tiles per row.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.index.width()
    }

    /// Rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.index.height()
    }

    /// Arena slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Used arena slots, tombstones included.
    #[inline]
    #[must_use]
    pub const fn used_slots(&self) -> usize {
        self.arena.next_free()
    }

    /// Live elements across the map.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.arena.as_slice().iter().filter(|e| !e.is_tombstone()).count()
    }

    /// Current epoch.
    #[inline]
    #[must_use]
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Ticks run since creation.
    #[inline]
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read-only view of the arena.
    #[inline]
    #[must_use]
    pub const fn arena(&self) -> &ElementArena {
        &self.arena
    }

    /// Read-only view of the tile index.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> &TileIndex {
        &self.index
    }

    /// Compactor state.
    #[inline]
    #[must_use]
    pub const fn compactor(&self) -> &Compactor {
        &self.compactor
    }

    /// Invalidates every outstanding handle.
    pub fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn ensure_initialized(&self) -> StoreResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StoreError::NotInitialized)
        }
    }

    /// Handle for an arena position in the current epoch.
    pub(crate) fn handle_at(&self, position: usize) -> Option<ElementHandle> {
        if position >= self.arena.next_free() {
            return None;
        }
        let position = u32::try_from(position).ok()?;
        Some(ElementHandle::new(position, self.epoch))
    }

    /// Arena position of a handle from the current epoch.
    fn position_of(&self, handle: ElementHandle) -> StoreResult<usize> {
        self.ensure_initialized()?;
        if handle.is_null() || handle.epoch() != self.epoch {
            return Err(StoreError::StaleHandle);
        }
        let position = handle.position() as usize;
        if position >= self.arena.next_free() {
            return Err(StoreError::StaleHandle);
        }
        Ok(position)
    }

    /// The element behind a handle, `None` if stale or removed.
    #[must_use]
    pub fn resolve(&self, handle: ElementHandle) -> Option<&TileElement> {
        let position = self.position_of(handle).ok()?;
        self.arena.get(position).filter(|e| !e.is_tombstone())
    }

    /// The element behind a handle, mutably.
    ///
    /// The terminal flag belongs to the store; changes to it are undone.
    /// Use [`remove`](Self::remove) rather than writing a tombstone height.
    pub fn resolve_mut(&mut self, handle: ElementHandle) -> Option<ElementMut<'_>> {
        let position = self.position_of(handle).ok()?;
        let element = self.arena.get_mut(position).filter(|e| !e.is_tombstone())?;
        Some(ElementMut::new(element))
    }

    /// Tile owning the element behind a handle.
    #[must_use]
    pub fn tile_of(&self, handle: ElementHandle) -> Option<TileCoord> {
        let position = self.position_of(handle).ok()?;
        let slot = self.index.tile_at(position)?;
        Some(self.index.coord_of(slot))
    }

    /// Head of tile (x, y) as a handle.
    ///
    /// The head may be a tombstone; prefer [`first_element_at`](Self::first_element_at).
    #[must_use]
    pub fn lookup(&self, x: u32, y: u32) -> Option<ElementHandle> {
        let head = self.index.lookup(x, y)?;
        self.handle_at(head)
    }

    /// First live element of tile (x, y).
    #[must_use]
    pub fn first_element_at(&self, x: u32, y: u32) -> Option<ElementHandle> {
        let head = self.index.lookup(x, y)?;
        let elements = self.arena.as_slice();
        let mut position = head;
        loop {
            let element = elements.get(position)?;
            if !element.is_tombstone() {
                return self.handle_at(position);
            }
            if element.is_last_for_tile() {
                return None;
            }
            position += 1;
        }
    }

    /// Live elements of tile (x, y), bottom up.
    ///
    /// Off-grid tiles yield nothing.
    #[must_use]
    pub fn tile_elements(&self, x: u32, y: u32) -> TileElements<'_> {
        TileElements::new(self.arena.as_slice(), self.index.lookup(x, y))
    }

    /// Every live element of the map with its tile.
    #[must_use]
    pub fn elements(&self) -> Elements<'_> {
        Elements::new(self, TileRect::full(self.width(), self.height()))
    }

    /// Every live element inside `region`, clamped to the map.
    #[must_use]
    pub fn elements_in(&self, region: TileRect) -> Elements<'_> {
        match region.clamp_to(self.width(), self.height()) {
            Some(region) => Elements::new(self, region),
            None => {
                let mut elements = Elements::new(self, TileRect::full(1, 1));
                elements.finish();
                elements
            }
        }
    }

    /// Ends a tick: one bounded compaction step, then the epoch advances.
    pub fn tick(&mut self) -> CompactionReport {
        let report = if self.initialized {
            self.compactor.step(&mut self.arena, &mut self.index)
        } else {
            CompactionReport::default()
        };
        self.ticks += 1;
        self.bump_epoch();
        if report.relocated() {
            tracing::trace!(
                moved = report.moved,
                reclaimed = report.reclaimed,
                cursor = self.compactor.cursor(),
                "compaction step"
            );
        }
        report
    }

    /// One bounded compaction step outside of the tick.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before `init`.
    pub fn compact_step(&mut self) -> StoreResult<CompactionReport> {
        self.ensure_initialized()?;
        let report = self.compactor.step(&mut self.arena, &mut self.index);
        if report.relocated() {
            self.bump_epoch();
        }
        Ok(report)
    }

    /// Compacts the whole arena in one go.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before `init`.
    pub fn compact_all(&mut self) -> StoreResult<CompactionReport> {
        self.ensure_initialized()?;
        let report = self.compactor.run_full_sweep(&mut self.arena, &mut self.index);
        if report.relocated() {
            self.bump_epoch();
        }
        tracing::debug!(
            moved = report.moved,
            reclaimed = report.reclaimed,
            used = self.arena.next_free(),
            "full compaction"
        );
        Ok(report)
    }

    /// Walks every tile and checks the run invariants against the index.
    ///
    /// Between runs only tombstones without the terminal flag may appear
    /// (left behind while the compactor has a gap open).
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if !self.initialized {
            return true;
        }
        let elements = self.arena.as_slice();
        let orphan = |e: &TileElement| e.is_tombstone() && !e.is_last_for_tile();

        let mut position = 0usize;
        for slot in 0..self.index.tile_count() {
            let coord = self.index.coord_of(slot);
            let Some(head) = self.index.head(slot) else {
                tracing::warn!(x = coord.x, y = coord.y, "tile has no head");
                return false;
            };
            if head < position || !elements.get(position..head).is_some_and(|gap| gap.iter().all(orphan)) {
                tracing::warn!(x = coord.x, y = coord.y, head, position, "tile head out of order");
                return false;
            }

            let mut live = 0usize;
            position = head;
            loop {
                let Some(element) = elements.get(position) else {
                    tracing::warn!(x = coord.x, y = coord.y, "tile run has no terminal");
                    return false;
                };
                position += 1;
                live += usize::from(!element.is_tombstone());
                if element.is_last_for_tile() {
                    break;
                }
            }
            if live == 0 {
                tracing::warn!(x = coord.x, y = coord.y, "tile has no live elements");
                return false;
            }
        }

        elements[position..].iter().all(orphan)
    }
}

impl Default for WorldStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable access to one live element.
///
/// Restores the element's terminal flag and rejects the tombstone height on
/// drop, so edits cannot break the tile's run.
pub struct ElementMut<'a> {
    element: &'a mut TileElement,
    terminal: bool,
}

impl<'a> ElementMut<'a> {
    fn new(element: &'a mut TileElement) -> Self {
        let terminal = element.is_last_for_tile();
        Self { element, terminal }
    }
}

impl std::ops::Deref for ElementMut<'_> {
    type Target = TileElement;

    fn deref(&self) -> &TileElement {
        self.element
    }
}

impl std::ops::DerefMut for ElementMut<'_> {
    fn deref_mut(&mut self) -> &mut TileElement {
        self.element
    }
}

impl Drop for ElementMut<'_> {
    fn drop(&mut self) {
        self.element.flags.set(ElementFlags::LAST_FOR_TILE, self.terminal);
        if self.element.is_tombstone() {
            tracing::error!("tombstone height written through a handle; use remove()");
            self.element.base_height = crate::element::TOMBSTONE_HEIGHT - 1;
        }
    }
}
