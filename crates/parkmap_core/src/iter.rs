//! # Iterator Protocol
//!
//! A stateful cursor that walks every live element of every tile in a region
//! exactly once, row by row.
//!
//! The cursor holds plain positions, not borrows, so a fix-up pass can mutate
//! the store between steps. After removing or inserting inside the tile being
//! visited, call [`TileElementIterator::restart_current_tile`]; the cursor
//! re-reads heads from the tile index at every tile boundary, so later tiles
//! are always entered at their current head.
//!
//! A cursor does not survive a compaction cycle: passes finish within one tick
//! or call [`TileElementIterator::begin`] again.

use crate::coords::{TileCoord, TileRect};
use crate::element::TileElement;
use crate::memory::ElementHandle;
use crate::store::{ElementMut, WorldStore};

/// Restartable cursor over the elements of a tile region.
///
/// # Example
///
/// ```rust,ignore
/// let mut it = TileElementIterator::new(&store);
/// while it.advance(&store) {
///     let handle = it.handle(&store).unwrap();
///     if store.resolve(handle).unwrap().kind() == ElementKind::Track {
///         store.remove(handle)?;
///         it.restart_current_tile();
///     }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct TileElementIterator {
    /// Tiles visited.
    region: TileRect,
    /// Tile being visited.
    x: u32,
    /// Row being visited.
    y: u32,
    /// Current arena position; `None` re-enters the tile from its head.
    position: Option<usize>,
    /// Set once the last element of the region has been passed.
    finished: bool,
}

impl TileElementIterator {
    /// Cursor over the whole map of `store`.
    #[must_use]
    pub fn new(store: &WorldStore) -> Self {
        let region = TileRect::full(store.width().max(1), store.height().max(1));
        Self::over_region(region)
    }

    /// Cursor over an inclusive tile rectangle.
    ///
    /// The rectangle may reach past the map; the walk is clamped to the
    /// store's size, and a rectangle entirely off the map yields nothing.
    #[must_use]
    pub const fn over_region(region: TileRect) -> Self {
        Self {
            region,
            x: region.min.x,
            y: region.min.y,
            position: None,
            finished: false,
        }
    }

    /// Resets to the first tile of the region; the next `advance` enters it.
    pub fn begin(&mut self) {
        self.x = self.region.min.x;
        self.y = self.region.min.y;
        self.position = None;
        self.finished = false;
    }

    /// Makes the next `advance` re-enter the current tile from its head.
    pub fn restart_current_tile(&mut self) {
        self.position = None;
    }

    /// Tile being visited.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    /// Region being visited.
    #[inline]
    #[must_use]
    pub const fn region(&self) -> TileRect {
        self.region
    }

    /// Moves to the next live element.
    ///
    /// # Returns
    ///
    /// `false` once the last element of the region has been passed (and on
    /// every later call until [`begin`](Self::begin)).
    pub fn advance(&mut self, store: &WorldStore) -> bool {
        while self.step(store) {
            if self.element(store).is_some() {
                return true;
            }
        }
        false
    }

    /// One raw step, tombstones included.
    fn step(&mut self, store: &WorldStore) -> bool {
        if self.finished {
            return false;
        }

        let Some(position) = self.position else {
            return self.enter_tile(store);
        };

        let terminal = store
            .arena()
            .get(position)
            .map_or(true, TileElement::is_last_for_tile);
        if !terminal {
            self.position = Some(position + 1);
            return true;
        }

        let x_max = self.region.max.x.min(store.width().saturating_sub(1));
        let y_max = self.region.max.y.min(store.height().saturating_sub(1));

        if self.x < x_max {
            self.x += 1;
            return self.enter_tile(store);
        }

        if self.y < y_max {
            self.x = self.region.min.x;
            self.y += 1;
            return self.enter_tile(store);
        }

        self.finished = true;
        self.position = None;
        false
    }

    fn enter_tile(&mut self, store: &WorldStore) -> bool {
        let on_map = self.x < store.width() && self.y < store.height();
        match on_map.then(|| store.index().lookup(self.x, self.y)).flatten() {
            Some(head) => {
                self.position = Some(head);
                true
            }
            None => {
                self.finished = true;
                self.position = None;
                false
            }
        }
    }

    /// Current element, `None` between tiles or on a tombstone.
    #[must_use]
    pub fn element<'s>(&self, store: &'s WorldStore) -> Option<&'s TileElement> {
        let element = store.arena().get(self.position?)?;
        (!element.is_tombstone()).then_some(element)
    }

    /// Current element, mutably.
    pub fn element_mut<'s>(&self, store: &'s mut WorldStore) -> Option<ElementMut<'s>> {
        let handle = self.handle(store)?;
        store.resolve_mut(handle)
    }

    /// Handle to the current element, valid until the store next relocates
    /// elements or ticks.
    #[must_use]
    pub fn handle(&self, store: &WorldStore) -> Option<ElementHandle> {
        self.element(store)?;
        store.handle_at(self.position?)
    }
}

/// Borrowing iterator over every live element of a region.
///
/// Built on [`TileElementIterator`]; the store cannot be mutated while it is
/// alive. This is the read-only path used by rendering and queries.
pub struct Elements<'s> {
    store: &'s WorldStore,
    cursor: TileElementIterator,
}

impl<'s> Elements<'s> {
    pub(crate) fn new(store: &'s WorldStore, region: TileRect) -> Self {
        Self {
            store,
            cursor: TileElementIterator::over_region(region),
        }
    }

    /// Makes the iterator yield nothing.
    pub(crate) fn finish(&mut self) {
        self.cursor.finished = true;
    }
}

impl<'s> Iterator for Elements<'s> {
    type Item = (TileCoord, &'s TileElement);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.cursor.advance(self.store) {
            return None;
        }
        let element = self.cursor.element(self.store)?;
        Some((self.cursor.coord(), element))
    }
}

/// Borrowing iterator over the live elements of one tile, in arena order.
pub struct TileElements<'s> {
    elements: &'s [TileElement],
    position: Option<usize>,
}

impl<'s> TileElements<'s> {
    pub(crate) fn new(elements: &'s [TileElement], head: Option<usize>) -> Self {
        Self {
            elements,
            position: head,
        }
    }
}

impl<'s> Iterator for TileElements<'s> {
    type Item = &'s TileElement;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let position = self.position?;
            let element = self.elements.get(position)?;
            self.position = if element.is_last_for_tile() {
                None
            } else {
                Some(position + 1)
            };
            if !element.is_tombstone() {
                return Some(element);
            }
        }
    }
}
