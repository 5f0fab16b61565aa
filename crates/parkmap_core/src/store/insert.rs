//! # Insertion Engine
//!
//! New elements go into the tile's run at their height-sorted place.
//!
//! ## Placement
//!
//! The run is scanned from the tile's head. The new element goes before the
//! first live element that sits higher, or after the terminal element when
//! nothing does. If tombstones of the same run sit right at that spot, the
//! first of them is overwritten in place. Otherwise everything from the
//! insertion point to the end of the arena moves up one slot and every later
//! tile's head is bumped.

use super::WorldStore;
use crate::element::{ElementFlags, ElementKind, TileElement, TOMBSTONE_HEIGHT};
use crate::error::{StoreError, StoreResult};
use crate::memory::ElementHandle;

/// Where a new element lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    /// Overwrite a tombstone of the run.
    Reuse(usize),
    /// Shift this position and everything after it up one slot.
    Before(usize),
    /// Shift in right after the run's terminal element at this position.
    AfterTerminal(usize),
}

impl WorldStore {
    /// Inserts a fresh element into tile (x, y).
    ///
    /// The element has a zeroed payload, kind bits of zero (surface),
    /// `clearance_height == base_height` and the caller's flags. The terminal
    /// flag is managed by the store and ignored in `flags`.
    ///
    /// # Returns
    ///
    /// A handle valid until the next relocation or tick.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotInitialized`] before `init`
    /// - [`StoreError::OutOfBounds`] for an off-grid tile
    /// - [`StoreError::InvalidHeight`] for the tombstone height
    /// - [`StoreError::CapacityExceeded`] when a shift is needed and the arena is full
    pub fn insert(&mut self, x: u32, y: u32, base_height: u8, flags: ElementFlags) -> StoreResult<ElementHandle> {
        let mut element = TileElement::new(ElementKind::Surface, base_height, base_height);
        element.flags = flags;
        self.insert_element(x, y, element)
    }

    /// Inserts a fully built element into tile (x, y).
    ///
    /// Placement follows `element.base_height`; the terminal flag of
    /// `element` is ignored.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn insert_element(&mut self, x: u32, y: u32, mut element: TileElement) -> StoreResult<ElementHandle> {
        self.ensure_initialized()?;
        if element.base_height == TOMBSTONE_HEIGHT {
            return Err(StoreError::InvalidHeight(element.base_height));
        }
        let Some(slot) = self.index.slot(x, y) else {
            tracing::warn!(x, y, "insert outside of map");
            return Err(StoreError::OutOfBounds { x, y });
        };
        let head = self.index.head(slot).ok_or(StoreError::NotInitialized)?;
        element.set_last_for_tile(false);

        let position = match self.plan(head, element.base_height) {
            Placement::Reuse(position) => {
                let terminal = self.arena.as_slice()[position].is_last_for_tile();
                element.set_last_for_tile(terminal);
                self.arena.write_slot(position, element);
                position
            }
            Placement::Before(position) => {
                self.shift_in(slot, position, element)?;
                position
            }
            Placement::AfterTerminal(terminal) => {
                element.set_last_for_tile(true);
                self.shift_in(slot, terminal + 1, element)?;
                self.arena.as_mut_slice()[terminal].set_last_for_tile(false);
                terminal + 1
            }
        };

        self.bump_epoch();
        self.handle_at(position).ok_or(StoreError::StaleHandle)
    }

    /// Scans the run starting at `head` for the slot of an element at `height`.
    fn plan(&self, head: usize, height: u8) -> Placement {
        let elements = self.arena.as_slice();
        let mut tombstones: Option<usize> = None;
        let mut position = head;

        loop {
            let element = &elements[position];
            if element.is_tombstone() {
                tombstones.get_or_insert(position);
            } else if element.base_height > height {
                return tombstones.map_or(Placement::Before(position), Placement::Reuse);
            } else {
                tombstones = None;
            }

            if element.is_last_for_tile() {
                return tombstones.map_or(Placement::AfterTerminal(position), Placement::Reuse);
            }
            position += 1;
        }
    }

    /// Opens a slot at `position` and patches the heads of later tiles.
    fn shift_in(&mut self, slot: usize, position: usize, element: TileElement) -> StoreResult<()> {
        if !self.arena.insert_shifted(position, element) {
            let capacity = self.arena.capacity();
            tracing::warn!(capacity, "element arena full");
            return Err(StoreError::CapacityExceeded { capacity });
        }
        self.index.shift_after(slot);
        Ok(())
    }
}
