//! # Element Arena
//!
//! One contiguous array of element records plus a bump cursor.

use std::ops::Range;

use crate::element::TileElement;

/// The contiguous backing store for every element of every tile.
///
/// Slots below `next_free` hold tile runs (live elements and tombstones);
/// slots at or above it are free and always hold [`TileElement::TOMBSTONE`].
/// The arena knows nothing about tiles; the tile index and the store keep the
/// run invariants.
///
/// # Example
///
/// ```rust,ignore
/// let mut arena = ElementArena::new(196_608);
///
/// let position = arena.push(TileElement::surface(14, 0, 0)).unwrap();
/// assert!(arena.insert_shifted(position, TileElement::TOMBSTONE));
/// ```
pub struct ElementArena {
    /// The backing storage, sized once.
    storage: Box<[TileElement]>,
    /// One past the last used slot.
    next_free: usize,
    /// Bumped whenever slots change occupancy outside of compaction.
    revision: u64,
}

impl ElementArena {
    /// Creates an arena holding `capacity` element slots.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or does not fit a `u32` position.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            u32::try_from(capacity).is_ok(),
            "Capacity cannot exceed u32::MAX"
        );

        let storage = vec![TileElement::TOMBSTONE; capacity].into_boxed_slice();
        Self {
            storage,
            next_free: 0,
            revision: 0,
        }
    }

    /// Total slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// One past the last used slot.
    #[inline]
    #[must_use]
    pub const fn next_free(&self) -> usize {
        self.next_free
    }

    /// Occupancy revision.
    ///
    /// Changes on every push, shifted insert, slot write, truncate, load and
    /// reset. Compaction slides leave it alone, so the compactor can tell
    /// whether a gap it measured earlier is still intact.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Free slots above `next_free`.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.next_free
    }

    /// Returns true if a shifting insert has room.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.next_free >= self.capacity()
    }

    /// The used region.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[TileElement] {
        &self.storage[..self.next_free]
    }

    /// The used region, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [TileElement] {
        &mut self.storage[..self.next_free]
    }

    /// Element at `position` inside the used region.
    #[inline]
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&TileElement> {
        self.as_slice().get(position)
    }

    /// Mutable element at `position` inside the used region.
    #[inline]
    pub fn get_mut(&mut self, position: usize) -> Option<&mut TileElement> {
        self.as_mut_slice().get_mut(position)
    }

    /// Appends past the used region.
    ///
    /// # Returns
    ///
    /// The new element's position, or None if the arena is full.
    pub fn push(&mut self, element: TileElement) -> Option<usize> {
        let position = self.next_free;
        let slot = self.storage.get_mut(position)?;
        *slot = element;
        self.next_free += 1;
        self.revision += 1;
        Some(position)
    }

    /// Overwrites the slot at `position` inside the used region.
    ///
    /// # Returns
    ///
    /// `false` if `position` is outside the used region.
    pub fn write_slot(&mut self, position: usize, element: TileElement) -> bool {
        let Some(slot) = self.get_mut(position) else {
            return false;
        };
        *slot = element;
        self.revision += 1;
        true
    }

    /// Opens a gap at `position` by moving `position..next_free` up one slot,
    /// then writes `element` into it.
    ///
    /// # Returns
    ///
    /// `false` (and no change) if the arena is full or `position` is past the
    /// used region.
    pub fn insert_shifted(&mut self, position: usize, element: TileElement) -> bool {
        if self.is_full() || position > self.next_free {
            return false;
        }

        self.storage.copy_within(position..self.next_free, position + 1);
        self.storage[position] = element;
        self.next_free += 1;
        self.revision += 1;
        true
    }

    /// Moves the live run `source` down so it starts at `destination`, then
    /// tombstones the slots the run vacated.
    ///
    /// # Panics
    ///
    /// Panics if `destination` is above `source.start` or the run is outside
    /// the used region.
    pub fn slide_down(&mut self, source: Range<usize>, destination: usize) {
        assert!(destination <= source.start, "Slide must move towards zero");
        assert!(source.end <= self.next_free, "Slide source outside used region");

        let len = source.len();
        self.storage.copy_within(source.clone(), destination);
        self.storage[destination + len..source.end].fill(TileElement::TOMBSTONE);
    }

    /// Releases everything from `new_end` up, lowering `next_free`.
    pub fn truncate(&mut self, new_end: usize) {
        if new_end >= self.next_free {
            return;
        }
        self.storage[new_end..self.next_free].fill(TileElement::TOMBSTONE);
        self.next_free = new_end;
        self.revision += 1;
    }

    /// Replaces the whole used region with `elements`.
    ///
    /// # Returns
    ///
    /// `false` (and no change) if `elements` does not fit.
    pub fn load(&mut self, elements: &[TileElement]) -> bool {
        if elements.len() > self.capacity() {
            return false;
        }
        self.reset();
        self.storage[..elements.len()].copy_from_slice(elements);
        self.next_free = elements.len();
        true
    }

    /// Frees every slot.
    ///
    /// Previous positions become invalid and must not be used.
    pub fn reset(&mut self) {
        self.storage[..self.next_free].fill(TileElement::TOMBSTONE);
        self.next_free = 0;
        self.revision += 1;
    }
}
