//! # Removal
//!
//! Removal writes the tombstone height and nothing else: no memory moves, the
//! terminal flag stays where it is and the index is untouched. The compactor
//! reclaims the slot later.

use super::WorldStore;
use crate::element::TOMBSTONE_HEIGHT;
use crate::error::{StoreError, StoreResult};
use crate::iter::TileElements;
use crate::memory::ElementHandle;

impl WorldStore {
    /// Removes the element behind `handle`.
    ///
    /// Other handles from the same epoch stay valid.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotInitialized`] before `init`
    /// - [`StoreError::StaleHandle`] for a handle from an older epoch
    /// - [`StoreError::AlreadyRemoved`] if the slot is already a tombstone
    /// - [`StoreError::LastElementInTile`] if no other live element would
    ///   remain on the tile
    pub fn remove(&mut self, handle: ElementHandle) -> StoreResult<()> {
        let position = self.position_of(handle)?;
        if self.arena.as_slice()[position].is_tombstone() {
            return Err(StoreError::AlreadyRemoved);
        }

        let slot = self.index.tile_at(position).ok_or(StoreError::StaleHandle)?;
        let head = self.index.head(slot);
        let live = TileElements::new(self.arena.as_slice(), head).take(2).count();
        if live < 2 {
            let coord = self.index.coord_of(slot);
            tracing::warn!(x = coord.x, y = coord.y, "refusing to empty tile");
            return Err(StoreError::LastElementInTile { x: coord.x, y: coord.y });
        }

        self.arena.as_mut_slice()[position].base_height = TOMBSTONE_HEIGHT;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementFlags, ElementKind};

    fn store() -> WorldStore {
        let mut store = WorldStore::new();
        store.init(3, 3, 64).unwrap();
        store
    }

    #[test]
    fn test_removed_element_is_invisible() {
        let mut store = store();
        store.insert(1, 1, 30, ElementFlags::NONE).unwrap();
        let handle = store.insert(1, 1, 20, ElementFlags::NONE).unwrap();
        let used = store.used_slots();
        let heads = store.index().heads().to_vec();

        store.remove(handle).unwrap();
        let heights: Vec<u8> = store.tile_elements(1, 1).map(|e| e.base_height).collect();
        assert_eq!(heights, vec![14, 30]);
        assert_eq!(store.elements().count(), 10);
        assert_eq!(store.used_slots(), used);
        assert_eq!(store.index().heads(), heads.as_slice());
        assert!(store.resolve(handle).is_none());
        assert!(store.is_consistent());
    }

    #[test]
    fn test_remove_terminal_keeps_flag_on_tombstone() {
        let mut store = store();
        let top = store.insert(2, 0, 40, ElementFlags::NONE).unwrap();
        store.remove(top).unwrap();

        assert_eq!(store.tile_elements(2, 0).count(), 1);
        let position = top.position() as usize;
        assert!(store.arena().as_slice()[position].is_last_for_tile());
        assert!(store.is_consistent());
    }

    #[test]
    fn test_remove_twice() {
        let mut store = store();
        let handle = store.insert(0, 2, 40, ElementFlags::NONE).unwrap();
        store.remove(handle).unwrap();
        assert_eq!(store.remove(handle), Err(StoreError::AlreadyRemoved));
    }

    #[test]
    fn test_last_live_element_stays() {
        let mut store = store();
        let handle = store.first_element_at(2, 2).unwrap();
        assert_eq!(store.remove(handle), Err(StoreError::LastElementInTile { x: 2, y: 2 }));
        assert_eq!(store.resolve(handle).unwrap().kind(), ElementKind::Surface);
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut store = store();
        let handle = store.insert(0, 0, 40, ElementFlags::NONE).unwrap();
        store.insert(0, 0, 50, ElementFlags::NONE).unwrap();
        assert_eq!(store.remove(handle), Err(StoreError::StaleHandle));
        assert_eq!(store.remove(ElementHandle::NULL), Err(StoreError::StaleHandle));
    }
}
