//! # Bulk Load
//!
//! Replaces the whole world with a decoded element buffer and hands the used
//! region back for saving.
//!
//! The buffer is validated into a fresh tile index before the store is
//! touched, so a rejected load leaves the previous world in place.

use super::WorldStore;
use crate::element::TileElement;
use crate::error::{LoadError, StoreResult};
use crate::index::TileIndex;

impl WorldStore {
    /// Loads `elements` using the current map size and arena capacity.
    ///
    /// Elements after the last tile's run are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Load`](crate::error::StoreError::Load) if the
    /// buffer does not fit or a tile run is malformed.
    pub fn load_elements(&mut self, elements: &[TileElement]) -> StoreResult<()> {
        let capacity = self.arena.capacity();
        if elements.len() > capacity {
            tracing::warn!(len = elements.len(), capacity, "load buffer too large");
            return Err(LoadError::BufferTooLarge {
                len: elements.len(),
                capacity,
            }
            .into());
        }

        let (index, used) = TileIndex::build(self.width(), self.height(), elements).map_err(|e| {
            tracing::warn!(error = %e, "load rejected");
            e
        })?;

        self.arena.load(&elements[..used]);
        self.index = index;
        self.compactor.restart();
        self.initialized = true;
        self.bump_epoch();

        tracing::debug!(used, ignored = elements.len() - used, "world loaded");
        Ok(())
    }

    /// Loads raw 8-byte element records.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MisalignedBuffer`] if `bytes` is not a whole
    /// number of records, otherwise as [`load_elements`](Self::load_elements).
    pub fn load_bytes(&mut self, bytes: &[u8]) -> StoreResult<()> {
        let elements: &[TileElement] =
            bytemuck::try_cast_slice(bytes).map_err(|_| LoadError::MisalignedBuffer { len: bytes.len() })?;
        self.load_elements(elements)
    }

    /// Sizes the map, then loads `elements` into it.
    ///
    /// # Errors
    ///
    /// As [`init`](Self::init) and [`load_elements`](Self::load_elements).
    /// On a load error the store keeps the freshly initialized map.
    pub fn load_map(&mut self, width: u32, height: u32, capacity: usize, elements: &[TileElement]) -> StoreResult<()> {
        self.init(width, height, capacity)?;
        self.load_elements(elements)
    }

    /// The used region as raw records, ready to be saved.
    #[must_use]
    pub fn export_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.arena.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementFlags, ElementKind};
    use crate::error::StoreError;

    fn surface(last: bool) -> TileElement {
        let mut element = TileElement::surface(14, 0, 0);
        element.set_last_for_tile(last);
        element
    }

    fn store() -> WorldStore {
        let mut store = WorldStore::new();
        store.init(2, 1, 16).unwrap();
        store
    }

    #[test]
    fn test_load_replaces_world() {
        let mut store = store();
        let mut fence = TileElement::new(ElementKind::Fence, 20, 24);
        fence.set_last_for_tile(true);
        let elements = [surface(false), fence, surface(true), surface(true)];

        store.load_elements(&elements).unwrap();
        assert_eq!(store.used_slots(), 3);
        assert_eq!(store.tile_elements(0, 0).count(), 2);
        assert_eq!(store.tile_elements(1, 0).count(), 1);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_failed_load_keeps_world() {
        let mut store = store();
        store.insert(1, 0, 30, ElementFlags::NONE).unwrap();
        let before = store.export_bytes().to_vec();

        let result = store.load_elements(&[surface(true), surface(false)]);
        assert_eq!(result, Err(StoreError::Load(LoadError::MissingTerminal { x: 1, y: 0 })));
        assert_eq!(store.export_bytes(), before.as_slice());
        assert!(store.is_consistent());
    }

    #[test]
    fn test_load_bytes_misaligned() {
        let mut store = store();
        assert_eq!(
            store.load_bytes(&[0u8; 12]),
            Err(StoreError::Load(LoadError::MisalignedBuffer { len: 12 }))
        );
    }

    #[test]
    fn test_export_then_load_bytes() {
        let mut store = store();
        store.insert(0, 0, 40, ElementFlags::NONE).unwrap();
        let saved = store.export_bytes().to_vec();
        assert_eq!(saved.len(), 3 * 8);

        let mut other = WorldStore::new();
        other.init(2, 1, 16).unwrap();
        other.load_bytes(&saved).unwrap();
        assert_eq!(other.tile_elements(0, 0).count(), 2);
    }

    #[test]
    fn test_load_too_large() {
        let mut store = store();
        let elements = vec![surface(true); 17];
        assert_eq!(
            store.load_elements(&elements),
            Err(StoreError::Load(LoadError::BufferTooLarge { len: 17, capacity: 16 }))
        );
    }
}
