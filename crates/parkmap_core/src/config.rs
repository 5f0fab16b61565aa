//! # Store Configuration
//!
//! Map size, arena size and compaction budget, loadable from TOML.
//!
//! ```toml
//! width = 128
//! height = 128
//! capacity = 65536
//! compaction_budget = 512
//! ```

use serde::Deserialize;

use crate::element::surface::{terrain, terrain_edge, DEFAULT_SURFACE_HEIGHT};
use crate::error::{StoreError, StoreResult};
use crate::index::MAX_MAP_SIZE;

/// Configuration for a [`WorldStore`](crate::store::WorldStore).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Tiles per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Arena slots.
    pub capacity: usize,
    /// Arena positions the compactor may examine per tick.
    pub compaction_budget: usize,
    /// Base height of the surface placed on every tile by `init`.
    pub surface_height: u8,
    /// Terrain id of the initial surface.
    pub surface_terrain: u8,
    /// Edge style id of the initial surface.
    pub surface_edge: u8,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            width: MAX_MAP_SIZE,
            height: MAX_MAP_SIZE,
            // 3 elements per tile on a full map
            capacity: 196_608,
            compaction_budget: 1024,
            surface_height: DEFAULT_SURFACE_HEIGHT,
            surface_terrain: terrain::GRASS,
            surface_edge: terrain_edge::ROCK,
        }
    }
}

impl StoreConfig {
    /// Small map for tests and tooling.
    #[must_use]
    pub fn small(width: u32, height: u32) -> Self {
        let tiles = width as usize * height as usize;
        Self {
            width,
            height,
            capacity: tiles * 4,
            compaction_budget: 64,
            ..Self::default()
        }
    }

    /// Parses a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] on a syntax error, an unknown key
    /// or values that fail [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> StoreResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| StoreError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks ranges.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> StoreResult<()> {
        if self.width == 0 || self.height == 0 || self.width > MAX_MAP_SIZE || self.height > MAX_MAP_SIZE {
            return Err(StoreError::InvalidConfig(format!(
                "map size {}x{} outside 1..={MAX_MAP_SIZE}",
                self.width, self.height
            )));
        }
        let tiles = self.width as usize * self.height as usize;
        if self.capacity < tiles || u32::try_from(self.capacity).is_err() {
            return Err(StoreError::InvalidConfig(format!(
                "capacity {} cannot hold {tiles} tiles",
                self.capacity
            )));
        }
        if self.compaction_budget == 0 {
            return Err(StoreError::InvalidConfig("compaction_budget must be non-zero".into()));
        }
        if self.surface_height == crate::element::TOMBSTONE_HEIGHT {
            return Err(StoreError::InvalidConfig("surface_height 255 is reserved".into()));
        }
        if self.surface_terrain > 0x0F || self.surface_edge > 0x0F {
            return Err(StoreError::InvalidConfig("surface styles are 4-bit ids".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full_map() {
        let config = StoreConfig::default();
        assert_eq!((config.width, config.height), (256, 256));
        assert_eq!(config.capacity, 196_608);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StoreConfig::from_toml_str("width = 64\nheight = 32\ncapacity = 4096\n").unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.height, 32);
        assert_eq!(config.compaction_budget, 1024);
        assert_eq!(config.surface_height, 14);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            StoreConfig::from_toml_str("width = 0"),
            Err(StoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            StoreConfig::from_toml_str("width = 4\nheight = 4\ncapacity = 15"),
            Err(StoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            StoreConfig::from_toml_str("budget = 3"),
            Err(StoreError::InvalidConfig(_))
        ));
    }
}
