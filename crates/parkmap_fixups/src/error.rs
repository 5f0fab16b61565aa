//! # Fix-up Error Types

use parkmap_core::StoreError;
use thiserror::Error;

/// Errors that can occur while running a pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixupError {
    /// A store mutation was rejected.
    #[error("store rejected mutation: {0}")]
    Store(#[from] StoreError),

    /// Surface style ids are 4-bit.
    #[error("invalid surface style: terrain {terrain}, edge {edge}")]
    InvalidStyle {
        /// Requested terrain id.
        terrain: u8,
        /// Requested edge id.
        edge: u8,
    },

    /// The requested region does not touch the map.
    #[error("region outside of map")]
    RegionOutsideMap,
}

/// Result type for fix-up passes.
pub type FixupResult<T> = Result<T, FixupError>;
