//! # Store Error Types
//!
//! All errors that can occur in the tile element store.
//!
//! None of these cross the tick boundary: a failed mutation simply does not
//! happen and the caller decides what to tell the player.

use thiserror::Error;

/// Errors that can occur while mutating or loading the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store has not been initialized (or was torn down).
    #[error("store not initialized")]
    NotInitialized,

    /// Tile coordinate outside the grid.
    #[error("tile ({x}, {y}) is outside the map")]
    OutOfBounds {
        /// Requested x.
        x: u32,
        /// Requested y.
        y: u32,
    },

    /// Grid dimensions are zero or larger than the index supports.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The arena has no free slot left for a shifting insert.
    #[error("element arena full: capacity {capacity}")]
    CapacityExceeded {
        /// Arena capacity in elements.
        capacity: usize,
    },

    /// The requested base height collides with the tombstone sentinel.
    #[error("invalid base height {0}")]
    InvalidHeight(u8),

    /// Handle was issued before elements moved or before the last tick.
    #[error("stale element handle")]
    StaleHandle,

    /// Element is already a tombstone.
    #[error("element already removed")]
    AlreadyRemoved,

    /// Removing the element would leave the tile without live elements.
    #[error("cannot remove the last element of tile ({x}, {y})")]
    LastElementInTile {
        /// Tile x.
        x: u32,
        /// Tile y.
        y: u32,
    },

    /// Bulk load rejected.
    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Malformed bulk-load buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Buffer ended before the tile's terminal flag.
    #[error("tile ({x}, {y}) has no terminal element")]
    MissingTerminal {
        /// Tile x.
        x: u32,
        /// Tile y.
        y: u32,
    },

    /// Tile run contains tombstones only.
    #[error("tile ({x}, {y}) has no live elements")]
    EmptyTile {
        /// Tile x.
        x: u32,
        /// Tile y.
        y: u32,
    },

    /// Byte buffer is not a whole number of element records.
    #[error("buffer of {len} bytes is not a whole number of elements")]
    MisalignedBuffer {
        /// Buffer length in bytes.
        len: usize,
    },

    /// More elements than the arena can hold.
    #[error("buffer of {len} elements exceeds capacity {capacity}")]
    BufferTooLarge {
        /// Element count in the buffer.
        len: usize,
        /// Arena capacity.
        capacity: usize,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
