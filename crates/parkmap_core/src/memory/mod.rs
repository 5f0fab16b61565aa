//! # Memory Management
//!
//! The element arena and the handles that point into it.
//!
//! ## Design Philosophy
//!
//! All element memory is allocated once when the world is initialized.
//! During play:
//! - No heap allocations
//! - Elements move only on shifting inserts and compaction
//! - Positions are handed out wrapped in an epoch-tagged handle

mod arena;
mod handle;

pub use arena::ElementArena;
pub use handle::ElementHandle;
