//! # Element Handles
//!
//! Handles are lightweight identifiers consisting of:
//! - A position in the element arena
//! - The store epoch that was current when the position was handed out

/// Opaque reference to one element.
///
/// The ID is split into two parts:
/// - Lower 32 bits: arena position
/// - Upper 32 bits: store epoch, used to reject handles that outlived a
///   relocation or a tick boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ElementHandle(u64);

impl ElementHandle {
    /// Creates a handle from a position and an epoch.
    #[inline]
    #[must_use]
    pub(crate) const fn new(position: u32, epoch: u32) -> Self {
        Self(((epoch as u64) << 32) | (position as u64))
    }

    /// Arena position the handle was issued for.
    #[inline]
    #[must_use]
    pub const fn position(self) -> u32 {
        self.0 as u32
    }

    /// Epoch the handle was issued in.
    #[inline]
    #[must_use]
    pub const fn epoch(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid handle.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this handle is null.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for ElementHandle {
    fn default() -> Self {
        Self::NULL
    }
}
