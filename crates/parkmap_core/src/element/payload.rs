//! Payload accessors for the non-surface kinds.
//!
//! Accessors do not check the kind; callers match on [`TileElement::kind`] first.

use super::{ElementFlags, TileElement};
use crate::coords::Direction;

/// Entrance type of a ride entrance.
pub const ENTRANCE_TYPE_RIDE_ENTRANCE: u8 = 0;
/// Entrance type of a ride exit.
pub const ENTRANCE_TYPE_RIDE_EXIT: u8 = 1;
/// Entrance type of a park entrance.
pub const ENTRANCE_TYPE_PARK_ENTRANCE: u8 = 2;

const PATH_QUEUE_BIT: u8 = 0x01;
const PATH_RIDE_LINK_BIT: u8 = 0x08;
const PATH_SLOPED_BIT: u8 = 0x04;
const STATION_MASK: u8 = 0x70;
const STATION_SHIFT: u8 = 4;

impl TileElement {
    // -------------------------------------------------------------------------
    // Path
    // -------------------------------------------------------------------------

    /// Returns true if this path is a ride queue.
    #[inline]
    #[must_use]
    pub const fn is_queue(&self) -> bool {
        self.tag & PATH_QUEUE_BIT != 0
    }

    /// Marks or unmarks the path as a queue.
    #[inline]
    pub fn set_queue(&mut self, queue: bool) {
        if queue {
            self.tag |= PATH_QUEUE_BIT;
        } else {
            self.tag &= !PATH_QUEUE_BIT;
        }
    }

    /// Path surface/style byte.
    #[inline]
    #[must_use]
    pub const fn path_type(&self) -> u8 {
        self.properties[0]
    }

    /// Sets the path surface/style byte.
    #[inline]
    pub fn set_path_type(&mut self, path_type: u8) {
        self.properties[0] = path_type;
    }

    /// Returns true if the path climbs one height step across the tile.
    #[inline]
    #[must_use]
    pub const fn is_sloped_path(&self) -> bool {
        self.properties[0] & PATH_SLOPED_BIT != 0
    }

    /// Direction a sloped path rises towards.
    #[inline]
    #[must_use]
    pub const fn path_slope_direction(&self) -> Direction {
        Direction::from_bits(self.properties[0])
    }

    /// Returns true if a queue is linked to a ride.
    #[inline]
    #[must_use]
    pub const fn has_ride_link(&self) -> bool {
        self.properties[0] & PATH_RIDE_LINK_BIT != 0
    }

    /// Detaches a queue from its ride.
    #[inline]
    pub fn clear_ride_link(&mut self) {
        self.properties[0] &= !PATH_RIDE_LINK_BIT;
        self.properties[3] = 0xFF;
    }

    /// Path addition (lamp, bench, bin...) id.
    #[inline]
    #[must_use]
    pub const fn path_additions(&self) -> u8 {
        self.properties[1]
    }

    /// Connected edge/corner bits.
    #[inline]
    #[must_use]
    pub const fn path_edges(&self) -> u8 {
        self.properties[2]
    }

    /// Sets the connected edge/corner bits.
    #[inline]
    pub fn set_path_edges(&mut self, edges: u8) {
        self.properties[2] = edges;
    }

    /// Addition status (also the linked ride for queues), 255 when unset.
    #[inline]
    #[must_use]
    pub const fn addition_status(&self) -> u8 {
        self.properties[3]
    }

    // -------------------------------------------------------------------------
    // Track
    // -------------------------------------------------------------------------

    /// Track piece type.
    #[inline]
    #[must_use]
    pub const fn track_type(&self) -> u8 {
        self.properties[0]
    }

    /// Sets the track piece type.
    #[inline]
    pub fn set_track_type(&mut self, track_type: u8) {
        self.properties[0] = track_type;
    }

    /// Raw sequence byte of a multi-tile piece.
    #[inline]
    #[must_use]
    pub const fn track_sequence(&self) -> u8 {
        self.properties[1]
    }

    /// Station index encoded in the sequence byte.
    #[inline]
    #[must_use]
    pub const fn station_index(&self) -> u8 {
        (self.properties[1] & STATION_MASK) >> STATION_SHIFT
    }

    /// Sets the station index, keeping the other sequence bits.
    #[inline]
    pub fn set_station_index(&mut self, station: u8) {
        self.properties[1] = (self.properties[1] & !STATION_MASK) | ((station << STATION_SHIFT) & STATION_MASK);
    }

    /// Ride the track belongs to.
    #[inline]
    #[must_use]
    pub const fn ride_index(&self) -> u8 {
        self.properties[3]
    }

    /// Sets the owning ride (track and entrances).
    #[inline]
    pub fn set_ride_index(&mut self, ride: u8) {
        self.properties[3] = ride;
    }

    /// Returns true if scenario rules forbid demolishing this track.
    #[inline]
    #[must_use]
    pub const fn is_indestructible(&self) -> bool {
        self.flags.contains(ElementFlags::INDESTRUCTIBLE_TRACK)
    }

    // -------------------------------------------------------------------------
    // Scenery (small and large)
    // -------------------------------------------------------------------------

    /// Scenery object id.
    #[inline]
    #[must_use]
    pub const fn scenery_type(&self) -> u8 {
        self.properties[0]
    }

    /// Sets the scenery object id.
    #[inline]
    pub fn set_scenery_type(&mut self, scenery: u8) {
        self.properties[0] = scenery;
    }

    /// Primary colour.
    #[inline]
    #[must_use]
    pub const fn colour_1(&self) -> u8 {
        self.properties[2]
    }

    /// Secondary colour.
    #[inline]
    #[must_use]
    pub const fn colour_2(&self) -> u8 {
        self.properties[3]
    }

    /// Sets both colours.
    #[inline]
    pub fn set_colours(&mut self, colour_1: u8, colour_2: u8) {
        self.properties[2] = colour_1;
        self.properties[3] = colour_2;
    }

    /// Segment index of a large scenery tile.
    #[inline]
    #[must_use]
    pub const fn large_scenery_sequence(&self) -> u8 {
        self.properties[1]
    }

    // -------------------------------------------------------------------------
    // Entrance
    // -------------------------------------------------------------------------

    /// Entrance type (see `ENTRANCE_TYPE_*`).
    #[inline]
    #[must_use]
    pub const fn entrance_type(&self) -> u8 {
        self.properties[0]
    }

    /// Sets the entrance type.
    #[inline]
    pub fn set_entrance_type(&mut self, entrance_type: u8) {
        self.properties[0] = entrance_type;
    }

    /// Entrance index; the low nibble is the tile within a park entrance.
    #[inline]
    #[must_use]
    pub const fn entrance_index(&self) -> u8 {
        self.properties[1]
    }

    /// Sets the entrance index.
    #[inline]
    pub fn set_entrance_index(&mut self, index: u8) {
        self.properties[1] = index;
    }

    /// Path style drawn under a park entrance.
    #[inline]
    #[must_use]
    pub const fn entrance_path_type(&self) -> u8 {
        self.properties[2]
    }

    /// Sets the path style drawn under a park entrance.
    #[inline]
    pub fn set_entrance_path_type(&mut self, path_type: u8) {
        self.properties[2] = path_type;
    }

    // -------------------------------------------------------------------------
    // Fence
    // -------------------------------------------------------------------------

    /// Fence object id.
    #[inline]
    #[must_use]
    pub const fn fence_type(&self) -> u8 {
        self.properties[0]
    }

    /// Sets the fence object id.
    #[inline]
    pub fn set_fence_type(&mut self, fence: u8) {
        self.properties[0] = fence;
    }

    /// Banner slot attached to a fence.
    #[inline]
    #[must_use]
    pub const fn fence_banner(&self) -> u8 {
        self.properties[1]
    }

    // -------------------------------------------------------------------------
    // Banner
    // -------------------------------------------------------------------------

    /// Banner slot index.
    #[inline]
    #[must_use]
    pub const fn banner_index(&self) -> u8 {
        self.properties[0]
    }

    /// Sets the banner slot index.
    #[inline]
    pub fn set_banner_index(&mut self, index: u8) {
        self.properties[0] = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    #[test]
    fn test_station_index_keeps_sequence() {
        let mut track = TileElement::new(ElementKind::Track, 10, 12);
        track.properties[1] = 0x0F;
        track.set_station_index(5);
        assert_eq!(track.station_index(), 5);
        assert_eq!(track.track_sequence() & 0x0F, 0x0F);
    }

    #[test]
    fn test_clear_ride_link() {
        let mut path = TileElement::new(ElementKind::Path, 8, 10);
        path.set_queue(true);
        path.set_path_type(0x09);
        path.properties[3] = 4;

        path.clear_ride_link();
        assert!(!path.has_ride_link());
        assert_eq!(path.path_type(), 0x01);
        assert_eq!(path.addition_status(), 0xFF);
        assert!(path.is_queue());
    }

    #[test]
    fn test_sloped_path_direction() {
        let mut path = TileElement::new(ElementKind::Path, 8, 10);
        path.set_path_type(0x16);
        assert!(path.is_sloped_path());
        assert_eq!(path.path_slope_direction(), Direction::East);

        path.set_path_type(0x12);
        assert!(!path.is_sloped_path());
    }
}
