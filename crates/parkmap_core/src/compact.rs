//! # Bounded Compactor
//!
//! Reclaims tombstones a little at a time, once per tick.
//!
//! ## Algorithm
//!
//! Walking up from a persisted cursor:
//! 1. Find a run of tombstones (the gap)
//! 2. Slide the live run that follows it down over the gap; the vacated tail
//!    slots become the new gap, which merges with any tombstones after it
//! 3. Patch the head of every tile whose head sat in the moved span
//! 4. When the gap reaches the arena's next free slot, release it and wrap the
//!    cursor to zero (one sweep complete)
//!
//! A tombstone can carry its tile's terminal flag. When such a tombstone is
//! swept, the flag moves to the slot just below the gap, which is the last
//! live element of the same tile.
//!
//! Every step examines at most `budget` positions. A gap that is still open
//! when the budget runs out is remembered together with the arena revision,
//! so the next step resumes it without rescanning as long as nothing else
//! touched the arena in between.

use crate::element::TileElement;
use crate::index::TileIndex;
use crate::memory::ElementArena;

/// Outcome of one compaction step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompactionReport {
    /// Arena positions examined.
    pub scanned: usize,
    /// Live elements moved down.
    pub moved: usize,
    /// Slots released at the end of the arena.
    pub reclaimed: usize,
    /// Tile heads re-pointed.
    pub heads_patched: usize,
    /// True if the cursor wrapped back to zero.
    pub sweep_completed: bool,
}

impl CompactionReport {
    /// Adds another step's counters to this one.
    pub fn merge(&mut self, other: &Self) {
        self.scanned += other.scanned;
        self.moved += other.moved;
        self.reclaimed += other.reclaimed;
        self.heads_patched += other.heads_patched;
        self.sweep_completed |= other.sweep_completed;
    }

    /// Returns true if any element changed position.
    #[inline]
    #[must_use]
    pub const fn relocated(&self) -> bool {
        self.moved > 0 || self.reclaimed > 0
    }
}

/// Tombstone gap left open by the previous step.
#[derive(Clone, Copy, Debug)]
struct PendingGap {
    start: usize,
    end: usize,
    revision: u64,
}

/// Incremental tombstone reclaimer.
#[derive(Clone, Debug)]
pub struct Compactor {
    /// Where the next step starts.
    cursor: usize,
    /// Positions examined per step.
    budget: usize,
    /// Gap carried over from the previous step.
    pending: Option<PendingGap>,
    /// Completed sweeps.
    sweeps: u64,
}

impl Compactor {
    /// Creates a compactor examining up to `budget` positions per step.
    ///
    /// # Panics
    ///
    /// Panics if budget is zero.
    #[must_use]
    pub fn new(budget: usize) -> Self {
        assert!(budget > 0, "Compaction budget must be greater than zero");
        Self {
            cursor: 0,
            budget,
            pending: None,
            sweeps: 0,
        }
    }

    /// Positions examined per step.
    #[inline]
    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }

    /// Where the next step starts.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Completed sweeps since creation.
    #[inline]
    #[must_use]
    pub const fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Starts the next step from position zero.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.pending = None;
    }

    /// Runs one bounded step.
    ///
    /// # Arguments
    ///
    /// * `arena` - Element storage
    /// * `index` - Tile heads, patched in place for every moved head
    pub fn step(&mut self, arena: &mut ElementArena, index: &mut TileIndex) -> CompactionReport {
        let mut report = CompactionReport::default();
        let end = arena.next_free();

        let (mut gap_start, mut gap_end) = match self.take_pending(arena) {
            Some(gap) => (gap.start, gap.end),
            None => {
                let Some(start) = self.find_gap(arena.as_slice(), end, &mut report) else {
                    return report;
                };
                (start, start)
            }
        };

        loop {
            // Extend the gap over following tombstones.
            while gap_end < end && report.scanned < self.budget {
                let slot = &mut arena.as_mut_slice()[gap_end];
                if !slot.is_tombstone() {
                    break;
                }
                if slot.is_last_for_tile() {
                    slot.set_last_for_tile(false);
                    Self::hand_down_terminal(arena, gap_start);
                }
                gap_end += 1;
                report.scanned += 1;
            }

            if gap_end >= end {
                arena.truncate(gap_start);
                report.reclaimed += end - gap_start;
                self.finish_sweep(&mut report);
                return report;
            }
            if report.scanned >= self.budget {
                self.suspend(arena, gap_start, gap_end);
                return report;
            }

            // Measure the live run after the gap.
            let mut live_end = gap_end;
            let elements = arena.as_slice();
            while live_end < end && report.scanned < self.budget && !elements[live_end].is_tombstone() {
                live_end += 1;
                report.scanned += 1;
            }

            let distance = gap_end - gap_start;
            let moved = live_end - gap_end;
            arena.slide_down(gap_end..live_end, gap_start);
            report.heads_patched += index.slide_range(gap_start, live_end, distance);
            report.moved += moved;
            gap_start += moved;
            gap_end = live_end;

            if report.scanned >= self.budget {
                self.suspend(arena, gap_start, gap_end);
                return report;
            }
        }
    }

    /// Repeats [`step`](Self::step) from position zero until one sweep
    /// completes.
    pub fn run_full_sweep(&mut self, arena: &mut ElementArena, index: &mut TileIndex) -> CompactionReport {
        self.restart();
        let mut total = CompactionReport::default();
        loop {
            let report = self.step(arena, index);
            total.merge(&report);
            if report.sweep_completed {
                return total;
            }
        }
    }

    /// Scans up from the cursor for the first tombstone.
    fn find_gap(&mut self, elements: &[TileElement], end: usize, report: &mut CompactionReport) -> Option<usize> {
        let mut position = self.cursor.min(end);
        while position < end {
            if report.scanned >= self.budget {
                self.cursor = position;
                return None;
            }
            if elements[position].is_tombstone() {
                return Some(position);
            }
            position += 1;
            report.scanned += 1;
        }
        self.finish_sweep(report);
        None
    }

    fn take_pending(&mut self, arena: &ElementArena) -> Option<PendingGap> {
        let gap = self.pending.take()?;
        (gap.revision == arena.revision() && gap.end <= arena.next_free()).then_some(gap)
    }

    fn suspend(&mut self, arena: &ElementArena, start: usize, end: usize) {
        self.cursor = start;
        self.pending = (start < end).then_some(PendingGap {
            start,
            end,
            revision: arena.revision(),
        });
    }

    fn finish_sweep(&mut self, report: &mut CompactionReport) {
        self.cursor = 0;
        self.pending = None;
        self.sweeps += 1;
        report.sweep_completed = true;
        tracing::trace!(sweeps = self.sweeps, "compaction sweep complete");
    }

    /// Gives the terminal flag of a swept tombstone to the slot below the gap.
    fn hand_down_terminal(arena: &mut ElementArena, gap_start: usize) {
        match gap_start.checked_sub(1).and_then(|below| arena.get_mut(below)) {
            Some(below) => below.set_last_for_tile(true),
            None => tracing::error!("terminal tombstone at arena start; first tile has no live elements"),
        }
    }
}

impl Default for Compactor {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementFlags, ElementKind};

    fn element(height: u8, last: bool) -> TileElement {
        let mut element = TileElement::new(ElementKind::Scenery, height, height);
        element.set_last_for_tile(last);
        element
    }

    fn tombstone(last: bool) -> TileElement {
        let mut element = TileElement::TOMBSTONE;
        element.flags.set(ElementFlags::LAST_FOR_TILE, last);
        element
    }

    fn setup(elements: &[TileElement], width: u32) -> (ElementArena, TileIndex) {
        let mut arena = ElementArena::new(32);
        assert!(arena.load(elements));
        let (index, _) = TileIndex::build(width, 1, elements).unwrap();
        (arena, index)
    }

    fn heights(arena: &ElementArena) -> Vec<u8> {
        arena.as_slice().iter().map(|e| e.base_height).collect()
    }

    #[test]
    fn test_sweep_without_tombstones() {
        let (mut arena, mut index) = setup(&[element(1, true), element(2, true)], 2);
        let mut compactor = Compactor::new(8);

        let report = compactor.step(&mut arena, &mut index);
        assert_eq!(report.scanned, 2);
        assert!(report.sweep_completed);
        assert!(!report.relocated());
        assert_eq!(compactor.sweeps(), 1);
    }

    #[test]
    fn test_slides_live_run_and_patches_heads() {
        // Tile 0: [1, tomb, tomb(last)]  Tile 1: [tomb, 5(last)]  Tile 2: [6(last)]
        let elements = [
            element(1, false),
            tombstone(false),
            tombstone(true),
            tombstone(false),
            element(5, true),
            element(6, true),
        ];
        let (mut arena, mut index) = setup(&elements, 3);
        let mut compactor = Compactor::new(64);

        let report = compactor.step(&mut arena, &mut index);
        assert!(report.sweep_completed);
        assert_eq!(report.moved, 2);
        assert_eq!(report.reclaimed, 3);
        assert_eq!(heights(&arena), vec![1, 5, 6]);
        assert!(arena.as_slice().iter().all(|e| e.is_last_for_tile()));
        assert_eq!(index.heads(), &[0, 1, 2]);
    }

    #[test]
    fn test_budget_resumes_open_gap() {
        let mut elements = vec![element(1, false)];
        elements.extend(std::iter::repeat(tombstone(false)).take(10));
        elements.push(element(2, true));
        elements.push(element(3, true));
        let (mut arena, mut index) = setup(&elements, 2);
        let mut compactor = Compactor::new(4);

        let mut steps = 0;
        loop {
            steps += 1;
            let report = compactor.step(&mut arena, &mut index);
            assert!(report.scanned <= 4);
            if report.sweep_completed {
                break;
            }
            assert!(steps < 10, "compactor made no progress");
        }

        assert_eq!(heights(&arena), vec![1, 2, 3]);
        assert_eq!(index.heads(), &[0, 2]);
    }

    #[test]
    fn test_open_gap_dropped_after_arena_change() {
        let mut elements = vec![element(1, false)];
        elements.extend(std::iter::repeat(tombstone(false)).take(6));
        elements.push(element(2, true));
        let (mut arena, mut index) = setup(&elements, 1);
        let mut compactor = Compactor::new(3);

        compactor.step(&mut arena, &mut index);
        assert!(compactor.pending.is_some());

        assert!(arena.insert_shifted(0, element(0, false)));
        index.shift_after(0);
        compactor.step(&mut arena, &mut index);

        let total = compactor.run_full_sweep(&mut arena, &mut index);
        assert!(total.sweep_completed);
        assert_eq!(heights(&arena), vec![0, 1, 2]);
    }
}
