// ============================================
// File: crates/mobattest-core/src/crypto/replay.rs
// ============================================
//! # Receive Window
//!
//! ## Creation Reason
//! AEAD authentication alone accepts a frame as often as it is presented.
//! Every peer frame carries the sender's counter in its nonce, so the
//! receiving side records the counters it has opened and refuses any
//! frame whose counter it has already seen.
//!
//! ## Window Layout
//! ```text
//!     ◄──────────── RECEIVE_WINDOW_SIZE ────────────►
//!     ┌──────────────────────────────────────────────┐
//!     │ bitmap, bit (counter % size) marks "opened"  │
//!     └──────────────────────────────────────────────┘
//!     ▲                                              ▲
//!   floor                                         highest
//! ```
//!
//! - counter above `highest`: accepted, window slides forward
//! - counter in the window and unmarked: accepted, marked
//! - counter marked: `Replay`
//! - counter below the floor: `TooOld`
//!
//! ## ⚠️ Important Note for Next Developer
//! - Record a counter only after the frame authenticated, otherwise a
//!   forged frame could burn a legitimate counter
//! - Concurrent calls on one session may complete out of order; the
//!   window must stay wider than the number of calls in flight
//!
//! ## Last Modified
//! v0.1.0 - Receive window for peer frames

/// Counters remembered behind the highest one opened.
pub const RECEIVE_WINDOW_SIZE: u64 = 256;

const BITMAP_WORDS: usize = (RECEIVE_WINDOW_SIZE / 64) as usize;

/// Outcome of [`ReplayWindow::check_and_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayCheck {
    /// First time this counter is seen.
    Accept,
    /// Counter already opened.
    Replay,
    /// Counter fell out of the window.
    TooOld,
}

impl ReplayCheck {
    /// Returns `true` for [`ReplayCheck::Accept`].
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Sliding window over the counters of one sender.
#[derive(Clone, PartialEq, Eq)]
pub struct ReplayWindow {
    highest: Option<u64>,
    bitmap: [u64; BITMAP_WORDS],
}

impl ReplayWindow {
    /// Creates a window that has seen nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            highest: None,
            bitmap: [0; BITMAP_WORDS],
        }
    }

    /// Returns the highest counter recorded.
    #[must_use]
    pub const fn highest(&self) -> Option<u64> {
        self.highest
    }

    /// Checks `counter` and records it when accepted.
    pub fn check_and_record(&mut self, counter: u64) -> ReplayCheck {
        let Some(highest) = self.highest else {
            self.highest = Some(counter);
            self.mark(counter);
            return ReplayCheck::Accept;
        };

        if counter > highest {
            let advance = counter - highest;
            if advance >= RECEIVE_WINDOW_SIZE {
                self.bitmap = [0; BITMAP_WORDS];
            } else {
                (highest + 1..=counter).for_each(|slot| self.unmark(slot));
            }
            self.highest = Some(counter);
            self.mark(counter);
            return ReplayCheck::Accept;
        }

        if highest - counter >= RECEIVE_WINDOW_SIZE {
            return ReplayCheck::TooOld;
        }
        if self.is_marked(counter) {
            return ReplayCheck::Replay;
        }
        self.mark(counter);
        ReplayCheck::Accept
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn slot(counter: u64) -> (usize, u64) {
        let bit = (counter % RECEIVE_WINDOW_SIZE) as usize;
        (bit / 64, 1u64 << (bit % 64))
    }

    fn is_marked(&self, counter: u64) -> bool {
        let (word, mask) = Self::slot(counter);
        self.bitmap[word] & mask != 0
    }

    fn mark(&mut self, counter: u64) {
        let (word, mask) = Self::slot(counter);
        self.bitmap[word] |= mask;
    }

    fn unmark(&mut self, counter: u64) {
        let (word, mask) = Self::slot(counter);
        self.bitmap[word] &= !mask;
    }
}

impl Default for ReplayWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReplayWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayWindow")
            .field("highest", &self.highest)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_order_counters_accepted_once() {
        let mut window = ReplayWindow::new();
        for counter in 0..5 {
            assert_eq!(window.check_and_record(counter), ReplayCheck::Accept);
        }
        assert_eq!(window.check_and_record(0), ReplayCheck::Replay);
        assert_eq!(window.check_and_record(4), ReplayCheck::Replay);
        assert_eq!(window.highest(), Some(4));
    }

    #[test]
    fn test_out_of_order_within_window() {
        let mut window = ReplayWindow::new();
        assert!(window.check_and_record(3).is_accepted());
        assert!(window.check_and_record(1).is_accepted());
        assert!(window.check_and_record(2).is_accepted());
        assert_eq!(window.check_and_record(1), ReplayCheck::Replay);
        assert_eq!(window.highest(), Some(3));
    }

    #[test]
    fn test_old_counters_rejected() {
        let mut window = ReplayWindow::new();
        window.check_and_record(0);
        window.check_and_record(RECEIVE_WINDOW_SIZE + 10);
        assert_eq!(window.check_and_record(5), ReplayCheck::TooOld);
        assert!(window.check_and_record(RECEIVE_WINDOW_SIZE + 9).is_accepted());
    }

    #[test]
    fn test_sliding_clears_reused_slots() {
        let mut window = ReplayWindow::new();
        window.check_and_record(1);
        // Same bit position as counter 1, one window later.
        assert!(window.check_and_record(RECEIVE_WINDOW_SIZE + 1).is_accepted());
        assert!(window.check_and_record(RECEIVE_WINDOW_SIZE).is_accepted());
        assert_eq!(window.check_and_record(RECEIVE_WINDOW_SIZE + 1), ReplayCheck::Replay);
    }
}
