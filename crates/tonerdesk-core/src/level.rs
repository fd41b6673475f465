//! # Level Module
//!
//! Provides the `TonerLevel` type for handling fill levels safely.
//!
//! ## Why Integer Percent?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In the original dashboard (JavaScript):                                │
//! │    level - days * rate / capacity  →  37.99999999999999 %               │
//! │                                                                         │
//! │  Printers report whole percent. Forecasts that pretend to more          │
//! │  precision than the input just round-trip noise.                        │
//! │                                                                         │
//! │  OUR SOLUTION: Whole Percent, Whole Pages                               │
//! │    level is i64 in [0, 100]; consumption math happens in pages and      │
//! │    divides back down with explicit flooring.                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tonerdesk_core::level::TonerLevel;
//!
//! let level = TonerLevel::from_pct(55);
//! assert_eq!(level.pct(), 55);
//! assert_eq!(level.pages_remaining(4000), 2200);
//!
//! // Out-of-range input clamps instead of panicking
//! assert_eq!(TonerLevel::from_pct(130), TonerLevel::full());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Toner Level Type
// =============================================================================

/// A fill level in whole percent, always within `[0, 100]`.
///
/// ## Design Decisions
/// - **i64 storage**: matches the database column and avoids casts at the seam
/// - **Clamping constructors**: a level can never be out of range by construction
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// Used for both toner cartridges and fuser units; the arithmetic is the
/// same, only the rated capacity differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TonerLevel(i64);

impl TonerLevel {
    /// Creates a level from whole percent, clamping into `[0, 100]`.
    ///
    /// ## Example
    /// ```rust
    /// use tonerdesk_core::level::TonerLevel;
    ///
    /// assert_eq!(TonerLevel::from_pct(55).pct(), 55);
    /// assert_eq!(TonerLevel::from_pct(-3).pct(), 0);
    /// assert_eq!(TonerLevel::from_pct(250).pct(), 100);
    /// ```
    #[inline]
    pub const fn from_pct(pct: i64) -> Self {
        if pct < 0 {
            TonerLevel(0)
        } else if pct > 100 {
            TonerLevel(100)
        } else {
            TonerLevel(pct)
        }
    }

    /// A freshly installed consumable.
    #[inline]
    pub const fn full() -> Self {
        TonerLevel(100)
    }

    /// A spent consumable.
    #[inline]
    pub const fn empty() -> Self {
        TonerLevel(0)
    }

    /// Returns the level in whole percent.
    #[inline]
    pub const fn pct(&self) -> i64 {
        self.0
    }

    /// Checks if the consumable is spent.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the level is at or below a threshold.
    ///
    /// ## Example
    /// ```rust
    /// use tonerdesk_core::level::TonerLevel;
    ///
    /// assert!(TonerLevel::from_pct(8).is_at_or_below(10));
    /// assert!(!TonerLevel::from_pct(55).is_at_or_below(10));
    /// ```
    #[inline]
    pub const fn is_at_or_below(&self, threshold_pct: i64) -> bool {
        self.0 <= threshold_pct
    }

    /// Pages left in a consumable rated for `capacity_pages`.
    ///
    /// Floors toward zero; a 55% cartridge rated 4,000 pages has 2,200 left.
    /// Non-positive capacities yield zero rather than nonsense.
    #[inline]
    pub const fn pages_remaining(&self, capacity_pages: i64) -> i64 {
        if capacity_pages <= 0 {
            return 0;
        }
        capacity_pages * self.0 / 100
    }

    /// Level after printing `pages` on a consumable rated `capacity_pages`,
    /// saturating at empty.
    ///
    /// ## Example
    /// ```rust
    /// use tonerdesk_core::level::TonerLevel;
    ///
    /// let level = TonerLevel::from_pct(50);
    /// // 1,000 pages on a 4,000-page cartridge burns 25 points
    /// assert_eq!(level.after_pages(1000, 4000).pct(), 25);
    /// // overprinting saturates instead of going negative
    /// assert_eq!(level.after_pages(999_999, 4000).pct(), 0);
    /// ```
    pub const fn after_pages(&self, pages: i64, capacity_pages: i64) -> Self {
        if capacity_pages <= 0 || pages <= 0 {
            return *self;
        }
        let burned_pct = pages * 100 / capacity_pages;
        TonerLevel::from_pct(self.0 - burned_pct)
    }
}

impl Default for TonerLevel {
    /// New consumables start full.
    fn default() -> Self {
        TonerLevel::full()
    }
}

impl fmt::Display for TonerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pct_clamps() {
        assert_eq!(TonerLevel::from_pct(-10).pct(), 0);
        assert_eq!(TonerLevel::from_pct(0).pct(), 0);
        assert_eq!(TonerLevel::from_pct(100).pct(), 100);
        assert_eq!(TonerLevel::from_pct(101).pct(), 100);
    }

    #[test]
    fn test_pages_remaining() {
        assert_eq!(TonerLevel::from_pct(55).pages_remaining(4000), 2200);
        assert_eq!(TonerLevel::from_pct(100).pages_remaining(4000), 4000);
        assert_eq!(TonerLevel::empty().pages_remaining(4000), 0);
        // degenerate capacity
        assert_eq!(TonerLevel::full().pages_remaining(0), 0);
        assert_eq!(TonerLevel::full().pages_remaining(-5), 0);
    }

    #[test]
    fn test_after_pages_floors_and_saturates() {
        let level = TonerLevel::from_pct(50);
        assert_eq!(level.after_pages(1000, 4000).pct(), 25);
        // 39 pages of a 4,000-page cartridge is < 1 point: floors to no change
        assert_eq!(level.after_pages(39, 4000).pct(), 50);
        assert_eq!(level.after_pages(10_000, 4000).pct(), 0);
        // no-ops
        assert_eq!(level.after_pages(0, 4000), level);
        assert_eq!(level.after_pages(500, 0), level);
    }

    #[test]
    fn test_display() {
        assert_eq!(TonerLevel::from_pct(42).to_string(), "42%");
    }

    #[test]
    fn test_default_is_full() {
        assert_eq!(TonerLevel::default(), TonerLevel::full());
    }
}
