//! # Forecast Module
//!
//! Linear depletion forecasting for toner and fuser consumables.
//!
//! ## The Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Linear Depletion Forecast                            │
//! │                                                                         │
//! │  Inputs (all observed, all integers):                                   │
//! │    level           current fill level, whole percent                    │
//! │    capacity_pages  rated page yield of the installed consumable         │
//! │    daily_pages     observed pages printed per day                       │
//! │                                                                         │
//! │  pages_remaining = capacity_pages × level / 100                         │
//! │  days_remaining  = pages_remaining / daily_pages   (floor)              │
//! │                                                                         │
//! │  level ────┐                                                            │
//! │   100%     │■■■■■■                                                      │
//! │            │      ■■■■■■                                                │
//! │    50%     │            ■■■■■■        slope = daily_pages / capacity    │
//! │            │                  ■■■■■■                                    │
//! │     0%     └──────────────────────────■──────────► days                 │
//! │                                       ▲                                 │
//! │                                 empty_on date                           │
//! │                                                                         │
//! │  daily_pages = 0 ⇒ the printer is idle ⇒ no projected empty date        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller supplies "today" explicitly; this module never reads the
//! clock, so forecasts stay reproducible in tests.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::level::TonerLevel;

// =============================================================================
// Depletion Forecast
// =============================================================================

/// Projection of when a consumable runs dry under the linear model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepletionForecast {
    /// Current fill level.
    pub level: TonerLevel,

    /// Rated page yield of the installed consumable.
    pub capacity_pages: i64,

    /// Observed pages per day.
    pub daily_pages: i64,

    /// Pages left before empty.
    pub pages_remaining: i64,

    /// Whole days until empty; `None` when the printer is idle
    /// (`daily_pages` is zero) and the level will never move.
    pub days_remaining: Option<i64>,
}

impl DepletionForecast {
    /// Projects depletion from the observed state.
    ///
    /// ## Arguments
    /// * `level` - current fill level
    /// * `capacity_pages` - rated page yield of the installed consumable
    /// * `daily_pages` - observed consumption rate (clamped at 0)
    ///
    /// ## Example
    /// ```rust
    /// use tonerdesk_core::forecast::DepletionForecast;
    /// use tonerdesk_core::level::TonerLevel;
    ///
    /// let f = DepletionForecast::project(TonerLevel::from_pct(50), 4000, 100);
    /// assert_eq!(f.pages_remaining, 2000);
    /// assert_eq!(f.days_remaining, Some(20));
    ///
    /// // An idle printer never runs dry
    /// let idle = DepletionForecast::project(TonerLevel::from_pct(50), 4000, 0);
    /// assert_eq!(idle.days_remaining, None);
    /// ```
    pub fn project(level: TonerLevel, capacity_pages: i64, daily_pages: i64) -> Self {
        let daily_pages = daily_pages.max(0);
        let pages_remaining = level.pages_remaining(capacity_pages);

        let days_remaining = if daily_pages == 0 {
            None
        } else {
            Some(pages_remaining / daily_pages)
        };

        DepletionForecast {
            level,
            capacity_pages,
            daily_pages,
            pages_remaining,
            days_remaining,
        }
    }

    /// The projected date the consumable runs dry, given "today".
    ///
    /// Returns `None` for idle printers.
    pub fn empty_on(&self, today: NaiveDate) -> Option<NaiveDate> {
        let days = self.days_remaining?;
        today.checked_add_days(Days::new(days as u64))
    }

    /// Projected level after `days` more days at the observed rate.
    ///
    /// Saturates at empty. Idle printers hold their level.
    pub fn level_after_days(&self, days: i64) -> TonerLevel {
        self.level
            .after_pages(days.max(0) * self.daily_pages, self.capacity_pages)
    }

    /// True when the consumable is projected to run dry within `days`.
    pub fn runs_dry_within(&self, days: i64) -> bool {
        match self.days_remaining {
            Some(remaining) => remaining <= days,
            None => false,
        }
    }
}

// =============================================================================
// Fleet Status
// =============================================================================

/// Health classification of one printer's consumable in the fleet report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyStatus {
    /// Level is fine and stock or time is available.
    Ok,
    /// Level is at or below the configured threshold.
    LowLevel,
    /// Projected to run dry within the lead time, with no stock on hand.
    OrderSuggested,
}

/// Classifies one printer's consumable for the fleet report.
///
/// ## Rules (checked in order)
/// 1. Projected dry within `lead_time_days` AND nothing on hand
///    → [`SupplyStatus::OrderSuggested`]
/// 2. Level at or below `low_level_pct` → [`SupplyStatus::LowLevel`]
/// 3. Otherwise → [`SupplyStatus::Ok`]
///
/// `on_hand` counts only the printer's own inventory row; borrowable stock
/// at other printers does not silence an order suggestion.
pub fn classify_supply(
    forecast: &DepletionForecast,
    on_hand: i64,
    low_level_pct: i64,
    lead_time_days: i64,
) -> SupplyStatus {
    if forecast.runs_dry_within(lead_time_days) && on_hand <= 0 {
        return SupplyStatus::OrderSuggested;
    }

    if forecast.level.is_at_or_below(low_level_pct) {
        return SupplyStatus::LowLevel;
    }

    SupplyStatus::Ok
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_project_linear() {
        let f = DepletionForecast::project(TonerLevel::from_pct(50), 4000, 100);
        assert_eq!(f.pages_remaining, 2000);
        assert_eq!(f.days_remaining, Some(20));
        assert_eq!(f.empty_on(date(2026, 8, 5)), Some(date(2026, 8, 25)));
    }

    #[test]
    fn test_project_idle_printer() {
        let f = DepletionForecast::project(TonerLevel::from_pct(50), 4000, 0);
        assert_eq!(f.days_remaining, None);
        assert_eq!(f.empty_on(date(2026, 8, 5)), None);
        assert!(!f.runs_dry_within(1000));
        // negative rates are treated as idle
        let f = DepletionForecast::project(TonerLevel::from_pct(50), 4000, -7);
        assert_eq!(f.days_remaining, None);
    }

    #[test]
    fn test_project_scales_linearly() {
        let half = DepletionForecast::project(TonerLevel::from_pct(50), 4000, 100);
        let full = DepletionForecast::project(TonerLevel::from_pct(100), 4000, 100);
        let double_cap = DepletionForecast::project(TonerLevel::from_pct(50), 8000, 100);

        assert_eq!(full.pages_remaining, 2 * half.pages_remaining);
        assert_eq!(double_cap.pages_remaining, 2 * half.pages_remaining);
    }

    #[test]
    fn test_level_after_days_saturates() {
        let f = DepletionForecast::project(TonerLevel::from_pct(50), 4000, 100);
        // 10 days × 100 pages = 1000 pages = 25 points
        assert_eq!(f.level_after_days(10).pct(), 25);
        assert_eq!(f.level_after_days(1000).pct(), 0);
        assert_eq!(f.level_after_days(0).pct(), 50);
    }

    #[test]
    fn test_empty_cartridge_is_dry_now() {
        let f = DepletionForecast::project(TonerLevel::empty(), 4000, 100);
        assert_eq!(f.days_remaining, Some(0));
        assert!(f.runs_dry_within(0));
    }

    #[test]
    fn test_classify_order_suggested_beats_low_level() {
        // 2% level, burns dry in 0 days, nothing on hand
        let f = DepletionForecast::project(TonerLevel::from_pct(2), 4000, 500);
        assert_eq!(classify_supply(&f, 0, 10, 7), SupplyStatus::OrderSuggested);
        // same forecast but a spare on the shelf: just low
        assert_eq!(classify_supply(&f, 1, 10, 7), SupplyStatus::LowLevel);
    }

    #[test]
    fn test_classify_ok() {
        let f = DepletionForecast::project(TonerLevel::from_pct(80), 4000, 10);
        assert_eq!(classify_supply(&f, 0, 10, 7), SupplyStatus::Ok);
    }

    #[test]
    fn test_classify_idle_low_printer() {
        // Idle printer at 5%: never runs dry, but the level flag still fires
        let f = DepletionForecast::project(TonerLevel::from_pct(5), 4000, 0);
        assert_eq!(classify_supply(&f, 0, 10, 7), SupplyStatus::LowLevel);
    }
}
