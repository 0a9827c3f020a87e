//! Percentage change calculation and the reference window table.
//!
//! The lookback windows are a fixed, process-wide table: the chain of
//! windows is data, not branching logic, so a window's target date is
//! resolved through its [`ReferenceDateRule`] rather than ad hoc call-site
//! conditionals.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::calendar;

/// Named lookback window label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WindowLabel {
    OneDay,
    OneWeek,
    TwoWeeks,
    ThreeWeeks,
    OneMonth,
    ThreeMonths,
}

impl WindowLabel {
    pub const ALL: [WindowLabel; 6] = [
        WindowLabel::OneDay,
        WindowLabel::OneWeek,
        WindowLabel::TwoWeeks,
        WindowLabel::ThreeWeeks,
        WindowLabel::OneMonth,
        WindowLabel::ThreeMonths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowLabel::OneDay => "1d",
            WindowLabel::OneWeek => "1w",
            WindowLabel::TwoWeeks => "2w",
            WindowLabel::ThreeWeeks => "3w",
            WindowLabel::OneMonth => "1m",
            WindowLabel::ThreeMonths => "3m",
        }
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a window's reference date is derived from the anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceDateRule {
    /// The trading day before the anchor (the 1d window).
    PreviousTradingDay,
    /// The last Friday of a fully completed week (the 1w window).
    LastCompletedFriday,
    /// A fixed number of calendar days back, resolved via series as-of.
    DaysBack(i64),
}

/// Named lookback specification. Fixed at process level, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceWindow {
    pub label: WindowLabel,
    pub rule: ReferenceDateRule,
}

impl ReferenceWindow {
    /// Resolves this window's reference date relative to `anchor`.
    pub fn target_date(&self, anchor: NaiveDate) -> NaiveDate {
        match self.rule {
            ReferenceDateRule::PreviousTradingDay => calendar::previous_trading_day(anchor),
            ReferenceDateRule::LastCompletedFriday => calendar::last_completed_friday(anchor),
            ReferenceDateRule::DaysBack(n) => calendar::days_back(anchor, n),
        }
    }
}

/// The process-wide window table, longest label last.
pub const REFERENCE_WINDOWS: [ReferenceWindow; 6] = [
    ReferenceWindow {
        label: WindowLabel::OneDay,
        rule: ReferenceDateRule::PreviousTradingDay,
    },
    ReferenceWindow {
        label: WindowLabel::OneWeek,
        rule: ReferenceDateRule::LastCompletedFriday,
    },
    ReferenceWindow {
        label: WindowLabel::TwoWeeks,
        rule: ReferenceDateRule::DaysBack(14),
    },
    ReferenceWindow {
        label: WindowLabel::ThreeWeeks,
        rule: ReferenceDateRule::DaysBack(21),
    },
    ReferenceWindow {
        label: WindowLabel::OneMonth,
        rule: ReferenceDateRule::DaysBack(30),
    },
    ReferenceWindow {
        label: WindowLabel::ThreeMonths,
        rule: ReferenceDateRule::DaysBack(90),
    },
];

/// Signed percentage change between a current and a reference price,
/// rounded to two decimal places.
///
/// Fails soft: a missing, zero, or unchanged reference yields 0 rather than
/// a division error. A zero-change result is therefore indistinguishable
/// from a missing-reference result; this collapsing behavior is kept for
/// compatibility with downstream consumers.
pub fn percent_change(current: Decimal, reference: Option<Decimal>) -> Decimal {
    match reference {
        None => Decimal::ZERO,
        Some(r) if r.is_zero() || r == current => Decimal::ZERO,
        Some(r) => ((current - r) / r * Decimal::ONE_HUNDRED).round_dp(2),
    }
}

/// Per-window percent changes for one symbol, keyed by label.
///
/// Always carries all six labels so the emitted result shape is uniform
/// even when a reference was unavailable (reported as 0%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet(BTreeMap<WindowLabel, Decimal>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: WindowLabel, percent: Decimal) {
        self.0.insert(label, percent);
    }

    /// The percent for a label; 0 when absent.
    pub fn percent(&self, label: WindowLabel) -> Decimal {
        self.0.get(&label).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (WindowLabel, Decimal)> + '_ {
        self.0.iter().map(|(label, percent)| (*label, *percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_change_doubling() {
        assert_eq!(percent_change(dec!(100), Some(dec!(50))), dec!(100.0));
    }

    #[test]
    fn test_percent_change_halving() {
        assert_eq!(percent_change(dec!(50), Some(dec!(100))), dec!(-50.0));
    }

    #[test]
    fn test_percent_change_rounds_to_two_places() {
        // (110 - 103) / 103 * 100 = 6.7961...
        assert_eq!(percent_change(dec!(110), Some(dec!(103))), dec!(6.80));
    }

    #[test]
    fn test_percent_change_zero_reference_fails_soft() {
        assert_eq!(percent_change(dec!(42), Some(Decimal::ZERO)), Decimal::ZERO);
    }

    #[test]
    fn test_percent_change_missing_reference_fails_soft() {
        assert_eq!(percent_change(dec!(42), None), Decimal::ZERO);
    }

    #[test]
    fn test_percent_change_equal_prices_is_zero() {
        assert_eq!(percent_change(dec!(42), Some(dec!(42))), Decimal::ZERO);
    }

    #[test]
    fn test_window_table_covers_all_labels_once() {
        let labels: Vec<WindowLabel> = REFERENCE_WINDOWS.iter().map(|w| w.label).collect();
        assert_eq!(labels, WindowLabel::ALL);
    }

    #[test]
    fn test_target_dates_for_a_monday() {
        // 2024-01-15 is a Monday.
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let by_label: std::collections::HashMap<_, _> = REFERENCE_WINDOWS
            .iter()
            .map(|w| (w.label, w.target_date(anchor)))
            .collect();

        assert_eq!(
            by_label[&WindowLabel::OneDay],
            NaiveDate::from_ymd_opt(2024, 1, 12).unwrap()
        );
        assert_eq!(
            by_label[&WindowLabel::OneWeek],
            NaiveDate::from_ymd_opt(2024, 1, 12).unwrap()
        );
        assert_eq!(
            by_label[&WindowLabel::TwoWeeks],
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            by_label[&WindowLabel::ThreeMonths],
            NaiveDate::from_ymd_opt(2023, 10, 17).unwrap()
        );
    }

    #[test]
    fn test_change_set_defaults_to_zero() {
        let changes = ChangeSet::new();
        assert_eq!(changes.percent(WindowLabel::OneDay), Decimal::ZERO);
    }
}
