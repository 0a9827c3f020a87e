//! Reference date math for the fixed lookback windows.
//!
//! Weekends are accounted for; exchange holidays are not modeled (a known
//! simplification - a holiday reference date resolves through the series
//! as-of fallback instead).

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// The trading day immediately before `date`.
///
/// Monday steps back to the preceding Friday, Sunday to the Friday before
/// it; every other weekday steps back one calendar day.
pub fn previous_trading_day(date: NaiveDate) -> NaiveDate {
    let days_back = match date.weekday() {
        Weekday::Mon => 3,
        Weekday::Sun => 2,
        _ => 1,
    };
    date - Duration::days(days_back)
}

/// The most recent Friday strictly before the current trading week.
///
/// A weekly change always compares against a full prior week's close, never
/// the in-progress week:
/// - Friday returns the Friday seven days earlier (this week has not closed)
/// - Saturday and Sunday skip the immediately preceding Friday - it closes
///   the week that was just measured - and return the Friday of the week
///   before it
/// - Monday through Thursday return the most recent Friday before `date`
///
/// The Friday/weekend boundary is a product-facing configuration point; the
/// rules above preserve the behavior of the original tracker.
pub fn last_completed_friday(date: NaiveDate) -> NaiveDate {
    let days_back = match date.weekday() {
        Weekday::Mon => 3,
        Weekday::Tue => 4,
        Weekday::Wed => 5,
        Weekday::Thu => 6,
        Weekday::Fri => 7,
        Weekday::Sat => 8,
        Weekday::Sun => 9,
    };
    date - Duration::days(days_back)
}

/// `date` minus `n` calendar days (not trading days). Used as the target for
/// series as-of lookups.
pub fn days_back(date: NaiveDate, n: i64) -> NaiveDate {
    date - Duration::days(n)
}
