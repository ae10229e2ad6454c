/**
 * Calendar Resolution
 *
 * Converts instants to a group's local calendar day. Pure functions, no
 * state; daylight-saving transitions are handled by `chrono-tz`.
 */

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// The calendar date of `instant` as observed in `tz`
///
/// # Example
///
/// ```rust
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use chrono_tz::Tz;
/// use standup::backend::session::calendar::local_day;
///
/// // 2024-01-11 07:30 UTC is still the evening of the 10th in Los Angeles
/// let instant = Utc.with_ymd_and_hms(2024, 1, 11, 7, 30, 0).unwrap();
/// assert_eq!(
///     local_day(instant, Tz::America__Los_Angeles),
///     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
/// );
/// ```
pub fn local_day(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Whether two instants fall on the same calendar day in `tz`
pub fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: Tz) -> bool {
    local_day(a, tz) == local_day(b, tz)
}
