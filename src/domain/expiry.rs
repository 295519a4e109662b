//! Forward expiry generation.
//!
//! Weekly equity options expire on Fridays. CBOE-listed products whose
//! monthly cycle lands on the third week are treated as expiring on the
//! Thursday of that week instead.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

/// Broker date format used for expiries.
pub const EXPIRY_FORMAT: &str = "%Y%m%d";

/// Generate `n` expiries starting from today (local time).
#[must_use]
pub fn next_expiries(n: usize, cboe: bool) -> Vec<String> {
    expiries_from(Local::now().date_naive(), n, cboe)
}

/// Generate `n` expiry codes (`YYYYMMDD`) forward from `today`.
///
/// For offset `i`, the expiry is the first Friday on or after `today + 7i`
/// days. With `cboe` set, a Thursday falling on day 15..=21 of its month
/// replaces the Friday that follows it, unless that Thursday is already
/// before `today + 7i`.
#[must_use]
pub fn expiries_from(today: NaiveDate, n: usize, cboe: bool) -> Vec<String> {
    expiry_dates_from(today, n, cboe)
        .into_iter()
        .map(|d| d.format(EXPIRY_FORMAT).to_string())
        .collect()
}

/// Same as [`expiries_from`] but returns dates.
#[must_use]
pub fn expiry_dates_from(today: NaiveDate, n: usize, cboe: bool) -> Vec<NaiveDate> {
    (0..n)
        .filter_map(|i| today.checked_add_days(Days::new(7 * i as u64)))
        .map(|week| {
            let friday = friday_on_or_after(week);
            match friday.pred_opt() {
                Some(thursday)
                    if cboe && thursday >= week && (15..=21).contains(&thursday.day()) =>
                {
                    thursday
                }
                _ => friday,
            }
        })
        .collect()
}

/// Parse a `YYYYMMDD` expiry code.
pub fn parse_expiry(code: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(code, EXPIRY_FORMAT)
}

fn friday_on_or_after(date: NaiveDate) -> NaiveDate {
    let from_monday = date.weekday().num_days_from_monday();
    let friday = Weekday::Fri.num_days_from_monday();
    let ahead = (friday + 7 - from_monday) % 7;
    date + Days::new(u64::from(ahead))
}
