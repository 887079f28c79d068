//! Kickoff times.
//!
//! Schedule times are US/Eastern wall-clock. Eastern is UTC−4 from the
//! second Sunday of March through the Saturday before the first Sunday of
//! November, UTC−5 otherwise. NFL kickoffs never fall in the 02:00 change
//! hour, so the switch is applied per calendar date.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

use crate::types::Game;

/// Kickoff assumed when the schedule has no time.
pub const DEFAULT_KICKOFF: (u32, u32) = (13, 0);

/// UTC offset of US/Eastern on `date`, in hours.
pub fn eastern_offset_hours(date: NaiveDate) -> i64 {
    let year = date.year();
    let dst_start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2);
    let dst_end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1);
    match (dst_start, dst_end) {
        (Some(s), Some(e)) if date >= s && date < e => -4,
        _ => -5,
    }
}

/// Kickoff instant for `game` in UTC.
pub fn kickoff_utc(game: &Game) -> DateTime<Utc> {
    let (h, m) = DEFAULT_KICKOFF;
    let time = game
        .gametime
        .or_else(|| NaiveTime::from_hms_opt(h, m, 0))
        .unwrap_or(NaiveTime::MIN);
    let local = game.gameday.and_time(time);
    (local - Duration::hours(eastern_offset_hours(game.gameday))).and_utc()
}

/// US/Eastern calendar date at instant `now`. Schedule dates are Eastern,
/// so a run at 01:00 UTC still sees that evening's late games as today.
pub fn eastern_date(now: DateTime<Utc>) -> NaiveDate {
    let naive = now.naive_utc();
    // Offset is chosen by the Eastern date; standard time gives the guess
    let guess = (naive + Duration::hours(-5)).date();
    (naive + Duration::hours(eastern_offset_hours(guess))).date()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
