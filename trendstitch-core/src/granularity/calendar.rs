//! Calendar arithmetic per granularity.
//!
//! Every granularity maps to one [`Calendar`] entry holding four functions:
//! truncate an instant to the start of its period, find the start of the last
//! day (or hour) of a period, advance a period start by `n` periods, and number
//! periods so that counting whole periods is a subtraction.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, Utc};
use trendstitch_types::{Granularity, StitchError};

/// Calendar functions for one granularity.
#[derive(Clone, Copy)]
pub struct Calendar {
    /// Granularity described by this entry.
    pub granularity: Granularity,
    /// Start of the period containing the instant.
    pub truncate: fn(DateTime<Utc>) -> Option<DateTime<Utc>>,
    /// Start of the last day (last hour for `h`) of the period starting at the instant.
    pub period_end: fn(DateTime<Utc>) -> Option<DateTime<Utc>>,
    /// Period start `n` periods after (or before, when negative) the given period start.
    pub advance: fn(DateTime<Utc>, i64) -> Option<DateTime<Utc>>,
    /// Monotonic period number of the period containing the instant.
    pub ordinal: fn(DateTime<Utc>) -> i64,
}

impl std::fmt::Debug for Calendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calendar")
            .field("granularity", &self.granularity)
            .finish_non_exhaustive()
    }
}

/// One entry per granularity, finest first.
pub const CALENDARS: [Calendar; 7] = [
    Calendar {
        granularity: Granularity::Hour,
        truncate: hour_floor,
        period_end: same_period,
        advance: add_hours,
        ordinal: hour_ordinal,
    },
    Calendar {
        granularity: Granularity::Day,
        truncate: day_floor,
        period_end: same_period,
        advance: add_days,
        ordinal: day_ordinal,
    },
    Calendar {
        granularity: Granularity::Week,
        truncate: week_floor,
        period_end: week_last_day,
        advance: add_weeks,
        ordinal: week_ordinal,
    },
    Calendar {
        granularity: Granularity::Month,
        truncate: month_floor,
        period_end: month_last_day,
        advance: add_months,
        ordinal: month_ordinal,
    },
    Calendar {
        granularity: Granularity::Quarter,
        truncate: quarter_floor,
        period_end: quarter_last_day,
        advance: add_quarters,
        ordinal: quarter_ordinal,
    },
    Calendar {
        granularity: Granularity::Year,
        truncate: year_floor,
        period_end: year_last_day,
        advance: add_years,
        ordinal: year_ordinal,
    },
    Calendar {
        granularity: Granularity::Decade,
        truncate: decade_floor,
        period_end: decade_last_day,
        advance: add_decades,
        ordinal: decade_ordinal,
    },
];

/// Calendar entry for `granularity`.
#[must_use]
pub const fn calendar(granularity: Granularity) -> &'static Calendar {
    match granularity {
        Granularity::Hour => &CALENDARS[0],
        Granularity::Day => &CALENDARS[1],
        Granularity::Week => &CALENDARS[2],
        Granularity::Month => &CALENDARS[3],
        Granularity::Quarter => &CALENDARS[4],
        Granularity::Year => &CALENDARS[5],
        Granularity::Decade => &CALENDARS[6],
    }
}

fn out_of_range(what: &str, ts: DateTime<Utc>) -> StitchError {
    StitchError::planning(format!("{what} out of supported date range near {ts}"))
}

impl Calendar {
    /// Start of the period containing `ts`.
    ///
    /// # Errors
    /// Returns `StitchError::Planning` when the result is not representable.
    pub fn period_start(&self, ts: DateTime<Utc>) -> Result<DateTime<Utc>, StitchError> {
        (self.truncate)(ts).ok_or_else(|| out_of_range("period start", ts))
    }

    /// Start of the last day (or hour) of the period containing `ts`.
    ///
    /// # Errors
    /// Returns `StitchError::Planning` when the result is not representable.
    pub fn last_instant(&self, ts: DateTime<Utc>) -> Result<DateTime<Utc>, StitchError> {
        let start = self.period_start(ts)?;
        (self.period_end)(start).ok_or_else(|| out_of_range("period end", ts))
    }

    /// Period start `n` periods from the period containing `ts`.
    ///
    /// # Errors
    /// Returns `StitchError::Planning` when the result is not representable.
    pub fn shift(&self, ts: DateTime<Utc>, n: i64) -> Result<DateTime<Utc>, StitchError> {
        let start = self.period_start(ts)?;
        (self.advance)(start, n).ok_or_else(|| out_of_range("shifted period", ts))
    }

    /// Whole periods in the inclusive range `[start, end]`.
    #[must_use]
    pub fn units_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        (self.ordinal)(end) - (self.ordinal)(start) + 1
    }

    /// Last instant of a window of `length` periods starting at the period of `start`.
    ///
    /// # Errors
    /// Returns `StitchError::Planning` when the result is not representable.
    pub fn window_end(
        &self,
        start: DateTime<Utc>,
        length: u32,
    ) -> Result<DateTime<Utc>, StitchError> {
        let last = self.shift(start, i64::from(length.max(1)) - 1)?;
        (self.period_end)(last).ok_or_else(|| out_of_range("window end", start))
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn hour_floor(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.timestamp().div_euclid(3600) * 3600, 0)
}

fn day_floor(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Some(midnight(ts.date_naive()))
}

fn week_floor(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let date = ts.date_naive();
    let back = i64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_signed(TimeDelta::days(back)).map(midnight)
}

fn month_floor(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(ts.year(), ts.month(), 1).map(midnight)
}

fn quarter_floor(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let month = (ts.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(ts.year(), month, 1).map(midnight)
}

fn year_floor(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(ts.year(), 1, 1).map(midnight)
}

fn decade_floor(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(ts.year().div_euclid(10) * 10, 1, 1).map(midnight)
}

fn add_hours(ts: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
    ts.checked_add_signed(TimeDelta::try_hours(n)?)
}

fn add_days(ts: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
    ts.checked_add_signed(TimeDelta::try_days(n)?)
}

fn add_weeks(ts: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
    ts.checked_add_signed(TimeDelta::try_weeks(n)?)
}

fn add_months(ts: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
    let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
    if n >= 0 {
        ts.checked_add_months(months)
    } else {
        ts.checked_sub_months(months)
    }
}

fn add_quarters(ts: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
    add_months(ts, n.checked_mul(3)?)
}

fn add_years(ts: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
    add_months(ts, n.checked_mul(12)?)
}

fn add_decades(ts: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
    add_months(ts, n.checked_mul(120)?)
}

fn same_period(start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Some(start)
}

fn last_day_before(next_period: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    next_period?.checked_sub_signed(TimeDelta::days(1))
}

fn week_last_day(start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    start.checked_add_signed(TimeDelta::days(6))
}

fn month_last_day(start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    last_day_before(add_months(start, 1))
}

fn quarter_last_day(start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    last_day_before(add_quarters(start, 1))
}

fn year_last_day(start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    last_day_before(add_years(start, 1))
}

fn decade_last_day(start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    last_day_before(add_decades(start, 1))
}

fn hour_ordinal(ts: DateTime<Utc>) -> i64 {
    ts.timestamp().div_euclid(3600)
}

fn day_ordinal(ts: DateTime<Utc>) -> i64 {
    ts.timestamp().div_euclid(86_400)
}

// 1970-01-01 was a Thursday; shift so Sunday-started weeks share an ordinal.
fn week_ordinal(ts: DateTime<Utc>) -> i64 {
    (day_ordinal(ts) + 4).div_euclid(7)
}

fn month_ordinal(ts: DateTime<Utc>) -> i64 {
    i64::from(ts.year()) * 12 + i64::from(ts.month0())
}

fn quarter_ordinal(ts: DateTime<Utc>) -> i64 {
    i64::from(ts.year()) * 4 + i64::from(ts.month0() / 3)
}

fn year_ordinal(ts: DateTime<Utc>) -> i64 {
    i64::from(ts.year())
}

fn decade_ordinal(ts: DateTime<Utc>) -> i64 {
    i64::from(ts.year()).div_euclid(10)
}
