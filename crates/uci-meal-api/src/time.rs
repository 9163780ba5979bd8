//! Clock arithmetic for campus-local scheduling.
//!
//! Times of day are represented as `hour * 100 + minute` on a 24 hour clock
//! (so `16:30` is `1630`). These are not minutes and do not wrap: callers
//! must not do arithmetic on them across day boundaries.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Offset,
    TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;

use crate::{meal::MealPeriod, processed::Schedule};

/// format of request dates, cache keys and document dates
pub const DATE_FORMAT: &str = "%m/%d/%Y";
/// format of the themed event table after the weekday ("March 8, 2024")
const LONG_DATE_FORMAT: &str = "%B %d, %Y";
/// upstream schedule timestamps look like `2024-03-08T15:00:00.0000000`
const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub const CAMPUS_TZ: Tz = chrono_tz::America::Los_Angeles;

const LUNCH_START: u16 = 1100;
const DINNER_START: u16 = 1630;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum TimeParseError {
    #[error("no am/pm marker in '{0}'")]
    MissingMeridiem(String),
    #[error("not a clock time: '{0}'")]
    InvalidClock(String),
    #[error("invalid timestamp '{0}': {1}")]
    Timestamp(String, chrono::ParseError),
    #[error("invalid date '{0}': {1}")]
    Date(String, chrono::ParseError),
    #[error("date '{0}' is not in the expected layout")]
    DateShape(String),
}

#[inline]
pub fn normalize_time(hour: u32, minute: u32) -> u16 {
    (hour * 100 + minute) as u16
}

/// Parses `H[:MM] am|pm` (case-insensitive) into `hour * 100 + minute`.
///
/// `12:xx am` maps to `0:xx`, `12:xx pm` stays at `12:xx`, and every other
/// pm time gets 12 hours added.
pub fn time_from_str(text: &str) -> Result<u16, TimeParseError> {
    let lower = text.trim().to_lowercase();
    let (clock, pm) = if let Some(pos) = lower.find("am") {
        (&lower[..pos], false)
    } else if let Some(pos) = lower.find("pm") {
        (&lower[..pos], true)
    } else {
        return Err(TimeParseError::MissingMeridiem(text.to_owned()));
    };

    let invalid = || TimeParseError::InvalidClock(text.to_owned());
    let clock = clock.trim();
    let (hour, minute): (u16, u16) = match clock.split_once(':') {
        Some((h, m)) => (
            h.trim().parse().map_err(|_| invalid())?,
            m.trim().parse().map_err(|_| invalid())?,
        ),
        None => (clock.parse().map_err(|_| invalid())?, 0),
    };
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(invalid());
    }

    let mut value = hour * 100 + minute;
    if (1200..1300).contains(&value) {
        if !pm {
            value -= 1200;
        } else {
            return Ok(value);
        }
    }
    if pm {
        value += 1200;
    }
    Ok(value)
}

/// Converts an upstream UTC timestamp into local `hour * 100 + minute`
/// using a fixed offset.
pub fn utc_to_time(timestamp: &str, offset_seconds: i32) -> Result<u16, TimeParseError> {
    let utc = parse_utc(timestamp)?;
    let local = utc + Duration::seconds(offset_seconds as i64);
    Ok(normalize_time(local.hour(), local.minute()))
}

fn parse_utc(timestamp: &str) -> Result<NaiveDateTime, TimeParseError> {
    NaiveDateTime::parse_from_str(timestamp.trim(), UTC_FORMAT)
        .map_err(|e| TimeParseError::Timestamp(timestamp.to_owned(), e))
}

/// Parses the long form `Weekday, Month Day, Year` (English names).
///
/// The weekday has to be a weekday name but is not checked against the date.
pub fn parse_long_date(text: &str) -> Result<NaiveDate, TimeParseError> {
    let shape = || TimeParseError::DateShape(text.to_owned());
    let (weekday, rest) = text.trim().split_once(", ").ok_or_else(shape)?;
    weekday.parse::<Weekday>().map_err(|_| shape())?;

    NaiveDate::parse_from_str(rest, LONG_DATE_FORMAT)
        .map_err(|e| TimeParseError::Date(text.to_owned(), e))
}

/// Parses a request date, `MM/DD/YYYY` with optional leading zeros on
/// month and day. The year is always four digits.
pub fn parse_date(text: &str) -> Result<NaiveDate, TimeParseError> {
    let trimmed = text.trim();
    let digits = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };

    match trimmed.split('/').collect::<Vec<_>>()[..] {
        [month, day, year] if digits(month, 1, 2) && digits(day, 1, 2) && digits(year, 4, 4) => {},
        _ => return Err(TimeParseError::DateShape(text.to_owned())),
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|e| TimeParseError::Date(text.to_owned(), e))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Meal for a local time of day, without looking at the actual schedule.
pub fn current_meal(time: u16, weekday: Weekday) -> MealPeriod {
    let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
    if time < LUNCH_START {
        MealPeriod::Breakfast
    } else if time >= DINNER_START {
        MealPeriod::Dinner
    } else if weekend {
        MealPeriod::Brunch
    } else {
        MealPeriod::Lunch
    }
}

/// Display name of `meal` for a day, swapping lunch and brunch when the
/// day's schedule only has the other one.
pub fn meal_name(schedule: &Schedule, meal: MealPeriod) -> &'static str {
    match meal {
        MealPeriod::Brunch if !schedule.contains("brunch") => "lunch",
        MealPeriod::Lunch if !schedule.contains("lunch") => "brunch",
        _ => meal.name(),
    }
}

/// Source of campus-local time.
///
/// The utc offset is looked up per instant, so dates and times stay correct
/// across daylight saving transitions.
#[derive(Debug, Clone)]
pub struct CampusClock {
    tz: Tz,
    frozen: Option<DateTime<Utc>>,
}

impl Default for CampusClock {
    fn default() -> Self { Self::new(CAMPUS_TZ) }
}

impl CampusClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz, frozen: None }
    }

    /// clock that always reports `at`
    pub fn frozen(tz: Tz, at: DateTime<Utc>) -> Self {
        Self { tz, frozen: Some(at) }
    }

    pub fn timezone(&self) -> Tz { self.tz }

    pub fn now_utc(&self) -> DateTime<Utc> {
        self.frozen.unwrap_or_else(Utc::now)
    }

    pub fn offset_seconds_at(&self, at: &NaiveDateTime) -> i32 {
        self.tz.offset_from_utc_datetime(at).fix().local_minus_utc()
    }

    pub fn now_local(&self) -> NaiveDateTime {
        self.now_utc().with_timezone(&self.tz).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.now_local().date()
    }

    pub fn today_string(&self) -> String {
        format_date(self.today())
    }

    pub fn current_meal(&self) -> MealPeriod {
        let now = self.now_local();
        current_meal(normalize_time(now.hour(), now.minute()), now.weekday())
    }

    /// [`utc_to_time`] with the campus offset in effect at `timestamp`.
    pub fn utc_to_local_time(&self, timestamp: &str) -> Result<u16, TimeParseError> {
        let utc = parse_utc(timestamp)?;
        utc_to_time(timestamp, self.offset_seconds_at(&utc))
    }
}
