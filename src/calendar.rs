//! Calendar helpers for the dashboard filters.
//!
//! Month and weekday names are always in English so that bucket keys do not
//! depend on the locale of the server or the client. Weeks start on Monday.

use serde::Serialize;
use time::{
    Date, Duration, Month, Time, Weekday, format_description::BorrowedFormatItem,
    macros::format_description,
};

/// The earliest year the filters will accept.
pub const MIN_YEAR: i32 = 1;
/// The latest year the filters will accept.
pub const MAX_YEAR: i32 = 9999;

/// The months of the year in calendar order.
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The days of the week, Monday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

/// The number of weeks the week selector shows for February.
const FEBRUARY_SELECTOR_WEEKS: usize = 5;

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// The first day in the range.
    pub start: Date,
    /// The last day in the range.
    pub end: Date,
}

impl DateRange {
    /// The range covering a single day.
    pub fn day(date: Date) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The range covering every day of `month` in `year`, with `year` clamped
    /// into [MIN_YEAR]..=[MAX_YEAR].
    pub fn month(year: i32, month: Month) -> Self {
        Self::checked_month(clamp_year(year), month).expect("clamped year is supported")
    }

    /// The range covering every day of `year`, with `year` clamped into
    /// [MIN_YEAR]..=[MAX_YEAR].
    pub fn year(year: i32) -> Self {
        Self::checked_year(clamp_year(year)).expect("clamped year is supported")
    }

    /// The range covering every day of `month` in `year`, or `None` if `year`
    /// is outside [MIN_YEAR]..=[MAX_YEAR].
    pub fn checked_month(year: i32, month: Month) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }

        Some(Self {
            start: Date::from_calendar_date(year, month, 1).ok()?,
            end: Date::from_calendar_date(year, month, last_day_of_month(year, month)).ok()?,
        })
    }

    /// The range covering every day of `year`, or `None` if `year` is outside
    /// [MIN_YEAR]..=[MAX_YEAR].
    pub fn checked_year(year: i32) -> Option<Self> {
        Some(Self {
            start: Self::checked_month(year, Month::January)?.start,
            end: Self::checked_month(year, Month::December)?.end,
        })
    }

    /// Whether `date` lies within the range, inclusive of both ends.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// The number of days in the range, zero if `end` is before `start`.
    pub fn day_count(&self) -> i64 {
        ((self.end - self.start).whole_days() + 1).max(0)
    }
}

/// A group of consecutive days within a month, as shown in the week selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    /// The first day of the month in the group.
    pub start_day: u8,
    /// The last day of the month in the group.
    pub end_day: u8,
    /// Whether this group only exists to pad February out to five weeks.
    ///
    /// A padding group repeats the last day of the month and must not be
    /// counted when checking that the groups cover the month.
    pub padding: bool,
}

impl WeekRange {
    /// The number of days in the group.
    pub fn day_count(&self) -> u8 {
        self.end_day - self.start_day + 1
    }
}

/// Clamp `year` into the range of years the filters support.
pub fn clamp_year(year: i32) -> i32 {
    year.clamp(MIN_YEAR, MAX_YEAR)
}

/// The English name of `month`, e.g. "January".
pub fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    }
}

/// The English name of `weekday`, e.g. "Monday".
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
        Weekday::Sunday => "Sunday",
    }
}

/// Parse an English month name, ignoring case and surrounding whitespace.
pub fn parse_month_name(name: &str) -> Option<Month> {
    let name = name.trim();

    MONTHS
        .into_iter()
        .find(|month| month_name(*month).eq_ignore_ascii_case(name))
}

/// Parse an English weekday name, ignoring case and surrounding whitespace.
pub fn parse_weekday_name(name: &str) -> Option<Weekday> {
    let name = name.trim();

    WEEKDAYS
        .into_iter()
        .find(|weekday| weekday_name(*weekday).eq_ignore_ascii_case(name))
}

/// The label of the week selector entry for `week_index`, e.g. "Week 1".
pub fn week_label(week_index: u8) -> String {
    format!("Week {week_index}")
}

/// Parse a week selector label such as "Week 2" into its index.
///
/// The index is not checked against any month, see [week_count].
pub fn parse_week_label(label: &str) -> Option<u32> {
    let mut parts = label.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(word), Some(number), None) if word.eq_ignore_ascii_case("week") => {
            number.parse().ok()
        }
        _ => None,
    }
}

/// The format dates are stored in, e.g. "2024-05-01".
pub const DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month repr:numerical padding:zero]-[day padding:zero]");

/// The format times of day are stored in, e.g. "14:05:00".
pub const TIME_FORMAT: &[BorrowedFormatItem] = format_description!("[hour]:[minute]:[second]");

const SHORT_TIME_FORMAT: &[BorrowedFormatItem] = format_description!("[hour]:[minute]");

/// Parse a stored date, ignoring surrounding whitespace.
pub fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), DATE_FORMAT).ok()
}

/// Parse a stored time of day in either "HH:MM:SS" or "HH:MM" form.
pub fn parse_time(text: &str) -> Option<Time> {
    let text = text.trim();

    Time::parse(text, TIME_FORMAT)
        .or_else(|_| Time::parse(text, SHORT_TIME_FORMAT))
        .ok()
}

/// The number of days in `month` of `year`.
pub fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Split the days of `month` into consecutive groups of seven days.
///
/// The final group holds the remaining days and may be shorter than seven
/// days. February is padded to five groups with a trailing group holding only
/// the last day of the month, flagged with [WeekRange::padding], so the week
/// selector always offers five weeks for February.
pub fn compute_week_ranges(year: i32, month: Month) -> Vec<WeekRange> {
    let days_in_month = last_day_of_month(year, month);

    let mut weeks: Vec<WeekRange> = (1..=days_in_month)
        .step_by(7)
        .map(|start_day| WeekRange {
            start_day,
            end_day: (start_day + 6).min(days_in_month),
            padding: false,
        })
        .collect();

    if month == Month::February && weeks.len() < FEBRUARY_SELECTOR_WEEKS {
        weeks.push(WeekRange {
            start_day: days_in_month,
            end_day: days_in_month,
            padding: true,
        });
    }

    weeks
}

/// The number of Monday-to-Sunday weeks that overlap `month`.
pub fn monday_week_count(year: i32, month: Month) -> u8 {
    let month_range = DateRange::month(year, month);
    let offset = month_range.start.weekday().number_days_from_monday();
    let days_in_month = last_day_of_month(year, month);

    (offset + days_in_month).div_ceil(7)
}

/// The number of weeks the week selector offers for `month`.
///
/// This is the larger of the number of groups from [compute_week_ranges] and
/// the number of Monday-anchored weeks, so every day of the month can be
/// reached through [compute_week_date_range].
pub fn week_count(year: i32, month: Month) -> u8 {
    let selector_weeks = compute_week_ranges(year, month).len() as u8;

    selector_weeks.max(monday_week_count(year, month))
}

/// The dates covered by week `week_index` (starting at 1) of `month`.
///
/// Week 1 starts on the Monday on or before the first of the month and each
/// following week starts seven days after the previous one. The start and end
/// are clamped independently into the month, so the first and last weeks may
/// be shorter than seven days. An index of zero is treated as week 1.
pub fn compute_week_date_range(year: i32, month: Month, week_index: u8) -> DateRange {
    let month_range = DateRange::month(year, month);
    let offset = month_range.start.weekday().number_days_from_monday() as i64;
    let weeks_after_first = week_index.max(1) as i64 - 1;

    // Checked arithmetic keeps the last week of year 9999 from overflowing.
    let start = (month_range.start - Duration::days(offset))
        .checked_add(Duration::weeks(weeks_after_first))
        .unwrap_or(month_range.end);
    let end = start
        .checked_add(Duration::days(6))
        .unwrap_or(month_range.end);

    DateRange {
        start: start.clamp(month_range.start, month_range.end),
        end: end.clamp(month_range.start, month_range.end),
    }
}
