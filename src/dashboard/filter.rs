//! Dashboard filter selections.
//!
//! Filters arrive as query parameters. Anything missing or invalid falls back
//! to a valid selection instead of failing the request: today's year and
//! month, the first week, Monday and all categories.

use serde::Deserialize;
use time::{Date, Month, Weekday};

use crate::{
    calendar::{
        DateRange, clamp_year, compute_week_date_range, parse_date, parse_month_name,
        parse_week_label, parse_weekday_name, week_count,
    },
    dashboard::aggregation::category_label,
};

/// The category selection that matches every expense.
pub const ALL_CATEGORIES: &str = "All";

/// The raw sales filter query, e.g. `?year=2024&month=May&week=Week 2&day=Friday`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesFilterQuery {
    /// The year, e.g. "2024".
    pub year: Option<String>,
    /// The English month name, e.g. "May".
    pub month: Option<String>,
    /// The week selector label, e.g. "Week 2".
    pub week: Option<String>,
    /// The English weekday name, e.g. "Friday".
    pub day: Option<String>,
}

/// A valid selection of year, month, week and day for the sales summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesFilter {
    /// The selected year.
    pub year: i32,
    /// The selected month.
    pub month: Month,
    /// The selected week of the month, starting at 1.
    pub week: u8,
    /// The selected day of the week.
    pub day: Weekday,
}

impl SalesFilter {
    /// The dates covered by the selected week.
    pub fn week_range(&self) -> DateRange {
        compute_week_date_range(self.year, self.month, self.week)
    }
}

impl SalesFilterQuery {
    /// Turn the query into a valid selection, using `today` for missing values.
    ///
    /// Weeks beyond the number of weeks in the month are clamped to the last week.
    pub fn resolve(&self, today: Date) -> SalesFilter {
        let year = self
            .year
            .as_deref()
            .and_then(|year| year.trim().parse::<i32>().ok())
            .map(clamp_year)
            .unwrap_or(today.year());
        let month = self
            .month
            .as_deref()
            .and_then(parse_month_name)
            .unwrap_or(today.month());
        let last_week = week_count(year, month);
        let week = self
            .week
            .as_deref()
            .and_then(|week| parse_week_label(week).or_else(|| week.trim().parse().ok()))
            .map_or(1, |week| week.clamp(1, u32::from(last_week)) as u8);
        let day = self
            .day
            .as_deref()
            .and_then(parse_weekday_name)
            .unwrap_or(Weekday::Monday);

        SalesFilter {
            year,
            month,
            week,
            day,
        }
    }
}

/// The raw expense filter query, e.g. `?category=Salaries&start=2024-01-01&end=2024-03-31`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseFilterQuery {
    /// A category name or "All".
    pub category: Option<String>,
    /// The first day to include, e.g. "2024-01-01".
    pub start: Option<String>,
    /// The last day to include, e.g. "2024-03-31".
    pub end: Option<String>,
}

/// A valid selection of category and dates for the expense summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// The selected category, `None` for all categories.
    pub category: Option<String>,
    /// The first day to include, unbounded if `None`.
    pub start: Option<Date>,
    /// The last day to include, unbounded if `None`.
    pub end: Option<Date>,
}

impl ExpenseFilterQuery {
    /// Turn the query into a valid selection.
    ///
    /// Unparseable dates are ignored and reversed dates are swapped.
    pub fn resolve(&self) -> ExpenseFilter {
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| {
                !category.is_empty() && !category.eq_ignore_ascii_case(ALL_CATEGORIES)
            })
            .map(str::to_owned);
        let start = self.start.as_deref().and_then(parse_date);
        let end = self.end.as_deref().and_then(parse_date);

        let (start, end) = match (start, end) {
            (Some(start), Some(end)) if end < start => (Some(end), Some(start)),
            dates => dates,
        };

        ExpenseFilter {
            category,
            start,
            end,
        }
    }
}

impl ExpenseFilter {
    /// Whether `date` is within the selected dates.
    pub fn contains_date(&self, date: Date) -> bool {
        self.start.is_none_or(|start| start <= date) && self.end.is_none_or(|end| date <= end)
    }

    /// Whether an expense with the raw category `category` is selected.
    ///
    /// Categories are compared ignoring case.
    pub fn matches_category(&self, category: Option<&str>) -> bool {
        match &self.category {
            Some(selected) => category_label(category).eq_ignore_ascii_case(selected),
            None => true,
        }
    }

    /// The label of the selected category.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(ALL_CATEGORIES)
    }
}
