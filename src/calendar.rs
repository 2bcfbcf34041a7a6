use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of cells in a month grid: six weeks of seven days
pub const GRID_CELLS: usize = 42;

// Keeps every first-of-month representable by chrono
const MIN_YEAR: i32 = -262_000;
const MAX_YEAR: i32 = 262_000;

/// A calendar month. Construction normalizes out-of-range month indexes into
/// neighbouring years, so `YearMonth::new(2024, 12)` is January 2025.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month0: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid month '{0}' (expected YYYY-MM)")]
pub struct YearMonthParseError(pub String);

impl YearMonth {
    /// `month0` is zero-based: 0 = January. Months past the supported range
    /// saturate at its first or last month.
    pub fn new(year: i32, month0: i32) -> Self {
        let year = year.saturating_add(month0.div_euclid(12));
        if year > MAX_YEAR {
            return Self { year: MAX_YEAR, month0: 11 };
        }
        if year < MIN_YEAR {
            return Self { year: MIN_YEAR, month0: 0 };
        }
        Self {
            year,
            month0: month0.rem_euclid(12) as u32,
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn current() -> Self {
        Self::from_date(crate::utils::today())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// One-based month number
    pub fn month(&self) -> u32 {
        self.month0 + 1
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month(), 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn prev(&self) -> Self {
        Self::new(self.year, self.month0 as i32 - 1)
    }

    pub fn next(&self) -> Self {
        Self::new(self.year, self.month0 as i32 + 1)
    }

    pub fn days_in_month(&self) -> u32 {
        // Computed directly so the last supported month still has an end
        let (year, month) = if self.month0 == 11 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next_first| {
                u32::try_from(next_first.signed_duration_since(self.first_day()).num_days()).ok()
            })
            .unwrap_or(0)
    }

    /// Days 1..=days_in_month, without grid padding
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first_day()
            .iter_days()
            .take(self.days_in_month() as usize)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month0
    }

    /// Monday-first grid of 42 consecutive dates covering the month
    pub fn grid(&self) -> Vec<NaiveDate> {
        self.grid_starting(Weekday::Mon)
    }

    /// Grid of 42 consecutive dates whose first cell falls on `week_start`
    /// on or before the first of the month.
    pub fn grid_starting(&self, week_start: Weekday) -> Vec<NaiveDate> {
        let first = self.first_day();
        let back = (first.weekday().num_days_from_monday() + 7
            - week_start.num_days_from_monday())
            % 7;
        let start = first - TimeDelta::days(back as i64);
        start.iter_days().take(GRID_CELLS).collect()
    }

    /// Header text such as "January 2024"
    pub fn title(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month())
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || YearMonthParseError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(err());
        }
        Ok(Self::new(year, month as i32 - 1))
    }
}

/// 42-cell Monday-first grid for a year and zero-based month index
pub fn month_grid(year: i32, month0: i32) -> Vec<NaiveDate> {
    YearMonth::new(year, month0).grid()
}

/// Map the stored start-of-week setting (0 = Sunday .. 6 = Saturday) to a weekday.
/// Unknown values fall back to Monday.
pub fn week_start_from_setting(start_of_week: u8) -> Weekday {
    match start_of_week {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => Weekday::Mon,
    }
}

/// Weekday column headers in grid order
pub fn weekday_headers(week_start: Weekday) -> Vec<&'static str> {
    let mut day = week_start;
    let mut headers = Vec::with_capacity(7);
    for _ in 0..7 {
        headers.push(match day {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        });
        day = day.succ();
    }
    headers
}
