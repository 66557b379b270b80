//! Month calendar for the home page.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub const WEEKDAY_NAMES: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// One month laid out in Monday-first weeks. Days outside the month are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub today: Option<u32>,
    pub weeks: Vec<[Option<u32>; 7]>,
}

impl MonthGrid {
    /// Grid for the month containing `today`, with today marked.
    #[must_use]
    pub fn for_date(today: NaiveDate) -> Self {
        let mut grid = Self::for_month(today.year(), today.month()).unwrap_or_else(|| Self {
            year: today.year(),
            month: today.month(),
            month_name: today.format("%B").to_string(),
            today: None,
            weeks: Vec::new(),
        });
        grid.today = Some(today.day());
        grid
    }

    /// Grid for a month, `None` for an invalid year/month.
    #[must_use]
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let days = days_in_month(year, month)?;
        let offset = first.weekday().num_days_from_monday();

        let mut weeks = Vec::new();
        let mut week = [None; 7];
        let mut slot = offset;
        for day in 1..=days {
            if let Some(cell) = week.get_mut(slot as usize) {
                *cell = Some(day);
            }
            slot += 1;
            if slot == 7 {
                weeks.push(week);
                week = [None; 7];
                slot = 0;
            }
        }
        if slot > 0 {
            weeks.push(week);
        }

        Some(Self {
            year,
            month,
            month_name: first.format("%B").to_string(),
            today: None,
            weeks,
        })
    }

    #[must_use]
    pub fn is_today(&self, day: &u32) -> bool {
        self.today == Some(*day)
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    next.pred_opt().map(|d| d.day())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_october_2026_starts_on_thursday() {
        let grid = MonthGrid::for_month(2026, 10).unwrap();
        assert_eq!(grid.month_name, "October");
        assert_eq!(grid.weeks.len(), 5);
        assert_eq!(grid.weeks[0], [None, None, None, Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(grid.weeks[4], [Some(26), Some(27), Some(28), Some(29), Some(30), Some(31), None]);
    }

    #[test]
    fn test_february_leap_year() {
        let grid = MonthGrid::for_month(2028, 2).unwrap();
        let days: Vec<u32> = grid.weeks.iter().flatten().flatten().copied().collect();
        assert_eq!(days.len(), 29);
    }

    #[test]
    fn test_today_marked() {
        let grid = MonthGrid::for_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert!(grid.is_today(&19));
        assert!(!grid.is_today(&18));
    }

    #[test]
    fn test_invalid_month() {
        assert!(MonthGrid::for_month(2026, 13).is_none());
    }
}
