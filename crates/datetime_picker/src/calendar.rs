use chrono::{Datelike, NaiveDate};

pub const GRID_COLUMNS: usize = 7;
pub const GRID_ROWS: usize = 6;

/// Weekday headers for the month grid, Sunday first.
pub fn weekday_labels() -> [&'static str; GRID_COLUMNS] {
    ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
}

/// A calendar month used to drive grid navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// Returns the month if it is in 1..=12.
    pub fn new(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u8 {
        self.month
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month), 1)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() as u8 == self.month
    }

    /// Adds or subtracts months, adjusting the year as needed.
    pub fn add_months(self, delta: i32) -> Self {
        let total = self.year * 12 + (i32::from(self.month) - 1) + delta;
        let year = total.div_euclid(12);
        let month = (total.rem_euclid(12) + 1) as u8;
        Self { year, month }
    }

    pub fn label(self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

pub fn month_name(month: u8) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

/// Lays the month out as a fixed 6x7 grid of cells, Sunday-first columns.
/// Leading and trailing cells outside the month are `None`.
pub fn month_grid(month: YearMonth) -> Vec<Option<NaiveDate>> {
    let mut cells = vec![None; GRID_COLUMNS * GRID_ROWS];
    let Some(first) = month.first_day() else {
        return cells;
    };
    let offset = first.weekday().num_days_from_sunday() as usize;
    for day in 1..=days_in_month(month.year, month.month) {
        let index = offset + usize::from(day) - 1;
        if index < cells.len() {
            cells[index] = NaiveDate::from_ymd_opt(month.year, u32::from(month.month), u32::from(day));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn leap_year_rules() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 1), 31);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn add_months_crosses_year_boundaries() {
        let dec = YearMonth::new(2024, 12).unwrap();
        let jan = dec.add_months(1);
        assert_eq!((jan.year(), jan.month()), (2025, 1));

        let back = jan.add_months(-1);
        assert_eq!((back.year(), back.month()), (2024, 12));

        let far = YearMonth::new(2024, 6).unwrap().add_months(19);
        assert_eq!((far.year(), far.month()), (2026, 1));

        let earlier = YearMonth::new(2024, 2).unwrap().add_months(-14);
        assert_eq!((earlier.year(), earlier.month()), (2022, 12));
    }

    #[test]
    fn grid_places_first_day_under_its_weekday() {
        // June 2024 starts on a Saturday.
        let grid = month_grid(YearMonth::new(2024, 6).unwrap());
        assert_eq!(grid.len(), GRID_COLUMNS * GRID_ROWS);
        assert_eq!(grid[5], None);
        assert_eq!(grid[6], Some(date(2024, 6, 1)));
        assert_eq!(grid[7], Some(date(2024, 6, 2)));
        assert_eq!(grid[6 + 29], Some(date(2024, 6, 30)));
        assert_eq!(grid[6 + 30], None);
    }

    #[test]
    fn grid_handles_sunday_start_months() {
        // September 2024 starts on a Sunday, so there is no leading blank.
        let grid = month_grid(YearMonth::new(2024, 9).unwrap());
        assert_eq!(grid[0], Some(date(2024, 9, 1)));
        assert_eq!(grid[29], Some(date(2024, 9, 30)));
    }

    #[test]
    fn month_labels() {
        assert_eq!(YearMonth::new(2024, 7).unwrap().label(), "July 2024");
        assert_eq!(month_name(2), "February");
    }

    #[test]
    fn year_month_of_date() {
        let ym = YearMonth::of(date(2024, 7, 15));
        assert_eq!((ym.year(), ym.month()), (2024, 7));
        assert!(ym.contains(date(2024, 7, 1)));
        assert!(!ym.contains(date(2024, 8, 1)));
    }
}
