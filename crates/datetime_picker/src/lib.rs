//! Date/time selection for booking flows.
//!
//! The crate is built around [`DateTimeSelector`], a two-stage picker: while
//! its dialog is open the user edits a pending date and time of day; the
//! committed value only changes when the user confirms. Cancelling discards
//! the pending edit without any observable effect.
//!
//! ```
//! use chrono::NaiveDate;
//! use datetime_picker::{DateTimeSelector, SelectorConfig, TimeOfDay};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let mut selector = DateTimeSelector::new(SelectorConfig::default());
//!
//! selector.open(today);
//! selector.select_date(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), today);
//! selector.set_time("02:30 PM".parse::<TimeOfDay>().unwrap());
//! let stamp = selector.commit().unwrap();
//! assert_eq!(stamp.to_string(), "2024-07-01 14:30:00");
//! ```

mod calendar;
mod selector;
mod time;

pub use calendar::{
    days_in_month, is_leap_year, month_grid, month_name, weekday_labels, YearMonth, GRID_COLUMNS,
    GRID_ROWS,
};
pub use selector::{DateTimeSelector, PendingSelection, Selection, SelectorConfig};
pub use time::{DayPeriod, TimeOfDay, TimeParseError};
