use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use thiserror::Error;

/// Half of the 12-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPeriod {
    Am,
    Pm,
}

impl DayPeriod {
    pub fn label(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("time must look like \"hh:mm AM\" or \"hh:mm PM\", got {0:?}")]
    Malformed(String),
    #[error("hour {0} is outside 1..=12")]
    HourOutOfRange(u8),
    #[error("minute {0} is outside 0..=59")]
    MinuteOutOfRange(u8),
    #[error("period {0:?} is neither AM nor PM")]
    UnknownPeriod(String),
}

/// A wall-clock time of day on the 12-hour clock.
///
/// The textual form is `"hh:mm AM|PM"` and round-trips losslessly through
/// the 24-hour pair: 12 AM maps to hour 0, 12 PM stays hour 12, and every
/// other PM hour gains 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOfDay {
    hour12: u8,
    minute: u8,
    period: DayPeriod,
}

impl TimeOfDay {
    /// Builds a time of day; `hour12` must be in 1..=12 and `minute` in 0..=59.
    pub fn new(hour12: u8, minute: u8, period: DayPeriod) -> Result<Self, TimeParseError> {
        if !(1..=12).contains(&hour12) {
            return Err(TimeParseError::HourOutOfRange(hour12));
        }
        if minute > 59 {
            return Err(TimeParseError::MinuteOutOfRange(minute));
        }
        Ok(Self {
            hour12,
            minute,
            period,
        })
    }

    /// Converts from a 24-hour `(hour, minute)` pair; values out of range wrap
    /// into bounds via modulo so the result is always valid.
    pub fn from_h24(hour: u8, minute: u8) -> Self {
        let hour = hour % 24;
        let minute = minute % 60;
        let period = if hour >= 12 {
            DayPeriod::Pm
        } else {
            DayPeriod::Am
        };
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        Self {
            hour12,
            minute,
            period,
        }
    }

    /// Converts to the 24-hour `(hour, minute)` pair.
    pub fn to_h24(self) -> (u8, u8) {
        let hour = match (self.period, self.hour12) {
            (DayPeriod::Am, 12) => 0,
            (DayPeriod::Am, h) => h,
            (DayPeriod::Pm, 12) => 12,
            (DayPeriod::Pm, h) => h + 12,
        };
        (hour, self.minute)
    }

    pub fn to_naive(self) -> NaiveTime {
        let (hour, minute) = self.to_h24();
        NaiveTime::from_hms_opt(u32::from(hour), u32::from(minute), 0).unwrap_or(NaiveTime::MIN)
    }

    pub fn from_naive(time: NaiveTime) -> Self {
        Self::from_h24(time.hour() as u8, time.minute() as u8)
    }

    pub fn hour12(self) -> u8 {
        self.hour12
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn period(self) -> DayPeriod {
        self.period
    }

    pub fn with_period(self, period: DayPeriod) -> Self {
        Self { period, ..self }
    }

    /// Steps the hour forward on the 12-hour dial, wrapping 12 back to 1.
    pub fn next_hour(self) -> Self {
        let hour12 = if self.hour12 == 12 { 1 } else { self.hour12 + 1 };
        Self { hour12, ..self }
    }

    pub fn previous_hour(self) -> Self {
        let hour12 = if self.hour12 == 1 { 12 } else { self.hour12 - 1 };
        Self { hour12, ..self }
    }

    pub fn next_minute(self, step: u8) -> Self {
        let step = step.clamp(1, 59);
        Self {
            minute: (self.minute + step) % 60,
            ..self
        }
    }

    pub fn previous_minute(self, step: u8) -> Self {
        let step = step.clamp(1, 59);
        Self {
            minute: (self.minute + 60 - step) % 60,
            ..self
        }
    }
}

/// Selections start at noon, so a freshly opened dialog never blocks on time.
impl Default for TimeOfDay {
    fn default() -> Self {
        Self {
            hour12: 12,
            minute: 0,
            period: DayPeriod::Pm,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} {}",
            self.hour12,
            self.minute,
            self.period.label()
        )
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeParseError::Malformed(input.to_string());

        let (clock, period) = input.trim().split_once(' ').ok_or_else(malformed)?;
        let (hour_text, minute_text) = clock.split_once(':').ok_or_else(malformed)?;

        let hour12: u8 = hour_text.parse().map_err(|_| malformed())?;
        let minute: u8 = minute_text.parse().map_err(|_| malformed())?;
        let period = match period.trim() {
            "AM" | "am" => DayPeriod::Am,
            "PM" | "pm" => DayPeriod::Pm,
            other => return Err(TimeParseError::UnknownPeriod(other.to_string())),
        };

        Self::new(hour12, minute, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_noon() {
        let time = TimeOfDay::default();
        assert_eq!(time.to_string(), "12:00 PM");
        assert_eq!(time.to_h24(), (12, 0));
    }

    #[test]
    fn twelve_am_is_hour_zero() {
        let time = TimeOfDay::new(12, 0, DayPeriod::Am).unwrap();
        assert_eq!(time.to_h24(), (0, 0));
    }

    #[test]
    fn twelve_pm_is_hour_twelve() {
        let time = TimeOfDay::new(12, 0, DayPeriod::Pm).unwrap();
        assert_eq!(time.to_h24(), (12, 0));
    }

    #[test]
    fn one_pm_is_hour_thirteen() {
        let time = TimeOfDay::new(1, 0, DayPeriod::Pm).unwrap();
        assert_eq!(time.to_h24(), (13, 0));
    }

    #[test]
    fn every_clock_position_round_trips() {
        for hour12 in 1..=12u8 {
            for period in [DayPeriod::Am, DayPeriod::Pm] {
                let time = TimeOfDay::new(hour12, 30, period).unwrap();
                let (h24, minute) = time.to_h24();
                let back = TimeOfDay::from_h24(h24, minute);
                assert_eq!(back, time, "hour {hour12} {period:?} did not round-trip");
            }
        }
    }

    #[test]
    fn parse_accepts_well_formed_strings() {
        let time: TimeOfDay = "02:30 PM".parse().unwrap();
        assert_eq!(time.hour12(), 2);
        assert_eq!(time.minute(), 30);
        assert_eq!(time.period(), DayPeriod::Pm);
        assert_eq!(time.to_h24(), (14, 30));
    }

    #[test]
    fn parse_and_display_round_trip() {
        for text in ["12:00 AM", "12:00 PM", "01:05 AM", "11:59 PM", "06:45 AM"] {
            let time: TimeOfDay = text.parse().unwrap();
            assert_eq!(time.to_string(), text);
        }
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(matches!(
            "1430".parse::<TimeOfDay>(),
            Err(TimeParseError::Malformed(_))
        ));
        assert!(matches!(
            "02-30 PM".parse::<TimeOfDay>(),
            Err(TimeParseError::Malformed(_))
        ));
        assert!(matches!(
            "02:30 XM".parse::<TimeOfDay>(),
            Err(TimeParseError::UnknownPeriod(_))
        ));
        assert!(matches!(
            "13:30 PM".parse::<TimeOfDay>(),
            Err(TimeParseError::HourOutOfRange(13))
        ));
        assert!(matches!(
            "02:61 PM".parse::<TimeOfDay>(),
            Err(TimeParseError::MinuteOutOfRange(61))
        ));
    }

    #[test]
    fn hour_steppers_wrap_the_dial() {
        let noon = TimeOfDay::default();
        assert_eq!(noon.next_hour().hour12(), 1);
        assert_eq!(noon.previous_hour().hour12(), 11);

        let one = TimeOfDay::new(1, 0, DayPeriod::Am).unwrap();
        assert_eq!(one.previous_hour().hour12(), 12);
    }

    #[test]
    fn minute_steppers_wrap_the_hour() {
        let time = TimeOfDay::new(3, 55, DayPeriod::Pm).unwrap();
        assert_eq!(time.next_minute(10).minute(), 5);
        assert_eq!(time.previous_minute(10).minute(), 45);

        let zero = TimeOfDay::new(3, 0, DayPeriod::Pm).unwrap();
        assert_eq!(zero.previous_minute(5).minute(), 55);
    }

    #[test]
    fn from_h24_wraps_out_of_range_values() {
        let time = TimeOfDay::from_h24(24, 60);
        assert_eq!(time.to_h24(), (0, 0));
    }

    #[test]
    fn naive_time_round_trip() {
        let time = TimeOfDay::new(2, 30, DayPeriod::Pm).unwrap();
        let naive = time.to_naive();
        assert_eq!(naive.hour(), 14);
        assert_eq!(naive.minute(), 30);
        assert_eq!(TimeOfDay::from_naive(naive), time);
    }
}
