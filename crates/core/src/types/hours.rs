//! Opening hours and availability evaluation.
//!
//! Vendors declare weekly opening windows in half-hour slots on a 12-hour
//! clock. Availability for a probe instant is one of three states: open,
//! closed, or undetermined (no usable windows for that day at all).
//!
//! Evaluation is deterministic: windows are considered in ascending
//! `from` order and the first open match wins. Boundary instants exactly
//! equal to a window edge are not open.

use core::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Minutes in a day.
const DAY_MINUTES: u16 = 24 * 60;

/// Errors that can occur when parsing a [`TimeSlot`] or [`Weekday`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum TimeSlotError {
    /// The input does not look like `HH:MM AM`.
    #[error("time slot must look like \"09:00 AM\", got {0:?}")]
    Malformed(String),
    /// The hour is outside 1-12.
    #[error("hour must be between 1 and 12, got {0}")]
    HourOutOfRange(u8),
    /// The minute is not on a half-hour boundary.
    #[error("minute must be 00 or 30, got {0:02}")]
    OffBoundary(u8),
}

/// A day of the week, numbered 1 = Monday through 7 = Sunday (ISO 8601).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Weekday {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl Weekday {
    /// Decode a weekday from its stored smallint value (1-7).
    #[must_use]
    pub const fn from_number(n: i16) -> Option<Self> {
        match n {
            1 => Some(Self::Monday),
            2 => Some(Self::Tuesday),
            3 => Some(Self::Wednesday),
            4 => Some(Self::Thursday),
            5 => Some(Self::Friday),
            6 => Some(Self::Saturday),
            7 => Some(Self::Sunday),
            _ => None,
        }
    }

    /// The stored smallint value (1-7, Monday first).
    #[must_use]
    pub const fn as_number(self) -> i16 {
        self as i16
    }

    /// The weekday of a calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        // number_from_monday is 1-7, which always decodes
        Self::from_number(date.weekday().number_from_monday() as i16)
            .unwrap_or(Self::Monday)
    }

    /// Human-readable day name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the 48 half-hour boundaries of a day.
///
/// The canonical text form is the 12-hour clock with AM/PM, zero-padded:
/// `"12:00 AM"`, `"12:30 AM"`, ... `"11:30 PM"`. That form is what gets
/// stored, displayed, and compared against in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot(u16);

impl TimeSlot {
    /// Number of distinct slots in a day.
    pub const SLOTS_PER_DAY: usize = 48;

    /// Parse a slot from its 12-hour text form, e.g. `"09:00 AM"`.
    ///
    /// The meridiem is case-insensitive; the minute must be `00` or `30`.
    ///
    /// # Errors
    ///
    /// Returns a [`TimeSlotError`] describing what was wrong with the input.
    pub fn parse(s: &str) -> Result<Self, TimeSlotError> {
        let malformed = || TimeSlotError::Malformed(s.to_owned());

        let (clock, meridiem) = s.trim().split_once(' ').ok_or_else(malformed)?;
        let (hour_s, minute_s) = clock.split_once(':').ok_or_else(malformed)?;

        let hour: u8 = hour_s.parse().map_err(|_| malformed())?;
        let minute: u8 = minute_s.parse().map_err(|_| malformed())?;

        let pm = match meridiem.to_ascii_uppercase().as_str() {
            "AM" => false,
            "PM" => true,
            _ => return Err(malformed()),
        };

        if hour < 1 || hour > 12 {
            return Err(TimeSlotError::HourOutOfRange(hour));
        }

        if minute != 0 && minute != 30 {
            return Err(TimeSlotError::OffBoundary(minute));
        }

        // 12 AM is midnight, 12 PM is noon
        let hour24 = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };

        Ok(Self(u16::from(hour24) * 60 + u16::from(minute)))
    }

    /// Build a slot straight from a 24-hour clock position.
    ///
    /// Returns `None` when the position is not one of the 48 half-hour
    /// boundaries.
    #[must_use]
    pub const fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if hour >= 24 || (minute != 0 && minute != 30) {
            return None;
        }
        Some(Self(hour as u16 * 60 + minute as u16))
    }

    /// Minutes since midnight (0, 30, 60, ... 1410).
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// The slot as a time of day.
    #[must_use]
    pub fn time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.0 / 60), u32::from(self.0 % 60), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// All 48 slots of a day in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..DAY_MINUTES).step_by(30).map(Self)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour24 = self.0 / 60;
        let minute = self.0 % 60;
        let (hour12, meridiem) = match hour24 {
            0 => (12, "AM"),
            1..=11 => (hour24, "AM"),
            12 => (12, "PM"),
            _ => (hour24 - 12, "PM"),
        };
        write!(f, "{hour12:02}:{minute:02} {meridiem}")
    }
}

impl std::str::FromStr for TimeSlot {
    type Err = TimeSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// One opening window of a vendor's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningWindow {
    /// Opening boundary.
    pub from: TimeSlot,
    /// Closing boundary.
    pub to: TimeSlot,
    /// A window marked closed contributes nothing to availability.
    pub closed: bool,
}

/// The result of an availability probe.
///
/// `Undetermined` is distinct from `Closed`: it means the vendor has no
/// usable windows for the probe day at all, so nothing can be said either
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Open,
    Closed,
    Undetermined,
}

/// Evaluate availability at a time of day against one day's windows.
///
/// Windows are considered in ascending `from` order; the first non-closed
/// window strictly containing the probe wins. If no window contains it but
/// at least one non-closed window exists, the vendor is closed. With no
/// usable windows the result is undetermined.
///
/// Boundary probes exactly at `from` or `to` are not open.
#[must_use]
pub fn evaluate(windows: &[OpeningWindow], at: NaiveTime) -> Availability {
    let mut candidates: Vec<&OpeningWindow> =
        windows.iter().filter(|w| !w.closed).collect();

    if candidates.is_empty() {
        return Availability::Undetermined;
    }

    candidates.sort_by_key(|w| w.from);

    for window in candidates {
        if at > window.from.time() && at < window.to.time() {
            return Availability::Open;
        }
    }

    Availability::Closed
}

// SQLx support (with postgres feature): weekdays are SMALLINT, slots TEXT.

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Weekday {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i16 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Weekday {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let n = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Self::from_number(n).ok_or_else(|| format!("weekday out of range: {n}").into())
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Weekday {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_number(), buf)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for TimeSlot {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TimeSlot {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for TimeSlot {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn slot(s: &str) -> TimeSlot {
        TimeSlot::parse(s).unwrap()
    }

    fn window(from: &str, to: &str) -> OpeningWindow {
        OpeningWindow {
            from: slot(from),
            to: slot(to),
            closed: false,
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_slot_parse_and_display_roundtrip() {
        for s in TimeSlot::all() {
            assert_eq!(TimeSlot::parse(&s.to_string()).unwrap(), s);
        }
    }

    #[test]
    fn test_slot_count() {
        assert_eq!(TimeSlot::all().count(), TimeSlot::SLOTS_PER_DAY);
    }

    #[test]
    fn test_slot_midnight_and_noon() {
        assert_eq!(slot("12:00 AM").minutes(), 0);
        assert_eq!(slot("12:00 PM").minutes(), 720);
        assert_eq!(slot("12:30 AM").minutes(), 30);
        assert_eq!(TimeSlot::from_hm(0, 0).unwrap().to_string(), "12:00 AM");
        assert_eq!(TimeSlot::from_hm(12, 0).unwrap().to_string(), "12:00 PM");
        assert_eq!(TimeSlot::from_hm(17, 0).unwrap().to_string(), "05:00 PM");
    }

    #[test]
    fn test_slot_parse_rejections() {
        assert!(matches!(
            TimeSlot::parse("09:15 AM"),
            Err(TimeSlotError::OffBoundary(15))
        ));
        assert!(matches!(
            TimeSlot::parse("13:00 PM"),
            Err(TimeSlotError::HourOutOfRange(13))
        ));
        assert!(matches!(
            TimeSlot::parse("0:00 AM"),
            Err(TimeSlotError::HourOutOfRange(0))
        ));
        assert!(matches!(
            TimeSlot::parse("09:00"),
            Err(TimeSlotError::Malformed(_))
        ));
        assert!(matches!(
            TimeSlot::parse("soon"),
            Err(TimeSlotError::Malformed(_))
        ));
    }

    #[test]
    fn test_slot_parse_case_insensitive_meridiem() {
        assert_eq!(slot("09:00 am"), slot("09:00 AM"));
        assert_eq!(slot("05:30 pm"), slot("05:30 PM"));
    }

    #[test]
    fn test_weekday_from_date() {
        // 2024-01-01 was a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(Weekday::from_date(monday), Weekday::Monday);
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(Weekday::from_date(sunday), Weekday::Sunday);
    }

    #[test]
    fn test_no_windows_is_undetermined() {
        assert_eq!(evaluate(&[], at(12, 0, 0)), Availability::Undetermined);
    }

    #[test]
    fn test_all_closed_is_undetermined() {
        let windows = [OpeningWindow {
            from: slot("09:00 AM"),
            to: slot("05:00 PM"),
            closed: true,
        }];
        assert_eq!(
            evaluate(&windows, at(12, 0, 0)),
            Availability::Undetermined
        );
    }

    #[test]
    fn test_nine_to_five_probes() {
        let windows = [window("09:00 AM", "05:00 PM")];

        // Boundaries are strict: exactly 09:00:00 and 17:00:00 are not open
        assert_eq!(evaluate(&windows, at(9, 0, 0)), Availability::Closed);
        assert_eq!(evaluate(&windows, at(17, 0, 0)), Availability::Closed);

        assert_eq!(evaluate(&windows, at(12, 0, 0)), Availability::Open);
        assert_eq!(evaluate(&windows, at(9, 0, 1)), Availability::Open);
        assert_eq!(evaluate(&windows, at(16, 59, 59)), Availability::Open);
        assert_eq!(evaluate(&windows, at(8, 59, 59)), Availability::Closed);
    }

    #[test]
    fn test_multiple_windows_deterministic() {
        // Morning and evening service with a break in between; declaration
        // order must not matter.
        let mut windows = vec![
            window("06:00 PM", "10:00 PM"),
            window("09:00 AM", "02:00 PM"),
        ];

        assert_eq!(evaluate(&windows, at(10, 0, 0)), Availability::Open);
        assert_eq!(evaluate(&windows, at(15, 0, 0)), Availability::Closed);
        assert_eq!(evaluate(&windows, at(19, 0, 0)), Availability::Open);

        windows.reverse();
        assert_eq!(evaluate(&windows, at(10, 0, 0)), Availability::Open);
        assert_eq!(evaluate(&windows, at(15, 0, 0)), Availability::Closed);
        assert_eq!(evaluate(&windows, at(19, 0, 0)), Availability::Open);
    }

    #[test]
    fn test_closed_window_does_not_open() {
        let windows = [
            OpeningWindow {
                from: slot("09:00 AM"),
                to: slot("05:00 PM"),
                closed: true,
            },
            window("06:00 PM", "10:00 PM"),
        ];
        // Inside the closed window: the open evening window still counts as
        // "closed now", not undetermined
        assert_eq!(evaluate(&windows, at(12, 0, 0)), Availability::Closed);
        assert_eq!(evaluate(&windows, at(19, 0, 0)), Availability::Open);
    }

    #[test]
    fn test_availability_serde() {
        assert_eq!(
            serde_json::to_string(&Availability::Undetermined).unwrap(),
            "\"undetermined\""
        );
        assert_eq!(
            serde_json::to_string(&Availability::Open).unwrap(),
            "\"open\""
        );
    }
}
