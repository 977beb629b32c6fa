//! UTC calendar decomposition of epoch timestamps

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

/// Index of a calendar field, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CalendarField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// Calendar representation of a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub year: i32,
    /// 1-12
    pub month: u32,
    /// 1-31
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// 0 = Monday
    pub weekday: u32,
    /// 1-based day within the year
    pub day_of_year: u32,
}

impl CalendarFields {
    /// Value of a single field
    pub fn get(&self, field: CalendarField) -> i64 {
        match field {
            CalendarField::Year => i64::from(self.year),
            CalendarField::Month => i64::from(self.month),
            CalendarField::Day => i64::from(self.day),
            CalendarField::Hour => i64::from(self.hour),
            CalendarField::Minute => i64::from(self.minute),
            CalendarField::Second => i64::from(self.second),
        }
    }
}

fn to_datetime(epoch_seconds: f64) -> Option<DateTime<Utc>> {
    if !epoch_seconds.is_finite() {
        return None;
    }
    let secs = epoch_seconds.floor();
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(secs as i64, 0)
}

/// Split epoch seconds into UTC calendar fields.
///
/// Fractions of a second are dropped. Returns `None` for missing or
/// unrepresentable timestamps.
pub fn decompose(epoch_seconds: f64) -> Option<CalendarFields> {
    let dt = to_datetime(epoch_seconds)?;
    Some(CalendarFields {
        year: dt.year(),
        month: dt.month(),
        day: dt.day(),
        hour: dt.hour(),
        minute: dt.minute(),
        second: dt.second(),
        weekday: dt.weekday().num_days_from_monday(),
        day_of_year: dt.ordinal(),
    })
}

/// Truncate a timestamp to `field`, zeroing all finer fields, and return
/// the result as epoch seconds
pub fn truncate(epoch_seconds: f64, field: CalendarField) -> Option<f64> {
    let c = decompose(epoch_seconds)?;
    let keep = |f: CalendarField, value: u32, floor: u32| if f <= field { value } else { floor };
    Utc.with_ymd_and_hms(
        c.year,
        keep(CalendarField::Month, c.month, 1),
        keep(CalendarField::Day, c.day, 1),
        keep(CalendarField::Hour, c.hour, 0),
        keep(CalendarField::Minute, c.minute, 0),
        keep(CalendarField::Second, c.second, 0),
    )
    .single()
    .map(|dt| dt.timestamp() as f64)
}
