//! Calendar periods
//!
//! Periods group rows of a time series by a key derived from the UTC
//! calendar fields of their timestamps. Non-periodic periods truncate the
//! timestamp (all rows of the same day, month, ...), periodic ones extract
//! a repeating component (month of year, day of week, ...).

pub mod calendar;

pub use calendar::{decompose, truncate, CalendarField, CalendarFields};

use crate::error::{MovingTransformError, Result};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Keys that are not a plain calendar field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedField {
    /// 0 = Monday
    Weekday,
    /// 1-based ordinal day within the year
    DayOfYear,
}

/// Definition of a calendar period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodDescriptor {
    /// Option name; also the name of the key column in the output
    pub name: &'static str,
    pub calendar_field: CalendarField,
    /// Extract a repeating component instead of truncating
    pub is_periodic: bool,
    pub base_label: &'static str,
    /// The calendar field value itself is the key
    pub value_represents_period: bool,
    /// Key used when the field value is not the key
    pub derived: Option<DerivedField>,
    pub category_labels: Option<&'static [&'static str]>,
    pub label_toggle_name: Option<&'static str>,
    /// Added to the key; makes keys index `category_labels`
    pub value_offset: i64,
}

impl PeriodDescriptor {
    const fn truncating(name: &'static str, calendar_field: CalendarField) -> Self {
        Self {
            name,
            calendar_field,
            is_periodic: false,
            base_label: "Time",
            value_represents_period: true,
            derived: None,
            category_labels: None,
            label_toggle_name: None,
            value_offset: 0,
        }
    }

    const fn periodic(
        name: &'static str,
        calendar_field: CalendarField,
        base_label: &'static str,
    ) -> Self {
        Self {
            is_periodic: true,
            base_label,
            ..Self::truncating(name, calendar_field)
        }
    }

    /// Whether keys are written as category labels
    pub fn uses_labels(&self, use_category_labels: bool) -> bool {
        use_category_labels && self.category_labels.is_some()
    }

    /// Grouping key of a timestamp, or `None` if the timestamp is missing
    /// or cannot be represented.
    ///
    /// Without category labels the offset is not applied, so a month of
    /// year is keyed 1-12 instead of 0-11.
    pub fn key(&self, epoch_seconds: f64, use_category_labels: bool) -> Option<f64> {
        if !self.is_periodic {
            return truncate(epoch_seconds, self.calendar_field);
        }
        let fields = decompose(epoch_seconds)?;
        let raw = match self.derived {
            Some(DerivedField::Weekday) => i64::from(fields.weekday),
            Some(DerivedField::DayOfYear) => i64::from(fields.day_of_year),
            None => fields.get(self.calendar_field),
        };
        let offset = if self.uses_labels(use_category_labels) {
            self.value_offset
        } else {
            0
        };
        Some((raw + offset) as f64)
    }
}

static PERIODS: [PeriodDescriptor; 11] = [
    PeriodDescriptor::truncating("Years", CalendarField::Year),
    PeriodDescriptor::truncating("Months", CalendarField::Month),
    PeriodDescriptor::truncating("Days", CalendarField::Day),
    PeriodDescriptor::truncating("Hours", CalendarField::Hour),
    PeriodDescriptor::truncating("Minutes", CalendarField::Minute),
    PeriodDescriptor::truncating("Seconds", CalendarField::Second),
    PeriodDescriptor {
        category_labels: Some(&MONTH_NAMES),
        label_toggle_name: Some("Use month names"),
        value_offset: -1,
        ..PeriodDescriptor::periodic("Month of year", CalendarField::Month, "Month")
    },
    PeriodDescriptor {
        value_represents_period: false,
        derived: Some(DerivedField::DayOfYear),
        ..PeriodDescriptor::periodic("Day of year", CalendarField::Day, "Day")
    },
    PeriodDescriptor::periodic("Day of month", CalendarField::Day, "Day"),
    PeriodDescriptor {
        value_represents_period: false,
        derived: Some(DerivedField::Weekday),
        category_labels: Some(&DAY_NAMES),
        label_toggle_name: Some("Use day names"),
        ..PeriodDescriptor::periodic("Day of week", CalendarField::Day, "Day")
    },
    PeriodDescriptor::periodic("Hour of day", CalendarField::Hour, "Hour"),
];

/// Read-only registry of calendar periods
pub struct PeriodCatalog;

impl PeriodCatalog {
    /// All periods; non-periodic ones first
    pub fn all() -> impl Iterator<Item = &'static PeriodDescriptor> {
        PERIODS.iter()
    }

    pub fn get(name: &str) -> Result<&'static PeriodDescriptor> {
        PERIODS
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| MovingTransformError::UnknownPeriod(name.to_string()))
    }
}
