use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day: u32,
    #[serde(default)]
    pub events: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    /// Full English month name, e.g. `October`.
    pub month: String,
    #[serde(default)]
    pub days: Vec<CalendarDay>,
}

pub type Calendar = Vec<CalendarMonth>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PresentDate {
    pub year: i32,
    pub month: String,
    pub weekday: String,
    pub day: u32,
}

impl PresentDate {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.format("%B").to_string(),
            weekday: date.format("%A").to_string(),
            day: date.day(),
        }
    }

    pub fn now_in(timezone: Tz) -> Self {
        Self::from_date(Utc::now().with_timezone(&timezone).date_naive())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Calendar {0:?} not found")]
pub struct CalendarNotFound(pub String);

/// What the calendar widget renders.
#[derive(Debug, PartialEq, Eq)]
pub struct CalendarView<'a> {
    pub name: &'a str,
    /// The month matching `today`, if the calendar has one.
    pub month: Option<&'a CalendarMonth>,
    pub months: &'a [CalendarMonth],
    pub today: PresentDate,
    /// The calendar exists but has nothing for the current month.
    pub no_calendar: bool,
}

pub fn lookup<'a>(
    calendars: &'a HashMap<String, Calendar>,
    name: &str,
    today: PresentDate,
) -> Result<CalendarView<'a>, CalendarNotFound> {
    let Some((name, months)) = calendars.get_key_value(name) else {
        return Err(CalendarNotFound(name.to_string()));
    };

    let month = months.iter().find(|entry| entry.month == today.month);
    Ok(CalendarView {
        name: name.as_str(),
        month,
        months: months.as_slice(),
        today,
        no_calendar: month.is_none(),
    })
}
