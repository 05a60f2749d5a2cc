use std::fmt;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use crate::models::Occurrence;

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// A scheduled time more than this far in the past is read as tomorrow's.
pub const ROLLOVER_THRESHOLD_MINUTES: f64 = -720.0;

/// Threshold under which an upcoming task is flagged as due soon.
pub const DUE_SOON_MINUTES: i64 = 30;

/// Minutes from `reference` until `time` on the same calendar date.
///
/// Negative when the time has already passed today. A difference below
/// -12h wraps forward by a day, so an early-morning task checked late at
/// night counts down to tomorrow instead of reading as missed.
pub fn minutes_until(time: NaiveTime, reference: NaiveDateTime) -> i64 {
    let candidate = reference.date().and_time(time);
    let mut diff = (candidate - reference).num_milliseconds() as f64 / 60_000.0;
    if diff < ROLLOVER_THRESHOLD_MINUTES {
        diff += MINUTES_PER_DAY as f64;
    }
    // half-up, so -0.5 rounds to 0
    (diff + 0.5).floor() as i64
}

/// Minutes since midnight.
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// `"now"`, `"25 min"`, `"2 hr"` or `"1 hr 5 min"`.
pub fn format_minutes(minutes: i64) -> String {
    if minutes <= 0 {
        return "now".to_string();
    }
    if minutes < 60 {
        return format!("{} min", minutes);
    }
    let hours = minutes / 60;
    let remainder = minutes % 60;
    if remainder == 0 {
        format!("{} hr", hours)
    } else {
        format!("{} hr {} min", hours, remainder)
    }
}

/// 12-hour clock label, e.g. `7:05 AM`.
pub fn format_time_label(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

pub fn reminder_label(offset: u32) -> String {
    if offset == 0 {
        "at time".to_string()
    } else {
        format!("{} min early", offset)
    }
}

/// True while an open occurrence sits inside its reminder window.
pub fn reminder_due(occurrence: &Occurrence) -> bool {
    !occurrence.completed
        && occurrence.minutes_until >= 0
        && occurrence.minutes_until <= occurrence.task.reminder_offset as i64
}

/// Part of the day a task's time falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DaySegment {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DaySegment {
    pub const ALL: [DaySegment; 4] = [
        DaySegment::Morning,
        DaySegment::Afternoon,
        DaySegment::Evening,
        DaySegment::Night,
    ];

    /// Night runs from 21:00 through 04:59.
    pub fn of(time: NaiveTime) -> DaySegment {
        match minute_of_day(time) {
            m if (5 * 60..12 * 60).contains(&m) => DaySegment::Morning,
            m if (12 * 60..17 * 60).contains(&m) => DaySegment::Afternoon,
            m if (17 * 60..21 * 60).contains(&m) => DaySegment::Evening,
            _ => DaySegment::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DaySegment::Morning => "Morning",
            DaySegment::Afternoon => "Afternoon",
            DaySegment::Evening => "Evening",
            DaySegment::Night => "Night",
        }
    }
}

impl fmt::Display for DaySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display status of an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Completed,
    Missed,
    DueSoon,
    Upcoming,
}

impl Status {
    pub fn of(occurrence: &Occurrence) -> Status {
        if occurrence.completed {
            Status::Completed
        } else if occurrence.minutes_until < 0 {
            Status::Missed
        } else if occurrence.minutes_until <= DUE_SOON_MINUTES {
            Status::DueSoon
        } else {
            Status::Upcoming
        }
    }
}

/// `"Completed"`, `"Missed"` or the countdown.
pub fn status_label(occurrence: &Occurrence) -> String {
    match Status::of(occurrence) {
        Status::Completed => "Completed".to_string(),
        Status::Missed => "Missed".to_string(),
        _ => format_minutes(occurrence.minutes_until),
    }
}
