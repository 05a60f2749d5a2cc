use chrono::{Datelike, NaiveDate, Weekday};
use crate::models::{Frequency, Task};

/// Weekday index with 0=Sunday..6=Saturday, the numbering `custom_days` uses.
pub fn day_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !is_weekend(date)
}

/// An empty or missing day set never matches.
pub fn is_custom_day(index: u8, custom_days: Option<&[u8]>) -> bool {
    match custom_days {
        Some(days) if !days.is_empty() => days.contains(&index),
        _ => false,
    }
}

/// Decides whether `task` is scheduled on `date`.
///
/// Only the field matching the task's frequency is read: `custom_days` for
/// custom tasks, `target_date` for one-off tasks. Unrecognized frequencies
/// occur every day.
pub fn occurs_on(task: &Task, date: NaiveDate) -> bool {
    match task.frequency {
        Frequency::Daily => true,
        Frequency::Weekdays => is_weekday(date),
        Frequency::Weekends => is_weekend(date),
        Frequency::Custom => is_custom_day(day_index(date), task.custom_days.as_deref()),
        Frequency::Once => task.target_date == Some(date),
        Frequency::Unknown(_) => true,
    }
}

/// Short weekday name for an index, used when listing custom days.
pub fn day_name(index: u8) -> &'static str {
    match index {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        _ => "?",
    }
}

/// Parses a day list such as `mon,wed,fri` or `1,3,5`.
pub fn parse_days(s: &str) -> Result<Vec<u8>, String> {
    let mut days = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let idx = match part.parse::<u8>() {
            Ok(n) if n <= 6 => n,
            Ok(n) => return Err(format!("Day index {} is out of range (0-6).", n)),
            Err(_) => match part.parse::<Weekday>() {
                Ok(w) => w.num_days_from_sunday() as u8,
                Err(_) => return Err(format!("Unknown day '{}'.", part)),
            },
        };
        if !days.contains(&idx) {
            days.push(idx);
        }
    }
    days.sort_unstable();
    Ok(days)
}

/// Human description of a task's recurrence rule.
pub fn describe(task: &Task) -> String {
    match task.frequency {
        Frequency::Custom => {
            let days = task.custom_days.as_deref().unwrap_or_default();
            if days.is_empty() {
                "custom (no days)".to_string()
            } else {
                let names: Vec<&str> = days.iter().map(|d| day_name(*d)).collect();
                names.join(" ")
            }
        }
        Frequency::Once => match task.target_date {
            Some(d) => format!("once {}", d),
            None => "once (no date)".to_string(),
        },
        _ => task.frequency.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_time, TaskDraft};
    use chrono::{Duration, Utc};

    fn task(frequency: Frequency) -> Task {
        TaskDraft::new("t", parse_time("07:00").unwrap(), frequency)
            .into_task("id".into(), Utc::now())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn week_from(start: &str) -> impl Iterator<Item = NaiveDate> {
        let start = date(start);
        (0..7).map(move |i| start + Duration::days(i))
    }

    #[test]
    fn daily_occurs_every_day() {
        let t = task(Frequency::Daily);
        assert!(week_from("2024-03-10").all(|d| occurs_on(&t, d)));
    }

    #[test]
    fn weekdays_and_weekends_are_complementary() {
        let wd = task(Frequency::Weekdays);
        let we = task(Frequency::Weekends);
        for d in week_from("2024-03-10") {
            assert_ne!(occurs_on(&wd, d), occurs_on(&we, d), "{}", d);
            let weekend = matches!(d.weekday(), Weekday::Sat | Weekday::Sun);
            assert_eq!(occurs_on(&we, d), weekend);
        }
    }

    #[test]
    fn custom_days_match_only_listed_weekdays() {
        let mut t = task(Frequency::Custom);
        t.custom_days = Some(vec![1, 3, 5]);
        let hits: Vec<Weekday> = week_from("2024-03-10")
            .filter(|d| occurs_on(&t, *d))
            .map(|d| d.weekday())
            .collect();
        assert_eq!(hits, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
    }

    #[test]
    fn custom_without_days_never_occurs() {
        let mut t = task(Frequency::Custom);
        assert!(!week_from("2024-03-10").any(|d| occurs_on(&t, d)));
        t.custom_days = Some(vec![]);
        assert!(!week_from("2024-03-10").any(|d| occurs_on(&t, d)));
    }

    #[test]
    fn once_matches_exact_date() {
        let mut t = task(Frequency::Once);
        t.target_date = Some(date("2024-03-15"));
        assert!(occurs_on(&t, date("2024-03-15")));
        assert!(!occurs_on(&t, date("2024-03-14")));
        assert!(!occurs_on(&t, date("2024-03-16")));
    }

    #[test]
    fn irrelevant_fields_are_ignored() {
        let mut t = task(Frequency::Daily);
        t.custom_days = Some(vec![]);
        t.target_date = Some(date("2000-01-01"));
        assert!(occurs_on(&t, date("2024-03-15")));

        let mut once = task(Frequency::Once);
        once.custom_days = Some(vec![5]);
        assert!(!occurs_on(&once, date("2024-03-15")));
    }

    #[test]
    fn unknown_frequency_is_permissive() {
        let t = task(Frequency::Unknown("monthly".into()));
        assert!(week_from("2024-03-10").all(|d| occurs_on(&t, d)));
    }

    #[test]
    fn parses_day_lists() {
        assert_eq!(parse_days("fri, mon,3").unwrap(), vec![1, 3, 5]);
        assert_eq!(parse_days("Sunday,saturday").unwrap(), vec![0, 6]);
        assert!(parse_days("7").is_err());
        assert!(parse_days("someday").is_err());
    }
}
