use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RoutineError;

/// Which calendar dates a task applies to.
///
/// Stored as a lowercase string. Values this crate does not recognize are
/// kept verbatim in `Unknown` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekdays,
    Weekends,
    /// Only on the weekday indices listed in `custom_days`.
    Custom,
    /// Only on `target_date`.
    Once,
    /// Any value written by something other than this crate.
    Unknown(String),
}

impl Frequency {
    pub fn as_str(&self) -> &str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekdays => "weekdays",
            Frequency::Weekends => "weekends",
            Frequency::Custom => "custom",
            Frequency::Once => "once",
            Frequency::Unknown(raw) => raw,
        }
    }

    /// Reads a stored value. Only the exact lowercase names are recognized.
    pub fn from_stored(raw: &str) -> Frequency {
        match raw {
            "daily" => Frequency::Daily,
            "weekdays" => Frequency::Weekdays,
            "weekends" => Frequency::Weekends,
            "custom" => Frequency::Custom,
            "once" => Frequency::Once,
            other => Frequency::Unknown(other.to_string()),
        }
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(Frequency::from_stored(&raw))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekdays" => Ok(Frequency::Weekdays),
            "weekends" => Ok(Frequency::Weekends),
            "custom" => Ok(Frequency::Custom),
            "once" => Ok(Frequency::Once),
            other => Err(format!(
                "Unknown frequency '{}'. Supported: daily, weekdays, weekends, custom, once.",
                other
            )),
        }
    }
}

/// A persisted routine definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier assigned when the task is added.
    pub id: String,
    pub title: String,
    /// Wall-clock time of day, stored as `HH:MM`.
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub frequency: Frequency,
    /// Weekday indices, 0=Sunday..6=Saturday. Read only for `Frequency::Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_days: Option<Vec<u8>>,
    /// Read only for `Frequency::Once`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    /// Minutes before `time` at which the reminder is due.
    #[serde(default)]
    pub reminder_offset: u32,
    #[serde(default)]
    pub pinned: bool,
    /// The most recent date the task was marked done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Short form of the id used in tables.
    pub fn short_id(&self) -> &str {
        let end = self.id.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.id.len());
        &self.id[..end]
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.last_completed_date == Some(date)
    }
}

/// The caller-supplied part of a new task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub frequency: Frequency,
    #[serde(default)]
    pub custom_days: Option<Vec<u8>>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub reminder_offset: u32,
    #[serde(default)]
    pub pinned: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, time: NaiveTime, frequency: Frequency) -> Self {
        TaskDraft {
            title: title.into(),
            time,
            category: String::new(),
            notes: None,
            frequency,
            custom_days: None,
            target_date: None,
            reminder_offset: 0,
            pinned: false,
        }
    }

    /// Checks the fields a task cannot be created without.
    pub fn validate(&self) -> Result<(), RoutineError> {
        if self.title.trim().is_empty() {
            return Err(RoutineError::EmptyTitle);
        }
        if let Some(days) = &self.custom_days {
            if let Some(bad) = days.iter().find(|d| **d > 6) {
                return Err(RoutineError::InvalidWeekday(*bad));
            }
        }
        Ok(())
    }

    /// Turns the draft into a stored task.
    pub fn into_task(self, id: String, created_at: DateTime<Utc>) -> Task {
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Task {
            id,
            title: self.title.trim().to_string(),
            time: self.time,
            category: self.category,
            notes,
            frequency: self.frequency,
            custom_days: self.custom_days,
            target_date: self.target_date,
            reminder_offset: self.reminder_offset,
            pinned: self.pinned,
            last_completed_date: None,
            created_at,
        }
    }
}

/// A partial update merged into an existing task.
///
/// Nullable fields use `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub time: Option<NaiveTime>,
    pub category: Option<String>,
    pub notes: Option<Option<String>>,
    pub frequency: Option<Frequency>,
    pub custom_days: Option<Option<Vec<u8>>>,
    pub target_date: Option<Option<NaiveDate>>,
    pub reminder_offset: Option<u32>,
    pub pinned: Option<bool>,
    pub last_completed_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Returns a copy of `task` with every set field replaced.
    pub fn apply(&self, task: &Task) -> Task {
        let mut t = task.clone();
        if let Some(v) = &self.title {
            t.title = v.clone();
        }
        if let Some(v) = self.time {
            t.time = v;
        }
        if let Some(v) = &self.category {
            t.category = v.clone();
        }
        if let Some(v) = &self.notes {
            t.notes = v.clone();
        }
        if let Some(v) = &self.frequency {
            t.frequency = v.clone();
        }
        if let Some(v) = &self.custom_days {
            t.custom_days = v.clone();
        }
        if let Some(v) = self.target_date {
            t.target_date = v;
        }
        if let Some(v) = self.reminder_offset {
            t.reminder_offset = v;
        }
        if let Some(v) = self.pinned {
            t.pinned = v;
        }
        if let Some(v) = self.last_completed_date {
            t.last_completed_date = v;
        }
        t
    }
}

/// A task projected onto today. Derived on every read, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub task: Task,
    pub completed: bool,
    pub minutes_until: i64,
}

/// Parses `HH:MM` (seconds, if present, are dropped).
pub fn parse_time(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    let s = s.trim();
    let t = NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))?;
    Ok(t.with_second(0).unwrap_or(t))
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw).map_err(|e| {
            serde::de::Error::custom(format!("invalid time '{}': {}", raw, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        TaskDraft {
            notes: Some("  Drink 500ml water ".into()),
            category: "Wellness".into(),
            reminder_offset: 5,
            ..TaskDraft::new("Hydrate", parse_time("08:00").unwrap(), Frequency::Daily)
        }
        .into_task("abc".into(), Utc.with_ymd_and_hms(2024, 3, 15, 7, 0, 0).unwrap())
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["time"], "08:00");
        assert_eq!(json["reminderOffset"], 5);
        assert_eq!(json["frequency"], "daily");
        assert_eq!(json["notes"], "Drink 500ml water");
        assert!(json.get("lastCompletedDate").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn reads_records_with_missing_optionals() {
        let raw = r#"{
            "id": "1", "title": "Read", "time": "21:30",
            "frequency": "custom", "customDays": [1, 3],
            "lastCompletedDate": "2024-03-15",
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.custom_days, Some(vec![1, 3]));
        assert_eq!(task.reminder_offset, 0);
        assert!(!task.pinned);
        assert!(task.is_completed_on(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
    }

    #[test]
    fn unrecognized_frequency_is_kept_verbatim() {
        let raw = r#"{"id":"1","title":"x","time":"07:00","frequency":"fortnightly",
            "createdAt":"2024-03-01T10:00:00Z"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.frequency, Frequency::Unknown("fortnightly".into()));

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["frequency"], "fortnightly");
    }

    #[test]
    fn cli_parsing_still_rejects_unknown_frequencies() {
        assert!("fortnightly".parse::<Frequency>().is_err());
        assert_eq!("Weekdays".parse::<Frequency>(), Ok(Frequency::Weekdays));
        assert_eq!(Frequency::from_stored("Weekdays"), Frequency::Unknown("Weekdays".into()));
    }

    #[test]
    fn rejects_bad_drafts() {
        let t = parse_time("07:00").unwrap();
        assert!(matches!(
            TaskDraft::new("   ", t, Frequency::Daily).validate(),
            Err(RoutineError::EmptyTitle)
        ));
        let draft = TaskDraft {
            custom_days: Some(vec![1, 9]),
            ..TaskDraft::new("Gym", t, Frequency::Custom)
        };
        assert!(matches!(draft.validate(), Err(RoutineError::InvalidWeekday(9))));
    }

    #[test]
    fn patch_clears_nullable_fields() {
        let task = sample();
        let patch = TaskPatch {
            notes: Some(None),
            pinned: Some(true),
            ..Default::default()
        };
        let updated = patch.apply(&task);
        assert_eq!(updated.notes, None);
        assert!(updated.pinned);
        assert_eq!(updated.title, task.title);
        assert_eq!(updated.id, task.id);
    }

    #[test]
    fn parse_time_drops_seconds() {
        assert_eq!(parse_time("09:15:42").unwrap(), parse_time("09:15").unwrap());
        assert!(parse_time("25:00").is_err());
    }
}
