use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// Source of "now" for the store, swappable in tests.
pub trait Clock {
    /// Local wall-clock time; drives recurrence and countdowns.
    fn now(&self) -> NaiveDateTime;

    /// Absolute timestamp recorded as a task's `createdAt`.
    fn timestamp(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant. Its timestamp treats the wall time as UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Parses `YYYY-MM-DDTHH:MM:SS`. Panics on bad input; meant for tests.
    pub fn at(s: &str) -> Self {
        FixedClock(
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .unwrap_or_else(|e| panic!("bad fixed clock '{}': {}", s, e)),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }
}
