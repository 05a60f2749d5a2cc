//! Core of the `routinely` daily-routine tracker: recurrence resolution,
//! countdown math, the "today" projection and the task store.

pub mod clock;
pub mod commands;
pub mod error;
pub mod ideas;
pub mod models;
pub mod recurrence;
pub mod schedule;
pub mod storage;
pub mod store;
pub mod summary;
pub mod today;
pub mod tui;
