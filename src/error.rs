use thiserror::Error;

/// Failures reading or writing the persisted task slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed task data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the routine store. Only draft validation reaches
/// callers; storage failures are logged and swallowed.
#[derive(Debug, Error)]
pub enum RoutineError {
    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("custom day index {0} is out of range (0=Sunday..6=Saturday)")]
    InvalidWeekday(u8),
}
