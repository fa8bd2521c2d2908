use std::path::PathBuf;

use chrono::NaiveDate;

use crate::models::ExcuseStatus;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("{kind} already exists: {id}")]
    Duplicate { kind: &'static str, id: String },
    #[error("Unknown student: {0}")]
    UnknownStudent(String),
    #[error("Unknown course: {0}")]
    UnknownCourse(String),
    #[error("No attendance recorded for {student_id} in {course_id} on {date}")]
    RecordNotFound {
        student_id: String,
        course_id: String,
        date: NaiveDate,
    },
    #[error("Excuses can only be attached to absences")]
    NotAnAbsence,
    #[error("An excuse needs a type other than none")]
    MissingExcuseType,
    #[error("Cannot {action} an excuse that is {from:?}")]
    InvalidExcuseTransition {
        action: &'static str,
        from: ExcuseStatus,
    },
    #[error("No pending deprivation for {student_id} in {course_id}")]
    NothingToConfirm {
        student_id: String,
        course_id: String,
    },
    #[error("Failed to open {path:?}: {source}")]
    File { path: PathBuf, source: csv::Error },
    #[error("Invalid attendance row {row}: {source}")]
    InvalidRow { row: usize, source: csv::Error },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to serialize export row: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
