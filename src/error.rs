use thiserror::Error;

/// Faults that abort a generation run.
///
/// Configuration problems and placement shortfalls are not errors; they are
/// reported as [`crate::data::Issue`] values in the run output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generation cancelled")]
    Cancelled,
    #[error("course {course_id} references unknown subject {subject_id}")]
    UnknownSubject {
        course_id: String,
        subject_id: String,
    },
    #[error("no teacher routed for subject {subject_id} in course {course_id}")]
    MissingRoute {
        course_id: String,
        subject_id: String,
    },
    #[error("unknown teacher {0}")]
    UnknownTeacher(String),
    #[error("no time slots defined for the daily grid")]
    EmptyGrid,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid clock time {0:?}, expected HH:MM")]
pub struct ParseClockError(pub String);
