use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseClockError;

// Type aliases for clarity
pub type TeacherId = String;
pub type SubjectId = String;
pub type CourseId = String;
pub type SlotId = String;

/// School day. Spanish names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Day {
    #[serde(alias = "Lunes")]
    Monday,
    #[serde(alias = "Martes")]
    Tuesday,
    #[serde(alias = "Miércoles", alias = "Miercoles")]
    Wednesday,
    #[serde(alias = "Jueves")]
    Thursday,
    #[serde(alias = "Viernes")]
    Friday,
}

impl Day {
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        };
        f.write_str(name)
    }
}

/// Wall-clock time of day with minute resolution, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then(|| Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = ParseClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseClockError(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        let digits = |part: &str, len: std::ops::RangeInclusive<usize>| {
            len.contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(h, 1..=2) || !digits(m, 2..=2) {
            return Err(err());
        }
        let hour = h.parse().map_err(|_| err())?;
        let minute = m.parse().map_err(|_| err())?;
        ClockTime::new(hour, minute).ok_or_else(err)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ParseClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// One column of the daily grid.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: SlotId,
    pub name: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl TimeSlot {
    /// Half-open interval overlap against `[start, end)`.
    pub fn overlaps(&self, start: ClockTime, end: ClockTime) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// A window during which a teacher cannot be scheduled.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restriction {
    #[serde(default)]
    pub id: String,
    pub day: Day,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeacherType {
    #[default]
    #[serde(alias = "fijo", alias = "titular")]
    Fixed,
    #[serde(alias = "rotacion")]
    Rotating,
    #[serde(alias = "dos_niveles")]
    TwoLevel,
    #[serde(alias = "mixto")]
    Mixed,
}

/// A subject a teacher teaches and the courses it is routed to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAssignment {
    pub subject_id: SubjectId,
    #[serde(default)]
    pub weekly_hours_assigned: u32,
    #[serde(default)]
    pub course_ids: Vec<CourseId>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    pub full_name: String,
    #[serde(default)]
    pub teacher_type: TeacherType,
    #[serde(default)]
    pub subjects_taught: Vec<SubjectAssignment>,
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
    #[serde(default)]
    pub homeroom_course_id: Option<CourseId>,
    #[serde(default)]
    pub qualified_levels: Vec<String>,
    #[serde(default)]
    pub qualified_grades: Vec<String>,
    #[serde(default)]
    pub qualified_sections: Vec<String>,
}

impl Teacher {
    /// True when this teacher has `subject_id` routed to `course_id`.
    pub fn teaches(&self, subject_id: &str, course_id: &str) -> bool {
        self.subjects_taught
            .iter()
            .any(|st| st.subject_id == subject_id && st.course_ids.iter().any(|c| c == course_id))
    }

    /// True when the teacher teaches anything in `course_id`.
    pub fn serves(&self, course_id: &str) -> bool {
        self.subjects_taught
            .iter()
            .any(|st| st.course_ids.iter().any(|c| c == course_id))
    }

    pub fn weekly_load(&self) -> u32 {
        self.subjects_taught
            .iter()
            .map(|st| st.weekly_hours_assigned)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "baja")]
    Low,
    #[default]
    #[serde(alias = "media")]
    Medium,
    #[serde(alias = "alta")]
    High,
}

impl Priority {
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    /// level -> grade -> weekly hours
    #[serde(default)]
    pub weekly_hours_by_level_and_grade: BTreeMap<String, BTreeMap<String, u32>>,
}

impl Subject {
    pub fn default_weekly_hours(&self, level: &str, grade: &str) -> u32 {
        self.weekly_hours_by_level_and_grade
            .get(level)
            .and_then(|grades| grades.get(grade))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSubject {
    pub subject_id: SubjectId,
    /// Falls back to the subject's level/grade table when absent.
    #[serde(default)]
    pub weekly_hours: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub level: String,
    pub grade: String,
    pub section: String,
    #[serde(default)]
    pub homeroom_teacher_id: Option<TeacherId>,
    #[serde(default)]
    pub course_subjects: Vec<CourseSubject>,
}

impl Course {
    pub fn display_name(&self) -> String {
        format!("{} {}º {}", self.level, self.grade, self.section)
    }

    /// Homeroom teacher id, treating an empty string as unset.
    pub fn homeroom_teacher(&self) -> Option<&str> {
        self.homeroom_teacher_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    pub fn required_hours(&self, entry: &CourseSubject, subject: Option<&Subject>) -> u32 {
        match (entry.weekly_hours, subject) {
            (Some(hours), _) => hours,
            (None, Some(subject)) => subject.default_weekly_hours(&self.level, &self.grade),
            (None, None) => 0,
        }
    }
}

/// The complete input for one generation run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationInput {
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    /// Overrides the configured seed for this run.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Lesson data shown in a course cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEntry {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CourseCell {
    Lesson(CourseEntry),
    Pedagogical(CourseEntry),
    Free,
}

impl CourseCell {
    pub fn entry(&self) -> Option<&CourseEntry> {
        match self {
            CourseCell::Lesson(entry) | CourseCell::Pedagogical(entry) => Some(entry),
            CourseCell::Free => None,
        }
    }
}

/// Lesson data shown in a teacher cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherEntry {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub course_id: CourseId,
    pub course_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TeacherCell {
    Lesson(TeacherEntry),
    Pedagogical(TeacherEntry),
}

impl TeacherCell {
    pub fn entry(&self) -> &TeacherEntry {
        match self {
            TeacherCell::Lesson(entry) | TeacherCell::Pedagogical(entry) => entry,
        }
    }
}

/// day -> slot id -> cell
pub type Grid<C> = BTreeMap<Day, BTreeMap<SlotId, Option<C>>>;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSchedule {
    pub course_id: CourseId,
    pub course_name: String,
    pub schedule: Grid<CourseCell>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSchedule {
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub schedule: Grid<TeacherCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    MissingTeacher,
    UnroutedSubject,
    TeacherOverloaded,
    CourseOverCapacity,
    MissingHomeroom,
    PlacementShortfall,
    Internal,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::MissingTeacher => "Missing Teacher",
            IssueKind::UnroutedSubject => "Unrouted Subject",
            IssueKind::TeacherOverloaded => "Teacher Overloaded",
            IssueKind::CourseOverCapacity => "Course Over Capacity",
            IssueKind::MissingHomeroom => "Missing Homeroom",
            IssueKind::PlacementShortfall => "Placement Shortfall",
            IssueKind::Internal => "Internal",
        };
        f.write_str(name)
    }
}

/// A configuration problem or placement shortfall reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<CourseId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<TeacherId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_hours: Option<u32>,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            course_id: None,
            subject_id: None,
            teacher_id: None,
            required_hours: None,
        }
    }

    pub fn with_course(mut self, course_id: impl Into<CourseId>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    pub fn with_subject(mut self, subject_id: impl Into<SubjectId>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn with_teacher(mut self, teacher_id: impl Into<TeacherId>) -> Self {
        self.teacher_id = Some(teacher_id.into());
        self
    }

    pub fn with_required_hours(mut self, hours: u32) -> Self {
        self.required_hours = Some(hours);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// The final output of a generation run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    pub success: bool,
    pub placed_count: usize,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub course_schedules: Vec<CourseSchedule>,
    pub teacher_schedules: Vec<TeacherSchedule>,
}

impl GenerationOutput {
    /// Output of a run stopped by blocking configuration errors.
    pub fn blocked(errors: Vec<Issue>, warnings: Vec<Issue>) -> Self {
        Self {
            success: false,
            placed_count: 0,
            errors,
            warnings,
            course_schedules: Vec::new(),
            teacher_schedules: Vec::new(),
        }
    }
}
