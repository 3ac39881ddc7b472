//! Pre-flight diagnostics.
//!
//! Every course-subject with hours to place must be routed to a teacher;
//! missing routes are blocking and reported all at once. Non-blocking
//! advisories flag configuration that will not behave as the operator
//! probably expects (unrouted teacher subjects, overloaded teachers, courses
//! that cannot fit in the grid, courses without a homeroom teacher).

use crate::data::{
    Course, CourseId, Day, Issue, IssueKind, Subject, SubjectId, Teacher, TeacherId, TimeSlot,
};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;

pub const MAX_TEACHER_WEEKLY_HOURS: u32 = 40;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Blocking: course-subjects with no routed teacher.
    pub missing_teacher_by_subject_in_course: Vec<Issue>,
    /// Non-blocking: teacher subjects not routed to any course.
    pub teachers_with_unrouted_subjects: Vec<Issue>,
    /// Non-blocking: other advisories.
    pub advisories: Vec<Issue>,
    /// Resolved teacher per (course, subject).
    #[serde(skip)]
    pub routes: HashMap<(CourseId, SubjectId), TeacherId>,
}

impl ValidationReport {
    pub fn is_blocking(&self) -> bool {
        !self.missing_teacher_by_subject_in_course.is_empty()
    }

    pub fn errors(&self) -> Vec<Issue> {
        self.missing_teacher_by_subject_in_course.clone()
    }

    pub fn warnings(&self) -> Vec<Issue> {
        self.teachers_with_unrouted_subjects
            .iter()
            .chain(&self.advisories)
            .cloned()
            .collect()
    }

    pub fn teacher_for(&self, course_id: &str, subject_id: &str) -> Option<&TeacherId> {
        self.routes
            .get(&(course_id.to_string(), subject_id.to_string()))
    }
}

pub fn validate(
    courses: &[Course],
    teachers: &[Teacher],
    subjects: &[Subject],
    time_slots: &[TimeSlot],
) -> ValidationReport {
    let subject_map: HashMap<&str, &Subject> =
        subjects.iter().map(|s| (s.id.as_str(), s)).collect();
    let subject_name = |id: &str| {
        subject_map
            .get(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let grid_capacity = (Day::ALL.len() * time_slots.len()) as u32;
    let mut report = ValidationReport::default();

    for course in courses {
        let mut course_hours = 0;
        for entry in &course.course_subjects {
            let subject = subject_map.get(entry.subject_id.as_str()).copied();
            let hours = course.required_hours(entry, subject);
            if hours == 0 {
                continue;
            }
            course_hours += hours;

            match teachers
                .iter()
                .find(|t| t.teaches(&entry.subject_id, &course.id))
            {
                Some(teacher) => {
                    debug!(
                        "Routed {} in {} to {}",
                        entry.subject_id, course.id, teacher.id
                    );
                    report.routes.insert(
                        (course.id.clone(), entry.subject_id.clone()),
                        teacher.id.clone(),
                    );
                }
                None => report.missing_teacher_by_subject_in_course.push(
                    Issue::new(
                        IssueKind::MissingTeacher,
                        format!(
                            "No teacher is assigned to {} in {} ({} weekly hours required).",
                            subject_name(&entry.subject_id),
                            course.display_name(),
                            hours
                        ),
                    )
                    .with_course(&course.id)
                    .with_subject(&entry.subject_id)
                    .with_required_hours(hours),
                ),
            }
        }

        if course_hours > grid_capacity {
            report.advisories.push(
                Issue::new(
                    IssueKind::CourseOverCapacity,
                    format!(
                        "{} requires {} weekly hours but the grid only offers {}.",
                        course.display_name(),
                        course_hours,
                        grid_capacity
                    ),
                )
                .with_course(&course.id),
            );
        }

        let has_homeroom = course.homeroom_teacher().is_some()
            || teachers
                .iter()
                .any(|t| t.homeroom_course_id.as_deref() == Some(course.id.as_str()));
        if !has_homeroom {
            report.advisories.push(
                Issue::new(
                    IssueKind::MissingHomeroom,
                    format!("{} has no homeroom teacher.", course.display_name()),
                )
                .with_course(&course.id),
            );
        }
    }

    for teacher in teachers {
        for st in teacher.subjects_taught.iter().filter(|st| st.course_ids.is_empty()) {
            report.teachers_with_unrouted_subjects.push(
                Issue::new(
                    IssueKind::UnroutedSubject,
                    format!(
                        "{} has {} hours of {} not assigned to any course; they will not be scheduled.",
                        teacher.full_name,
                        st.weekly_hours_assigned,
                        subject_name(&st.subject_id)
                    ),
                )
                .with_teacher(&teacher.id)
                .with_subject(&st.subject_id),
            );
        }

        let load = teacher.weekly_load();
        if load > MAX_TEACHER_WEEKLY_HOURS {
            report.advisories.push(
                Issue::new(
                    IssueKind::TeacherOverloaded,
                    format!(
                        "{} is assigned {} weekly hours, above the maximum of {}.",
                        teacher.full_name, load, MAX_TEACHER_WEEKLY_HOURS
                    ),
                )
                .with_teacher(&teacher.id),
            );
        }
    }

    info!(
        "Validation finished: {} blocking errors, {} unrouted assignments, {} advisories",
        report.missing_teacher_by_subject_in_course.len(),
        report.teachers_with_unrouted_subjects.len(),
        report.advisories.len()
    );
    report
}
