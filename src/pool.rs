use crate::data::Priority;
use crate::error::GenerationError;
use crate::schedule::Catalog;
use crate::validation::ValidationReport;
use std::cmp::Reverse;

/// One hour of a course's weekly requirement for a subject.
///
/// Indices refer to the run's [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementUnit {
    pub course: usize,
    pub subject: usize,
    pub teacher: usize,
    pub priority: Priority,
}

impl PlacementUnit {
    pub fn weight(&self) -> u8 {
        self.priority.weight()
    }
}

/// Expands a course's subject requirements into one unit per weekly hour,
/// highest priority first.
pub fn build_pool(
    course: usize,
    catalog: &Catalog<'_>,
    routes: &ValidationReport,
) -> Result<Vec<PlacementUnit>, GenerationError> {
    let c = &catalog.courses[course];
    let mut units = Vec::new();

    for entry in &c.course_subjects {
        if entry.weekly_hours == Some(0) {
            continue;
        }
        let subject = catalog.subject_idx(&c.id, &entry.subject_id)?;
        let hours = c.required_hours(entry, Some(&catalog.subjects[subject]));
        if hours == 0 {
            continue;
        }
        let teacher_id = routes.teacher_for(&c.id, &entry.subject_id).ok_or_else(|| {
            GenerationError::MissingRoute {
                course_id: c.id.clone(),
                subject_id: entry.subject_id.clone(),
            }
        })?;
        let teacher = catalog.teacher_idx(teacher_id)?;
        let priority = catalog.subjects[subject].priority;

        units.extend((0..hours).map(|_| PlacementUnit {
            course,
            subject,
            teacher,
            priority,
        }));
    }

    units.sort_by_key(|u| Reverse(u.weight()));
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        ClockTime, Course, CourseSubject, GenerationInput, Subject, SubjectAssignment, Teacher,
        TimeSlot,
    };
    use crate::validation::validate;

    fn subject(id: &str, priority: Priority) -> Subject {
        Subject {
            id: id.into(),
            name: id.into(),
            priority,
            weekly_hours_by_level_and_grade: [(
                "Primario".to_string(),
                [("Segundo".to_string(), 5)].into_iter().collect(),
            )]
            .into_iter()
            .collect(),
        }
    }

    fn input(course_subjects: Vec<(&str, Option<u32>)>) -> GenerationInput {
        GenerationInput {
            teachers: vec![Teacher {
                id: "t".into(),
                full_name: "T".into(),
                teacher_type: Default::default(),
                subjects_taught: ["art", "math", "pe"]
                    .iter()
                    .map(|s| SubjectAssignment {
                        subject_id: s.to_string(),
                        weekly_hours_assigned: 0,
                        course_ids: vec!["c".into()],
                    })
                    .collect(),
                restrictions: vec![],
                homeroom_course_id: Some("c".into()),
                qualified_levels: vec![],
                qualified_grades: vec![],
                qualified_sections: vec![],
            }],
            subjects: vec![
                subject("art", Priority::Low),
                subject("math", Priority::High),
                subject("pe", Priority::Medium),
            ],
            courses: vec![Course {
                id: "c".into(),
                level: "Primario".into(),
                grade: "Segundo".into(),
                section: "B".into(),
                homeroom_teacher_id: None,
                course_subjects: course_subjects
                    .into_iter()
                    .map(|(s, h)| CourseSubject {
                        subject_id: s.into(),
                        weekly_hours: h,
                    })
                    .collect(),
            }],
            time_slots: vec![TimeSlot {
                id: "s".into(),
                name: "S".into(),
                start_time: ClockTime::new(8, 0).unwrap(),
                end_time: ClockTime::new(8, 45).unwrap(),
            }],
            seed: None,
        }
    }

    #[test]
    fn test_pool_has_one_unit_per_hour_sorted_by_priority() {
        let input = input(vec![("art", Some(2)), ("math", Some(3)), ("pe", Some(1))]);
        let catalog = Catalog::new(&input).unwrap();
        let report = validate(&input.courses, &input.teachers, &input.subjects, &input.time_slots);
        let pool = build_pool(0, &catalog, &report).unwrap();

        assert_eq!(pool.len(), 6);
        let weights: Vec<u8> = pool.iter().map(PlacementUnit::weight).collect();
        assert_eq!(weights, vec![3, 3, 3, 2, 1, 1]);
        assert!(pool.iter().all(|u| u.teacher == 0 && u.course == 0));
    }

    #[test]
    fn test_missing_hours_use_subject_defaults() {
        let input = input(vec![("math", None), ("pe", Some(0))]);
        let catalog = Catalog::new(&input).unwrap();
        let report = validate(&input.courses, &input.teachers, &input.subjects, &input.time_slots);
        let pool = build_pool(0, &catalog, &report).unwrap();
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn test_unknown_subject_is_an_error() {
        let input = input(vec![("chemistry", Some(2))]);
        let catalog = Catalog::new(&input).unwrap();
        let report = validate(&input.courses, &input.teachers, &input.subjects, &input.time_slots);
        assert!(report.is_blocking());
        assert!(matches!(
            build_pool(0, &catalog, &report),
            Err(GenerationError::UnknownSubject { .. })
        ));
    }

    #[test]
    fn test_missing_route_is_an_error() {
        let input = input(vec![("math", Some(1))]);
        let catalog = Catalog::new(&input).unwrap();
        let report = ValidationReport::default();
        assert!(matches!(
            build_pool(0, &catalog, &report),
            Err(GenerationError::MissingRoute { .. })
        ));
    }
}
