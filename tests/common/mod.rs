#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use timetable_engine::data::{
    ClockTime, Course, CourseCell, CourseSubject, Day, GenerationInput, GenerationOutput,
    Priority, Restriction, Subject, SubjectAssignment, Teacher, TeacherType, TimeSlot,
};
use timetable_engine::schedule::PEDAGOGICAL_SUBJECT_ID;

pub fn time(s: &str) -> ClockTime {
    s.parse().unwrap()
}

/// `n` back-to-back 45 minute blocks from 08:00.
pub fn slots(n: u16) -> Vec<TimeSlot> {
    (0..n)
        .map(|i| {
            let start = 8 * 60 + i * 45;
            TimeSlot {
                id: format!("b{}", i + 1),
                name: format!("Block {}", i + 1),
                start_time: ClockTime::new(start / 60, start % 60).unwrap(),
                end_time: ClockTime::new((start + 45) / 60, (start + 45) % 60).unwrap(),
            }
        })
        .collect()
}

pub fn teacher(id: &str) -> Teacher {
    Teacher {
        id: id.into(),
        full_name: format!("Teacher {id}"),
        teacher_type: TeacherType::Fixed,
        subjects_taught: vec![],
        restrictions: vec![],
        homeroom_course_id: None,
        qualified_levels: vec![],
        qualified_grades: vec![],
        qualified_sections: vec![],
    }
}

pub fn teaching(mut t: Teacher, subject: &str, courses: &[&str]) -> Teacher {
    t.subjects_taught.push(SubjectAssignment {
        subject_id: subject.into(),
        weekly_hours_assigned: 0,
        course_ids: courses.iter().map(|c| c.to_string()).collect(),
    });
    t
}

pub fn restricted(mut t: Teacher, day: Day, start: &str, end: &str) -> Teacher {
    t.restrictions.push(Restriction {
        id: format!("r{}", t.restrictions.len()),
        day,
        start_time: time(start),
        end_time: time(end),
        reason: "unavailable".into(),
    });
    t
}

pub fn subject(id: &str, priority: Priority) -> Subject {
    Subject {
        id: id.into(),
        name: format!("Subject {id}"),
        priority,
        weekly_hours_by_level_and_grade: Default::default(),
    }
}

pub fn course(id: &str, subjects: &[(&str, u32)]) -> Course {
    Course {
        id: id.into(),
        level: "Secundario".into(),
        grade: "Segundo".into(),
        section: id.to_uppercase(),
        homeroom_teacher_id: None,
        course_subjects: subjects
            .iter()
            .map(|(s, h)| CourseSubject {
                subject_id: s.to_string(),
                weekly_hours: Some(*h),
            })
            .collect(),
    }
}

pub fn with_homeroom(mut c: Course, teacher: &str) -> Course {
    c.homeroom_teacher_id = Some(teacher.into());
    c
}

/// A school of moderate size with random routing and restrictions.
pub fn random_school(seed: u64) -> GenerationInput {
    let mut rng = StdRng::seed_from_u64(seed);
    let priorities = [Priority::High, Priority::Medium, Priority::Low];
    let subjects: Vec<Subject> = (0..5)
        .map(|i| subject(&format!("s{i}"), *priorities.choose(&mut rng).unwrap()))
        .collect();
    let course_ids: Vec<String> = (0..4).map(|i| format!("c{i}")).collect();

    let mut teachers: Vec<Teacher> = (0..6).map(|i| teacher(&format!("t{i}"))).collect();
    let mut courses: Vec<Course> = course_ids.iter().map(|id| course(id, &[])).collect();
    for (ci, c) in courses.iter_mut().enumerate() {
        c.homeroom_teacher_id = Some(format!("t{}", ci % teachers.len()));
        for s in &subjects {
            let hours = rng.random_range(1..=5);
            c.course_subjects.push(CourseSubject {
                subject_id: s.id.clone(),
                weekly_hours: Some(hours),
            });
            let t = rng.random_range(0..teachers.len());
            match teachers[t]
                .subjects_taught
                .iter_mut()
                .find(|st| st.subject_id == s.id)
            {
                Some(st) => st.course_ids.push(c.id.clone()),
                None => teachers[t].subjects_taught.push(SubjectAssignment {
                    subject_id: s.id.clone(),
                    weekly_hours_assigned: hours,
                    course_ids: vec![c.id.clone()],
                }),
            }
        }
    }
    for t in teachers.iter_mut() {
        for _ in 0..rng.random_range(0..3) {
            let day = *Day::ALL.choose(&mut rng).unwrap();
            let start = 8 * 60 + rng.random_range(0..8u16) * 30;
            t.restrictions.push(Restriction {
                id: String::new(),
                day,
                start_time: ClockTime::new(start / 60, start % 60).unwrap(),
                end_time: ClockTime::new((start + 60) / 60, (start + 60) % 60).unwrap(),
                reason: "random".into(),
            });
        }
    }

    GenerationInput {
        teachers,
        subjects,
        courses,
        time_slots: slots(6),
        seed: Some(seed),
    }
}

pub fn lesson_cells(output: &GenerationOutput, course_id: &str) -> Vec<(Day, String, String)> {
    let schedule = output
        .course_schedules
        .iter()
        .find(|c| c.course_id == course_id)
        .unwrap();
    schedule
        .schedule
        .iter()
        .flat_map(|(day, row)| {
            row.iter().filter_map(move |(slot, cell)| match cell {
                Some(CourseCell::Lesson(e)) => Some((*day, slot.clone(), e.teacher_id.clone())),
                _ => None,
            })
        })
        .collect()
}

/// Checks every schedule invariant, panicking with a description on failure.
pub fn assert_invariants(input: &GenerationInput, output: &GenerationOutput, cap: usize, spread: usize) {
    let slot_by_id: HashMap<&str, &TimeSlot> =
        input.time_slots.iter().map(|s| (s.id.as_str(), s)).collect();
    let teacher_by_id: HashMap<&str, &Teacher> =
        input.teachers.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut booked: HashSet<(Day, &str, &str)> = HashSet::new();
    let mut load: HashMap<(&str, Day), usize> = HashMap::new();
    let mut spread_days: HashMap<(&str, &str), HashSet<Day>> = HashMap::new();

    for cs in &output.course_schedules {
        for (day, row) in &cs.schedule {
            for (slot_id, cell) in row {
                let Some(entry) = cell.as_ref().and_then(CourseCell::entry) else {
                    continue;
                };
                let teacher = entry.teacher_id.as_str();
                assert!(
                    booked.insert((*day, slot_id.as_str(), teacher)),
                    "{teacher} double-booked on {day} {slot_id}"
                );
                *load.entry((teacher, *day)).or_default() += 1;

                let slot = slot_by_id[slot_id.as_str()];
                for r in &teacher_by_id[teacher].restrictions {
                    assert!(
                        !(r.day == *day && slot.overlaps(r.start_time, r.end_time)),
                        "{teacher} placed inside a restriction on {day} {slot_id}"
                    );
                }

                if let Some(CourseCell::Lesson(_)) = cell {
                    spread_days
                        .entry((entry.subject_id.as_str(), slot_id.as_str()))
                        .or_default()
                        .insert(*day);
                }

                let mirrored = output
                    .teacher_schedules
                    .iter()
                    .find(|ts| ts.teacher_id == teacher)
                    .and_then(|ts| ts.schedule[day][slot_id].as_ref())
                    .unwrap_or_else(|| panic!("{teacher} has no cell for {day} {slot_id}"));
                assert_eq!(mirrored.entry().course_id, cs.course_id);
                assert_eq!(mirrored.entry().subject_id, entry.subject_id);
            }
        }
    }

    for ((teacher, day), n) in &load {
        assert!(*n <= cap, "{teacher} has {n} hours on {day}");
    }
    for ((subject, slot), days) in &spread_days {
        assert!(days.len() <= spread, "{subject} at {slot} on {} days", days.len());
    }

    // Reverse direction: every teacher cell is backed by a course cell.
    for ts in &output.teacher_schedules {
        for (day, row) in &ts.schedule {
            for (slot_id, cell) in row {
                let Some(cell) = cell else { continue };
                let entry = cell.entry();
                let course_cell = output
                    .course_schedules
                    .iter()
                    .find(|cs| cs.course_id == entry.course_id)
                    .and_then(|cs| cs.schedule[day][slot_id].as_ref())
                    .and_then(CourseCell::entry)
                    .unwrap_or_else(|| panic!("orphan teacher cell for {} on {day}", ts.teacher_id));
                assert_eq!(course_cell.teacher_id, ts.teacher_id);
                if entry.subject_id != PEDAGOGICAL_SUBJECT_ID {
                    assert_eq!(course_cell.subject_id, entry.subject_id);
                }
            }
        }
    }
}
