//! Placement ledger for a single generation run.
//!
//! Placements are stored once, in a canonical list. The course grid, the
//! teacher grid (global availability index), the per-teacher daily load and
//! the per-subject slot spread are indices over that list, all maintained by
//! the same write path. Course and teacher schedules are projected from the
//! list when the run is packaged, so the two views cannot disagree.

use crate::data::{
    Course, CourseCell, CourseEntry, CourseSchedule, Day, GenerationInput, Grid, Subject,
    Teacher, TeacherCell, TeacherEntry, TeacherSchedule, TimeSlot,
};
use crate::error::GenerationError;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};

pub const PEDAGOGICAL_SUBJECT_ID: &str = "pedagogical";
pub const PEDAGOGICAL_SUBJECT_NAME: &str = "Pedagogical Hour";

const DAYS: usize = Day::ALL.len();

/// Index-addressable view of the run's input.
#[derive(Debug)]
pub struct Catalog<'a> {
    pub teachers: &'a [Teacher],
    pub subjects: &'a [Subject],
    pub courses: &'a [Course],
    /// Sorted by start time.
    pub slots: Vec<&'a TimeSlot>,
    teacher_index: HashMap<&'a str, usize>,
    subject_index: HashMap<&'a str, usize>,
    course_names: Vec<String>,
}

impl<'a> Catalog<'a> {
    pub fn new(input: &'a GenerationInput) -> Result<Self, GenerationError> {
        if input.time_slots.is_empty() {
            return Err(GenerationError::EmptyGrid);
        }
        Ok(Self {
            teachers: &input.teachers,
            subjects: &input.subjects,
            courses: &input.courses,
            slots: input
                .time_slots
                .iter()
                .sorted_by_key(|s| (s.start_time, s.end_time))
                .collect(),
            teacher_index: input
                .teachers
                .iter()
                .enumerate()
                .map(|(i, t)| (t.id.as_str(), i))
                .collect(),
            subject_index: input
                .subjects
                .iter()
                .enumerate()
                .map(|(i, s)| (s.id.as_str(), i))
                .collect(),
            course_names: input.courses.iter().map(Course::display_name).collect(),
        })
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn teacher_idx(&self, id: &str) -> Result<usize, GenerationError> {
        self.teacher_index
            .get(id)
            .copied()
            .ok_or_else(|| GenerationError::UnknownTeacher(id.to_string()))
    }

    pub fn subject_idx(&self, course_id: &str, id: &str) -> Result<usize, GenerationError> {
        self.subject_index
            .get(id)
            .copied()
            .ok_or_else(|| GenerationError::UnknownSubject {
                course_id: course_id.to_string(),
                subject_id: id.to_string(),
            })
    }

    pub fn course_name(&self, course: usize) -> &str {
        &self.course_names[course]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    Lesson { subject: usize },
    Pedagogical,
}

/// One occupied (course, teacher, day, slot) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub course: usize,
    pub teacher: usize,
    pub day: Day,
    pub slot: usize,
    pub kind: PlacementKind,
}

impl Placement {
    pub fn subject(&self) -> Option<usize> {
        match self.kind {
            PlacementKind::Lesson { subject } => Some(subject),
            PlacementKind::Pedagogical => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ledger {
    slots: usize,
    placements: Vec<Placement>,
    // [course][day][slot] -> placement
    course_cells: Vec<Option<usize>>,
    free_cells: Vec<bool>,
    // [teacher][day][slot] -> placement
    teacher_cells: Vec<Option<usize>>,
    // [teacher][day]
    teacher_load: Vec<u32>,
    // [subject][slot][day] -> lessons
    subject_spread: Vec<u32>,
}

impl Ledger {
    pub fn new(courses: usize, teachers: usize, subjects: usize, slots: usize) -> Self {
        let cells = DAYS * slots;
        Self {
            slots,
            placements: Vec::new(),
            course_cells: vec![None; courses * cells],
            free_cells: vec![false; courses * cells],
            teacher_cells: vec![None; teachers * cells],
            teacher_load: vec![0; teachers * DAYS],
            subject_spread: vec![0; subjects * cells],
        }
    }

    pub fn for_catalog(catalog: &Catalog<'_>) -> Self {
        Self::new(
            catalog.courses.len(),
            catalog.teachers.len(),
            catalog.subjects.len(),
            catalog.slot_count(),
        )
    }

    fn cell(&self, entity: usize, day: Day, slot: usize) -> usize {
        (entity * DAYS + day.index()) * self.slots + slot
    }

    fn spread_cell(&self, subject: usize, slot: usize, day: Day) -> usize {
        (subject * self.slots + slot) * DAYS + day.index()
    }

    pub fn slot_count(&self) -> usize {
        self.slots
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement(&self, idx: usize) -> Placement {
        self.placements[idx]
    }

    pub fn lesson_count(&self) -> usize {
        self.placements
            .iter()
            .filter(|p| matches!(p.kind, PlacementKind::Lesson { .. }))
            .count()
    }

    /// Placement index occupying the course cell, if any.
    pub fn course_cell(&self, course: usize, day: Day, slot: usize) -> Option<usize> {
        self.course_cells[self.cell(course, day, slot)]
    }

    pub fn is_course_cell_open(&self, course: usize, day: Day, slot: usize) -> bool {
        let cell = self.cell(course, day, slot);
        self.course_cells[cell].is_none() && !self.free_cells[cell]
    }

    pub fn is_teacher_busy(&self, teacher: usize, day: Day, slot: usize) -> bool {
        self.teacher_cells[self.cell(teacher, day, slot)].is_some()
    }

    pub fn teacher_load(&self, teacher: usize, day: Day) -> u32 {
        self.teacher_load[teacher * DAYS + day.index()]
    }

    /// Distinct days on which `subject` already occupies `slot`.
    pub fn subject_days_at(&self, subject: usize, slot: usize) -> usize {
        Day::ALL
            .iter()
            .filter(|&&d| self.subject_spread[self.spread_cell(subject, slot, d)] > 0)
            .count()
    }

    /// True when placing `subject` at (`day`, `slot`) keeps it within `limit` distinct days.
    pub fn spread_allows(&self, subject: usize, day: Day, slot: usize, limit: usize) -> bool {
        self.subject_spread[self.spread_cell(subject, slot, day)] > 0
            || self.subject_days_at(subject, slot) < limit
    }

    /// Records a placement in the course cell, the teacher cell and the counters.
    pub fn commit(&mut self, placement: Placement) -> usize {
        let idx = self.placements.len();
        self.placements.push(placement);
        self.index(idx);
        idx
    }

    /// Moves an existing placement to another cell of the same course.
    pub fn relocate(&mut self, idx: usize, day: Day, slot: usize) {
        self.unindex(idx);
        let placement = &mut self.placements[idx];
        placement.day = day;
        placement.slot = slot;
        self.index(idx);
    }

    pub fn mark_free(&mut self, course: usize, day: Day, slot: usize) {
        let cell = self.cell(course, day, slot);
        debug_assert!(self.course_cells[cell].is_none());
        self.free_cells[cell] = true;
    }

    fn index(&mut self, idx: usize) {
        let p = self.placements[idx];
        let course_cell = self.cell(p.course, p.day, p.slot);
        let teacher_cell = self.cell(p.teacher, p.day, p.slot);
        debug_assert!(self.course_cells[course_cell].is_none());
        debug_assert!(self.teacher_cells[teacher_cell].is_none());

        self.course_cells[course_cell] = Some(idx);
        self.teacher_cells[teacher_cell] = Some(idx);
        self.teacher_load[p.teacher * DAYS + p.day.index()] += 1;
        if let Some(subject) = p.subject() {
            let spread = self.spread_cell(subject, p.slot, p.day);
            self.subject_spread[spread] += 1;
        }
    }

    fn unindex(&mut self, idx: usize) {
        let p = self.placements[idx];
        let course_cell = self.cell(p.course, p.day, p.slot);
        let teacher_cell = self.cell(p.teacher, p.day, p.slot);

        self.course_cells[course_cell] = None;
        self.teacher_cells[teacher_cell] = None;
        self.teacher_load[p.teacher * DAYS + p.day.index()] -= 1;
        if let Some(subject) = p.subject() {
            let spread = self.spread_cell(subject, p.slot, p.day);
            self.subject_spread[spread] -= 1;
        }
    }

    fn empty_grid<C>(catalog: &Catalog<'_>) -> Grid<C> {
        Day::ALL
            .iter()
            .map(|&day| {
                let row: BTreeMap<_, Option<C>> =
                    catalog.slots.iter().map(|s| (s.id.clone(), None)).collect();
                (day, row)
            })
            .collect()
    }

    fn subject_label(catalog: &Catalog<'_>, placement: &Placement) -> (String, String) {
        match placement.kind {
            PlacementKind::Lesson { subject } => {
                let subject = &catalog.subjects[subject];
                (subject.id.clone(), subject.name.clone())
            }
            PlacementKind::Pedagogical => (
                PEDAGOGICAL_SUBJECT_ID.to_string(),
                PEDAGOGICAL_SUBJECT_NAME.to_string(),
            ),
        }
    }

    /// Course-centric projection, one schedule per course in input order.
    pub fn course_views(&self, catalog: &Catalog<'_>) -> Vec<CourseSchedule> {
        let mut grids: Vec<Grid<CourseCell>> =
            catalog.courses.iter().map(|_| Self::empty_grid(catalog)).collect();

        for p in &self.placements {
            let (subject_id, subject_name) = Self::subject_label(catalog, p);
            let teacher = &catalog.teachers[p.teacher];
            let entry = CourseEntry {
                subject_id,
                subject_name,
                teacher_id: teacher.id.clone(),
                teacher_name: teacher.full_name.clone(),
                hours: 1,
            };
            let cell = match p.kind {
                PlacementKind::Lesson { .. } => CourseCell::Lesson(entry),
                PlacementKind::Pedagogical => CourseCell::Pedagogical(entry),
            };
            let slot_id = &catalog.slots[p.slot].id;
            if let Some(target) = grids[p.course]
                .get_mut(&p.day)
                .and_then(|row| row.get_mut(slot_id))
            {
                *target = Some(cell);
            }
        }

        for (course, grid) in grids.iter_mut().enumerate() {
            for (&day, row) in grid.iter_mut() {
                for (slot, s) in catalog.slots.iter().enumerate() {
                    if self.free_cells[self.cell(course, day, slot)] {
                        row.insert(s.id.clone(), Some(CourseCell::Free));
                    }
                }
            }
        }

        catalog
            .courses
            .iter()
            .zip(grids)
            .enumerate()
            .map(|(i, (course, schedule))| CourseSchedule {
                course_id: course.id.clone(),
                course_name: catalog.course_name(i).to_string(),
                schedule,
            })
            .collect()
    }

    /// Teacher-centric projection, one schedule per teacher in input order.
    pub fn teacher_views(&self, catalog: &Catalog<'_>) -> Vec<TeacherSchedule> {
        let mut grids: Vec<Grid<TeacherCell>> = catalog
            .teachers
            .iter()
            .map(|_| Self::empty_grid(catalog))
            .collect();

        for p in &self.placements {
            let (subject_id, subject_name) = Self::subject_label(catalog, p);
            let entry = TeacherEntry {
                subject_id,
                subject_name,
                course_id: catalog.courses[p.course].id.clone(),
                course_name: catalog.course_name(p.course).to_string(),
            };
            let cell = match p.kind {
                PlacementKind::Lesson { .. } => TeacherCell::Lesson(entry),
                PlacementKind::Pedagogical => TeacherCell::Pedagogical(entry),
            };
            let slot_id = &catalog.slots[p.slot].id;
            if let Some(target) = grids[p.teacher]
                .get_mut(&p.day)
                .and_then(|row| row.get_mut(slot_id))
            {
                *target = Some(cell);
            }
        }

        catalog
            .teachers
            .iter()
            .zip(grids)
            .map(|(teacher, schedule)| TeacherSchedule {
                teacher_id: teacher.id.clone(),
                teacher_name: teacher.full_name.clone(),
                schedule,
            })
            .collect()
    }
}
