use crate::config::GenerationConfig;
use crate::data::Day;
use crate::error::GenerationError;
use crate::schedule::{Catalog, Ledger, Placement, PlacementKind};
use crate::solver::teacher_is_free;
use itertools::Itertools;
use log::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FillOutcome {
    pub pedagogical: usize,
    pub free: usize,
}

/// Teachers who may supervise a course: the homeroom teacher first, then
/// teachers with a subject routed to it, in input order.
pub fn supervising_teachers(
    catalog: &Catalog<'_>,
    course: usize,
) -> Result<Vec<usize>, GenerationError> {
    let c = &catalog.courses[course];
    let mut candidates = Vec::new();
    if let Some(id) = c.homeroom_teacher() {
        candidates.push(catalog.teacher_idx(id)?);
    }
    candidates.extend(
        catalog
            .teachers
            .iter()
            .positions(|t| t.homeroom_course_id.as_deref() == Some(c.id.as_str())),
    );
    candidates.extend(catalog.teachers.iter().positions(|t| t.serves(&c.id)));
    Ok(candidates.into_iter().unique().collect())
}

/// Covers every open cell of `course` with a pedagogical hour from the first
/// free supervising teacher, or marks it as a free period.
pub fn fill_pedagogical_hours(
    catalog: &Catalog<'_>,
    config: &GenerationConfig,
    ledger: &mut Ledger,
    course: usize,
) -> Result<FillOutcome, GenerationError> {
    let teachers = supervising_teachers(catalog, course)?;
    let mut outcome = FillOutcome::default();

    for day in Day::ALL {
        for slot in 0..catalog.slot_count() {
            if !ledger.is_course_cell_open(course, day, slot) {
                continue;
            }
            let supervisor = teachers
                .iter()
                .copied()
                .find(|&t| teacher_is_free(catalog, config, ledger, t, day, slot));
            match supervisor {
                Some(teacher) => {
                    ledger.commit(Placement {
                        course,
                        teacher,
                        day,
                        slot,
                        kind: PlacementKind::Pedagogical,
                    });
                    outcome.pedagogical += 1;
                }
                None => {
                    ledger.mark_free(course, day, slot);
                    outcome.free += 1;
                }
            }
        }
    }

    debug!(
        "Filled {}: {} pedagogical hours, {} free periods",
        catalog.course_name(course),
        outcome.pedagogical,
        outcome.free
    );
    Ok(outcome)
}
