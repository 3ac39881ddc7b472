use crate::config::GenerationConfig;
use crate::data::{Day, GenerationInput, GenerationOutput, Issue, IssueKind};
use crate::error::GenerationError;
use crate::fill::fill_pedagogical_hours;
use crate::pool::{PlacementUnit, build_pool};
use crate::restriction::is_available;
use crate::schedule::{Catalog, Ledger, Placement, PlacementKind};
use crate::validation::validate;
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Cooperative cancellation flag shared between a run and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), GenerationError> {
        if self.is_cancelled() {
            Err(GenerationError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Reported after each course has been processed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub course_id: String,
    pub course_name: String,
    pub placed_count: usize,
}

#[derive(Debug, Default)]
pub struct PlacementOutcome {
    pub placed: usize,
    pub failures: Vec<Issue>,
}

/// Whether `teacher` can take one more hour at (`day`, `slot`): not already
/// booked anywhere, not restricted, and under the daily cap.
pub(crate) fn teacher_is_free(
    catalog: &Catalog<'_>,
    config: &GenerationConfig,
    ledger: &Ledger,
    teacher: usize,
    day: Day,
    slot: usize,
) -> bool {
    !ledger.is_teacher_busy(teacher, day, slot)
        && is_available(&catalog.teachers[teacher], day, catalog.slots[slot])
        && ledger.teacher_load(teacher, day) < config.daily_load_cap
}

/// Randomised best-effort placement of pool units into the shared ledger.
///
/// Committed units are never undone to make room for later ones. With
/// `displacement` enabled, a unit that finds no open cell may move one
/// lesson of the same course elsewhere, spending one attempt per candidate.
pub struct PlacementEngine<'r, R> {
    catalog: &'r Catalog<'r>,
    config: &'r GenerationConfig,
    rng: R,
}

impl<'r, R: Rng> PlacementEngine<'r, R> {
    pub fn new(catalog: &'r Catalog<'r>, config: &'r GenerationConfig, rng: R) -> Self {
        Self {
            catalog,
            config,
            rng,
        }
    }

    pub fn place(&mut self, pool: &[PlacementUnit], ledger: &mut Ledger) -> PlacementOutcome {
        let budget = self.config.attempt_budget(pool.len());
        let mut outcome = PlacementOutcome::default();

        for unit in pool {
            if self.place_unit(unit, ledger, budget) {
                outcome.placed += 1;
            } else {
                let issue = self.shortfall(unit);
                warn!("{}", issue);
                outcome.failures.push(issue);
            }
        }
        outcome
    }

    fn shortfall(&self, unit: &PlacementUnit) -> Issue {
        let course = &self.catalog.courses[unit.course];
        let subject = &self.catalog.subjects[unit.subject];
        let teacher = &self.catalog.teachers[unit.teacher];
        Issue::new(
            IssueKind::PlacementShortfall,
            format!(
                "Could not place 1 hour of {} for {} (teacher {}).",
                subject.name,
                self.catalog.course_name(unit.course),
                teacher.full_name
            ),
        )
        .with_course(&course.id)
        .with_subject(&subject.id)
        .with_teacher(&teacher.id)
    }

    /// Days and slots each shuffled independently, visited day-major.
    fn shuffled_grid(&mut self) -> Vec<(Day, usize)> {
        let mut days = Day::ALL;
        let mut slots: Vec<usize> = (0..self.catalog.slot_count()).collect();
        days.shuffle(&mut self.rng);
        slots.shuffle(&mut self.rng);
        days.iter()
            .flat_map(|&d| slots.iter().map(move |&s| (d, s)))
            .collect()
    }

    fn can_place(
        &self,
        ledger: &Ledger,
        course: usize,
        teacher: usize,
        subject: usize,
        day: Day,
        slot: usize,
    ) -> bool {
        ledger.is_course_cell_open(course, day, slot)
            && teacher_is_free(self.catalog, self.config, ledger, teacher, day, slot)
            && ledger.spread_allows(subject, day, slot, self.config.spread_limit)
    }

    fn place_unit(&mut self, unit: &PlacementUnit, ledger: &mut Ledger, budget: usize) -> bool {
        let order = self.shuffled_grid();

        // A scan covers the whole grid, so reshuffling cannot change its verdict.
        if let Some(&(day, slot)) = order
            .iter()
            .find(|&&(d, s)| self.can_place(ledger, unit.course, unit.teacher, unit.subject, d, s))
        {
            ledger.commit(Placement {
                course: unit.course,
                teacher: unit.teacher,
                day,
                slot,
                kind: PlacementKind::Lesson {
                    subject: unit.subject,
                },
            });
            trace!(
                "Placed {} for course {} on {} slot {}",
                self.catalog.subjects[unit.subject].id, unit.course, day, slot
            );
            return true;
        }

        if !self.config.displacement {
            return false;
        }

        let mut attempts = 0;
        for &(day, slot) in &order {
            if attempts >= budget {
                break;
            }
            let Some(blocker) = ledger.course_cell(unit.course, day, slot) else {
                continue;
            };
            if ledger.placement(blocker).subject().is_none()
                || !teacher_is_free(self.catalog, self.config, ledger, unit.teacher, day, slot)
                || !ledger.spread_allows(unit.subject, day, slot, self.config.spread_limit)
            {
                continue;
            }
            attempts += 1;

            if !self.displace(ledger, blocker) {
                continue;
            }
            if self.can_place(ledger, unit.course, unit.teacher, unit.subject, day, slot) {
                ledger.commit(Placement {
                    course: unit.course,
                    teacher: unit.teacher,
                    day,
                    slot,
                    kind: PlacementKind::Lesson {
                        subject: unit.subject,
                    },
                });
                debug!(
                    "Placed {} for course {} on {} slot {} after displacement",
                    self.catalog.subjects[unit.subject].id, unit.course, day, slot
                );
                return true;
            }
            ledger.relocate(blocker, day, slot);
        }
        false
    }

    /// Moves a lesson to another open cell of its course.
    fn displace(&mut self, ledger: &mut Ledger, idx: usize) -> bool {
        let p = ledger.placement(idx);
        let Some(subject) = p.subject() else {
            return false;
        };
        let order = self.shuffled_grid();
        let target = order.into_iter().find(|&(d, s)| {
            (d, s) != (p.day, p.slot) && self.can_place(ledger, p.course, p.teacher, subject, d, s)
        });
        match target {
            Some((day, slot)) => {
                trace!(
                    "Moving placement {} from {} slot {} to {} slot {}",
                    idx, p.day, p.slot, day, slot
                );
                ledger.relocate(idx, day, slot);
                true
            }
            None => false,
        }
    }
}

/// A single generation run: validation, per-course placement, pedagogical
/// fill-in and packaging. All mutable state lives inside `run`.
pub struct Generator<'a> {
    input: &'a GenerationInput,
    config: GenerationConfig,
    cancel: CancelToken,
    progress: Option<Box<dyn FnMut(&Progress) + 'a>>,
}

impl<'a> Generator<'a> {
    pub fn new(input: &'a GenerationInput, config: GenerationConfig) -> Self {
        Self {
            input,
            config,
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn on_progress(mut self, callback: impl FnMut(&Progress) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn run(mut self) -> Result<GenerationOutput, GenerationError> {
        let start_time = Instant::now();
        let input = self.input;
        info!(
            "Starting generation with {} courses, {} teachers, {} subjects and {} time slots",
            input.courses.len(),
            input.teachers.len(),
            input.subjects.len(),
            input.time_slots.len()
        );
        self.cancel.check()?;

        let report = validate(
            &input.courses,
            &input.teachers,
            &input.subjects,
            &input.time_slots,
        );
        if report.is_blocking() {
            for error in &report.missing_teacher_by_subject_in_course {
                warn!("{}", error);
            }
            return Ok(GenerationOutput::blocked(report.errors(), report.warnings()));
        }

        let catalog = Catalog::new(input)?;
        let rng = match input.seed.or(self.config.seed) {
            Some(seed) => {
                debug!("Using seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };
        let mut ledger = Ledger::for_catalog(&catalog);
        let mut warnings = report.warnings();
        let mut engine = PlacementEngine::new(&catalog, &self.config, rng);
        let total = catalog.courses.len();

        for course in 0..total {
            self.cancel.check()?;
            let pool = build_pool(course, &catalog, &report)?;
            let outcome = engine.place(&pool, &mut ledger);
            info!(
                "Processed {} ({}/{}): {} of {} hours placed",
                catalog.course_name(course),
                course + 1,
                total,
                outcome.placed,
                pool.len()
            );
            warnings.extend(outcome.failures);

            if let Some(callback) = self.progress.as_mut() {
                callback(&Progress {
                    completed: course + 1,
                    total,
                    course_id: catalog.courses[course].id.clone(),
                    course_name: catalog.course_name(course).to_string(),
                    placed_count: ledger.lesson_count(),
                });
            }
        }

        self.cancel.check()?;
        for course in 0..total {
            fill_pedagogical_hours(&catalog, &self.config, &mut ledger, course)?;
        }
        self.cancel.check()?;

        let output = GenerationOutput {
            success: true,
            placed_count: ledger.lesson_count(),
            errors: Vec::new(),
            warnings,
            course_schedules: ledger.course_views(&catalog),
            teacher_schedules: ledger.teacher_views(&catalog),
        };
        info!(
            "Generation finished in {:.2?}: {} hours placed, {} warnings",
            start_time.elapsed(),
            output.placed_count,
            output.warnings.len()
        );
        Ok(output)
    }
}

/// Runs a generation with no progress reporting or cancellation.
pub fn solve(
    input: &GenerationInput,
    config: &GenerationConfig,
) -> Result<GenerationOutput, GenerationError> {
    Generator::new(input, config.clone()).run()
}
