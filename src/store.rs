use crate::data::{CourseSchedule, TeacherSchedule};
use serde::Serialize;
use std::sync::RwLock;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSchedules {
    pub course_schedules: Vec<CourseSchedule>,
    pub teacher_schedules: Vec<TeacherSchedule>,
}

/// Destination for the schedules of a completed run. Each save replaces
/// whatever an earlier run stored.
pub trait ScheduleStore: Send + Sync {
    fn save(&self, schedules: StoredSchedules);
    fn load(&self) -> Option<StoredSchedules>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Option<StoredSchedules>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleStore for MemoryStore {
    fn save(&self, schedules: StoredSchedules) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(schedules);
    }

    fn load(&self) -> Option<StoredSchedules> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str) -> CourseSchedule {
        CourseSchedule {
            course_id: id.into(),
            course_name: id.into(),
            schedule: Default::default(),
        }
    }

    #[test]
    fn test_save_replaces_previous_run() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());

        store.save(StoredSchedules {
            course_schedules: vec![course("a"), course("b")],
            teacher_schedules: vec![],
        });
        store.save(StoredSchedules {
            course_schedules: vec![course("c")],
            teacher_schedules: vec![],
        });

        let stored = store.load().unwrap();
        assert_eq!(stored.course_schedules.len(), 1);
        assert_eq!(stored.course_schedules[0].course_id, "c");
    }
}
