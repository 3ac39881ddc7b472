use crate::data::{Day, Teacher, TimeSlot};

/// Whether `teacher` may be scheduled at `slot` on `day`.
///
/// Every restriction is examined; the list is unordered and may mix days.
pub fn is_available(teacher: &Teacher, day: Day, slot: &TimeSlot) -> bool {
    !teacher
        .restrictions
        .iter()
        .any(|r| r.day == day && slot.overlaps(r.start_time, r.end_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Restriction;

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot {
            id: format!("{start}-{end}"),
            name: start.to_string(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
        }
    }

    fn teacher_with(restrictions: Vec<(Day, &str, &str)>) -> Teacher {
        Teacher {
            id: "t1".into(),
            full_name: "Teacher One".into(),
            teacher_type: Default::default(),
            subjects_taught: vec![],
            restrictions: restrictions
                .into_iter()
                .map(|(day, start, end)| Restriction {
                    id: String::new(),
                    day,
                    start_time: start.parse().unwrap(),
                    end_time: end.parse().unwrap(),
                    reason: String::new(),
                })
                .collect(),
            homeroom_course_id: None,
            qualified_levels: vec![],
            qualified_grades: vec![],
            qualified_sections: vec![],
        }
    }

    #[test]
    fn test_unrestricted_teacher_is_available() {
        let t = teacher_with(vec![]);
        assert!(is_available(&t, Day::Monday, &slot("08:00", "08:45")));
    }

    #[test]
    fn test_overlapping_window_blocks_slot() {
        let t = teacher_with(vec![(Day::Monday, "08:00", "09:00")]);
        assert!(!is_available(&t, Day::Monday, &slot("08:00", "08:45")));
        assert!(!is_available(&t, Day::Monday, &slot("08:45", "09:30")));
        assert!(is_available(&t, Day::Monday, &slot("09:00", "09:45")));
        assert!(is_available(&t, Day::Tuesday, &slot("08:00", "08:45")));
    }

    #[test]
    fn test_later_entries_are_checked_after_other_days() {
        let t = teacher_with(vec![
            (Day::Friday, "12:00", "13:00"),
            (Day::Tuesday, "07:00", "08:00"),
            (Day::Wednesday, "10:00", "10:30"),
        ]);
        assert!(!is_available(&t, Day::Wednesday, &slot("09:45", "10:15")));
        assert!(is_available(&t, Day::Wednesday, &slot("10:30", "11:15")));
    }
}
