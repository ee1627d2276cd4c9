//! crates/school_console_core/src/views.rs
//!
//! Derived views over cached collections: joins, filters, and aggregates.
//! Every function here is pure and recomputed from the current cache on
//! each call — derived data is never stored, so it can never go stale.

use crate::domain::{Class, Student, Teacher};

/// Display value for a student whose class id matches no known class.
pub const UNASSIGNED_CLASS: &str = "unassigned";

/// A student with its class resolved by numeric-id join.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentWithClass {
    pub student: Student,
    pub class: Option<Class>,
}

impl StudentWithClass {
    /// The class name for display, or the unassigned sentinel. Never fails.
    pub fn class_name(&self) -> &str {
        self.class
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(UNASSIGNED_CLASS)
    }
}

/// Resolves a student's class by scanning `classes` for a numeric id match.
pub fn attach_class(student: &Student, classes: &[Class]) -> StudentWithClass {
    let class = classes
        .iter()
        .find(|c| c.numeric_id() == Some(student.class_id))
        .cloned();
    StudentWithClass {
        student: student.clone(),
        class,
    }
}

/// Joins every student against the class cache.
pub fn attach_classes(students: &[Student], classes: &[Class]) -> Vec<StudentWithClass> {
    students
        .iter()
        .map(|s| attach_class(s, classes))
        .collect()
}

/// Classes ordered by ascending grade. Ties keep their fetch order.
pub fn classes_by_grade(classes: &[Class]) -> Vec<Class> {
    let mut sorted = classes.to_vec();
    sorted.sort_by_key(|c| c.grade);
    sorted
}

/// The distinct grades present in the class cache, ascending.
pub fn unique_grades(classes: &[Class]) -> Vec<i64> {
    let mut grades: Vec<i64> = classes.iter().map(|c| c.grade).collect();
    grades.sort_unstable();
    grades.dedup();
    grades
}

/// Case-insensitive name search combined with an exact subject match.
pub fn filter_teachers(teachers: &[Teacher], search: &str, subject: Option<&str>) -> Vec<Teacher> {
    let needle = search.to_lowercase();
    teachers
        .iter()
        .filter(|t| t.full_name.to_lowercase().contains(&needle))
        .filter(|t| subject.map_or(true, |s| t.subject == s))
        .cloned()
        .collect()
}

/// The distinct subjects taught, sorted alphabetically.
pub fn unique_subjects(teachers: &[Teacher]) -> Vec<String> {
    let mut subjects: Vec<String> = teachers.iter().map(|t| t.subject.clone()).collect();
    subjects.sort();
    subjects.dedup();
    subjects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(id: &str, name: &str, grade: i64) -> Class {
        Class {
            id: id.to_string(),
            name: name.to_string(),
            grade,
            academic_year: "2025/2026".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn student(id: i64, name: &str, class_id: i64) -> Student {
        Student {
            id,
            full_name: name.to_string(),
            class_id,
            address: None,
            birth_date: None,
            gender: None,
            note: None,
            phone: None,
            school_id: None,
            created_at: None,
        }
    }

    fn teacher(id: i64, name: &str, subject: &str) -> Teacher {
        Teacher {
            id,
            full_name: name.to_string(),
            phone: String::new(),
            position: "teacher".to_string(),
            subject: subject.to_string(),
            category: None,
            education: None,
            note: None,
            ped_experience: None,
            total_experience: None,
            work_start: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn join_matches_numeric_class_ids() {
        let classes = vec![class("3", "3-А", 3), class("11", "11-Б", 11)];
        let joined = attach_class(&student(1, "Иванов Иван", 11), &classes);
        assert_eq!(joined.class_name(), "11-Б");
    }

    #[test]
    fn join_without_match_yields_unassigned_sentinel() {
        let classes = vec![class("3", "3-А", 3)];
        let joined = attach_class(&student(1, "Orphan", 99), &classes);
        assert!(joined.class.is_none());
        assert_eq!(joined.class_name(), UNASSIGNED_CLASS);
    }

    #[test]
    fn non_numeric_class_ids_never_match() {
        let classes = vec![class("abc", "Broken", 1)];
        let joined = attach_class(&student(1, "Anyone", 0), &classes);
        assert!(joined.class.is_none());
    }

    #[test]
    fn classes_sort_by_grade_ascending() {
        let classes = vec![class("1", "9-А", 9), class("2", "1-А", 1), class("3", "5-А", 5)];
        let sorted = classes_by_grade(&classes);
        let grades: Vec<i64> = sorted.iter().map(|c| c.grade).collect();
        assert_eq!(grades, vec![1, 5, 9]);
    }

    #[test]
    fn grades_are_deduplicated_and_sorted() {
        let classes = vec![class("1", "9-А", 9), class("2", "9-Б", 9), class("3", "1-А", 1)];
        assert_eq!(unique_grades(&classes), vec![1, 9]);
    }

    #[test]
    fn teacher_search_is_case_insensitive() {
        let teachers = vec![
            teacher(1, "Петрова Анна", "Математика"),
            teacher(2, "Сидоров Павел", "Физика"),
        ];
        let hits = filter_teachers(&teachers, "петрова", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn teacher_filter_combines_search_and_subject() {
        let teachers = vec![
            teacher(1, "Петрова Анна", "Математика"),
            teacher(2, "Петров Борис", "Физика"),
        ];
        let hits = filter_teachers(&teachers, "петров", Some("Физика"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn subjects_are_unique_and_sorted() {
        let teachers = vec![
            teacher(1, "a", "Физика"),
            teacher(2, "b", "Математика"),
            teacher(3, "c", "Физика"),
        ];
        assert_eq!(
            unique_subjects(&teachers),
            vec!["Математика".to_string(), "Физика".to_string()]
        );
    }
}
