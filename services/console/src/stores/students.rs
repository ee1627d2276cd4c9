//! services/console/src/stores/students.rs
//!
//! The student collection and the student-to-class join. The join scans
//! the class cache by numeric id and falls back to an "unassigned"
//! sentinel; it never fails.

use school_console_core::domain::Student;
use school_console_core::views::{self, StudentWithClass};

use super::classes::ClassStore;
use super::resource::ResourceStore;

pub type StudentStore = ResourceStore<Student>;

impl ResourceStore<Student> {
    /// Every cached student joined against the class cache.
    pub fn with_classes(&self, classes: &ClassStore) -> Vec<StudentWithClass> {
        views::attach_classes(&self.items(), &classes.items())
    }

    /// One student joined against the class cache, if cached.
    pub fn find_with_class(&self, id: i64, classes: &ClassStore) -> Option<StudentWithClass> {
        self.get(&id)
            .map(|student| views::attach_class(&student, &classes.items()))
    }
}
