//! services/console/src/stores/classes.rs
//!
//! The class collection and its derived views. Views are recomputed from
//! the cache on every call.

use school_console_core::domain::Class;
use school_console_core::views;

use super::resource::ResourceStore;

pub type ClassStore = ResourceStore<Class>;

impl ResourceStore<Class> {
    /// Classes ordered by ascending grade, for the table's default sort.
    pub fn sorted_by_grade(&self) -> Vec<Class> {
        views::classes_by_grade(&self.items())
    }

    /// The distinct grades present, for the grade filter dropdown.
    pub fn unique_grades(&self) -> Vec<i64> {
        views::unique_grades(&self.items())
    }
}
