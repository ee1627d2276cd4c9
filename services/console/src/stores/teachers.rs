//! services/console/src/stores/teachers.rs
//!
//! The teacher (staff) collection. Search and subject filtering are
//! client-side views over the cache, unlike the server-side student
//! filters.

use school_console_core::domain::Teacher;
use school_console_core::views;

use super::resource::ResourceStore;

pub type TeacherStore = ResourceStore<Teacher>;

impl ResourceStore<Teacher> {
    /// Case-insensitive name search combined with an exact subject match.
    pub fn filtered(&self, search: &str, subject: Option<&str>) -> Vec<Teacher> {
        views::filter_teachers(&self.items(), search, subject)
    }

    /// The distinct subjects taught, for the subject filter dropdown.
    pub fn unique_subjects(&self) -> Vec<String> {
        views::unique_subjects(&self.items())
    }
}
