//! services/console/src/stores/schools.rs
//!
//! The school collection, visible to the oversight role only (enforced by
//! the view layer; the remote API rejects other roles anyway).

use school_console_core::domain::School;

use super::resource::ResourceStore;

pub type SchoolStore = ResourceStore<School>;

impl ResourceStore<School> {
    /// Number of registered schools in the district.
    pub fn school_count(&self) -> usize {
        self.len()
    }
}
