//! services/console/src/stores/mod.rs
//!
//! The stateful stores: one session store plus one resource store per
//! managed collection. Stores own the caches, mediate every mutation
//! through the ports, and notify subscribers after each committed change.

pub mod classes;
pub mod notify;
pub mod reports;
pub mod resource;
pub mod schools;
pub mod session;
pub mod students;
pub mod teachers;

pub use classes::ClassStore;
pub use notify::SubscriptionId;
pub use reports::ReportsStore;
pub use resource::ResourceStore;
pub use schools::SchoolStore;
pub use session::SessionStore;
pub use students::StudentStore;
pub use teachers::TeacherStore;
