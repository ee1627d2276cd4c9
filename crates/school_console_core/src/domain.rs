//! crates/school_console_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or storage format; the
//! REST adapter owns the wire-level record types and maps into these.

use serde::{Deserialize, Serialize};

use crate::ports::{QueryFilters, Resource};

//=========================================================================================
// Session & Authentication Types
//=========================================================================================

/// The closed set of roles the remote authority issues.
///
/// `Oversight` ("roo" on the wire) sees every school in the district;
/// `School` is the standard single-school account. Any other role string in
/// a token is treated as a decode failure rather than mapped to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "roo")]
    Oversight,
    #[serde(rename = "school")]
    School,
}

impl Role {
    /// The exact string the remote API uses for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Oversight => "roo",
            Role::School => "school",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The claims embedded in the middle segment of a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
    pub role: Role,
    pub user_id: i64,
    /// Display name of the school the account belongs to. Absent for
    /// oversight accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
}

/// Credentials submitted to the login endpoint.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// The durable mirror of an authenticated session: the token itself, the
/// role for display continuity, and the optional school name. Everything
/// else is re-derived from the token on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
}

//=========================================================================================
// Managed Entities
//=========================================================================================

/// The provisioned login account embedded in a school record.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolAccount {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// A school managed by the oversight account.
#[derive(Debug, Clone, PartialEq)]
pub struct School {
    pub id: String,
    pub name: String,
    pub director: String,
    pub class_count: i64,
    pub student_count: i64,
    pub user_id: i64,
    pub account: Option<SchoolAccount>,
    pub created_at: String,
}

/// Payload for registering a new school. The server provisions the account
/// and responds with the full `School` record.
#[derive(Debug, Clone)]
pub struct NewSchool {
    pub director: String,
    pub email: String,
    pub name: String,
}

/// Partial update for a school; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SchoolPatch {
    pub name: Option<String>,
    pub director: Option<String>,
    pub email: Option<String>,
}

/// A class within a school.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub grade: i64,
    pub academic_year: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Class {
    /// Class ids arrive as strings but students reference them numerically.
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.parse().ok()
    }
}

/// Payload for creating or updating a class.
#[derive(Debug, Clone)]
pub struct NewClass {
    pub name: String,
    pub grade: i64,
}

/// A student enrolled in a class.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: i64,
    pub full_name: String,
    pub class_id: i64,
    pub address: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub note: Option<String>,
    pub phone: Option<String>,
    pub school_id: Option<i64>,
    pub created_at: Option<String>,
}

/// Payload for enrolling a student.
#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub full_name: String,
    pub class_id: i64,
    pub address: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub note: Option<String>,
    pub phone: Option<String>,
    pub school_id: Option<i64>,
}

/// Partial update for a student; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub full_name: Option<String>,
    pub class_id: Option<i64>,
    pub address: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub note: Option<String>,
    pub phone: Option<String>,
}

/// Server-side filters for the student list. Empty fields are omitted from
/// the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilters {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub class_id: Option<i64>,
    pub grade_from: Option<i64>,
    pub grade_to: Option<i64>,
    pub age_from: Option<i64>,
    pub age_to: Option<i64>,
}

/// A teacher (staff member) at a school.
#[derive(Debug, Clone, PartialEq)]
pub struct Teacher {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub position: String,
    pub subject: String,
    pub category: Option<String>,
    pub education: Option<String>,
    pub note: Option<String>,
    pub ped_experience: Option<i64>,
    pub total_experience: Option<i64>,
    pub work_start: Option<String>,
    pub created_at: String,
}

/// Payload for creating or updating a teacher.
#[derive(Debug, Clone, Default)]
pub struct TeacherForm {
    pub full_name: String,
    pub phone: String,
    pub position: String,
    pub subject: String,
    pub category: Option<String>,
    pub education: Option<String>,
    pub note: Option<String>,
    pub ped_experience: Option<i64>,
    pub total_experience: Option<i64>,
    pub work_start: Option<String>,
}

//=========================================================================================
// Reports & Imports
//=========================================================================================

/// Aggregate counts from the statistics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub students: i64,
    pub teachers: i64,
    pub classes: i64,
    pub schools: i64,
}

/// Result of a spreadsheet bulk import.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportReport {
    pub imported: u64,
}

//=========================================================================================
// Resource Wiring
//=========================================================================================

impl QueryFilters for StudentFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = non_empty(&self.full_name) {
            pairs.push(("full_name", v));
        }
        if let Some(v) = non_empty(&self.gender) {
            pairs.push(("gender", v));
        }
        if let Some(v) = self.class_id {
            pairs.push(("class_id", v.to_string()));
        }
        if let Some(v) = self.grade_from {
            pairs.push(("grade_from", v.to_string()));
        }
        if let Some(v) = self.grade_to {
            pairs.push(("grade_to", v.to_string()));
        }
        if let Some(v) = self.age_from {
            pairs.push(("age_from", v.to_string()));
        }
        if let Some(v) = self.age_to {
            pairs.push(("age_to", v.to_string()));
        }
        pairs
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

impl Resource for School {
    type Id = String;
    type Create = NewSchool;
    type Update = SchoolPatch;
    type Filters = crate::ports::NoFilters;

    const NAME: &'static str = "school";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Resource for Class {
    type Id = String;
    type Create = NewClass;
    type Update = NewClass;
    type Filters = crate::ports::NoFilters;

    const NAME: &'static str = "class";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Resource for Student {
    type Id = i64;
    type Create = NewStudent;
    type Update = StudentPatch;
    type Filters = StudentFilters;

    const NAME: &'static str = "student";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for Teacher {
    type Id = i64;
    type Create = TeacherForm;
    type Update = TeacherForm;
    type Filters = crate::ports::NoFilters;

    const NAME: &'static str = "teacher";

    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_filters_skip_empty_and_blank_fields() {
        let filters = StudentFilters {
            full_name: Some("  ".to_string()),
            gender: Some("male".to_string()),
            class_id: Some(7),
            ..Default::default()
        };
        let pairs = filters.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("gender", "male".to_string()),
                ("class_id", "7".to_string())
            ]
        );
    }

    #[test]
    fn default_student_filters_produce_no_query() {
        assert!(StudentFilters::default().query_pairs().is_empty());
    }

    #[test]
    fn role_round_trips_through_its_wire_string() {
        let json = serde_json::to_string(&Role::Oversight).unwrap();
        assert_eq!(json, "\"roo\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Oversight);
    }
}
