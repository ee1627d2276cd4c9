pub mod domain;
pub mod ports;
pub mod token;
pub mod views;

pub use domain::{
    Claims, Class, ImportReport, LoginCredentials, NewClass, NewSchool, NewStudent,
    PersistedSession, Role, School, SchoolAccount, SchoolPatch, Student, StudentFilters,
    StudentPatch, Summary, Teacher, TeacherForm,
};
pub use ports::{
    AuthApi, CollectionApi, NoFilters, PortError, PortResult, QueryFilters, ReportsApi,
    Resource, SessionVault,
};
pub use token::TokenError;
pub use views::StudentWithClass;
