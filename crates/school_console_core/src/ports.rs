//! crates/school_console_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete HTTP transport and session persistence.

use async_trait::async_trait;

use crate::domain::{ImportReport, LoginCredentials, PersistedSession, Summary};
use crate::token::TokenError;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// Every failure is recovered at a store boundary: stores translate these
/// into an `error` message field and a typed `Result`; nothing propagates
/// to the view layer as an uncaught fault.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Bad credentials or a non-2xx response from the login endpoint.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The login endpoint returned a token we cannot decode. A trusted
    /// endpoint handing out garbage is a server contract violation.
    #[error("login returned an invalid token: {0}")]
    InvalidToken(#[source] TokenError),

    /// An operation was attempted with no valid bearer token. Raised before
    /// any network call is made.
    #[error("not authenticated")]
    Unauthenticated,

    /// A resource endpoint answered with a non-2xx status.
    #[error("remote call failed: HTTP {status}")]
    Remote { status: u16 },

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// A catch-all for any other unexpected errors (e.g. session vault IO).
    #[error("an unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// The Generic Collection Contract
//=========================================================================================

/// Builds the query-string pairs for a list request. Empty and blank fields
/// must be omitted entirely.
pub trait QueryFilters: Send + Sync {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

/// Filters for collections whose list endpoint takes no parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoFilters;

impl QueryFilters for NoFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// A remotely owned collection entity. One implementation per managed
/// entity (schools, classes, students, teachers); the resource stores and
/// the REST adapter are written once against this contract.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Server-assigned identifier.
    type Id: Clone + PartialEq + std::fmt::Display + Send + Sync;
    /// Payload accepted by the create endpoint.
    type Create: Send + Sync;
    /// Payload accepted by the update endpoint.
    type Update: Send + Sync;
    /// Server-side list filters.
    type Filters: QueryFilters + Default + Clone;

    /// Short lowercase name used in log lines and error messages.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a bearer token. Non-2xx responses map to
    /// `PortError::AuthenticationFailed`; the token is returned raw and is
    /// decoded by the caller.
    async fn login(&self, credentials: &LoginCredentials) -> PortResult<String>;
}

/// The remote CRUD surface of one collection. Every call carries the bearer
/// token; implementations must map non-2xx statuses to `PortError::Remote`.
#[async_trait]
pub trait CollectionApi<R: Resource>: Send + Sync {
    async fn list(&self, token: &str, filters: &R::Filters) -> PortResult<Vec<R>>;

    async fn create(&self, token: &str, data: &R::Create) -> PortResult<R>;

    /// Returns the server's full representation of the updated entity, not
    /// an echo of the submitted patch.
    async fn update(&self, token: &str, id: &R::Id, data: &R::Update) -> PortResult<R>;

    async fn delete(&self, token: &str, id: &R::Id) -> PortResult<()>;
}

#[async_trait]
pub trait ReportsApi: Send + Sync {
    /// Aggregate entity counts for the dashboard.
    async fn summary(&self, token: &str) -> PortResult<Summary>;

    /// Bulk-imports students from a spreadsheet. The remote endpoint takes
    /// multipart form data under the fixed field name `file`.
    async fn import_students(
        &self,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> PortResult<ImportReport>;

    /// Bulk-imports staff; same multipart contract as `import_students`.
    async fn import_staff(
        &self,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> PortResult<ImportReport>;

    /// Downloads the student import template (binary spreadsheet).
    async fn student_template(&self, token: &str) -> PortResult<Vec<u8>>;

    /// Downloads the staff import template.
    async fn staff_template(&self, token: &str) -> PortResult<Vec<u8>>;
}

/// Durable key-value mirror of the session, read once at startup and
/// rewritten on every session transition. Synchronous by design: the
/// backing store is a couple of local entries, not a network service.
pub trait SessionVault: Send + Sync {
    fn load(&self) -> PortResult<Option<PersistedSession>>;

    fn store(&self, session: &PersistedSession) -> PortResult<()>;

    fn clear(&self) -> PortResult<()>;
}
