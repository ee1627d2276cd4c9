//! services/console/src/stores/reports.rs
//!
//! Dashboard summary plus spreadsheet import/export. Imports and template
//! downloads are pass-through calls; only the summary is cached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use school_console_core::domain::{ImportReport, Summary};
use school_console_core::ports::{PortResult, ReportsApi};

use super::notify::{Subscribers, SubscriptionId};
use super::session::SessionStore;

struct ReportsInner {
    summary: Option<Summary>,
    error: Option<String>,
}

/// Holds the last fetched dashboard summary and fronts the spreadsheet
/// import endpoints.
pub struct ReportsStore {
    api: Arc<dyn ReportsApi>,
    session: Arc<SessionStore>,
    inner: RwLock<ReportsInner>,
    in_flight: AtomicUsize,
    subscribers: Subscribers,
}

impl ReportsStore {
    pub fn new(api: Arc<dyn ReportsApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            inner: RwLock::new(ReportsInner {
                summary: None,
                error: None,
            }),
            in_flight: AtomicUsize::new(0),
            subscribers: Subscribers::new(),
        }
    }

    fn commit(&self, apply: impl FnOnce(&mut ReportsInner)) {
        {
            let mut inner = self.inner.write();
            apply(&mut inner);
        }
        self.subscribers.notify();
    }

    fn authorize(&self) -> PortResult<String> {
        self.session.bearer_token().map_err(|err| {
            warn!("report operation attempted without a valid session");
            self.commit(|inner| inner.error = Some(err.to_string()));
            err
        })
    }

    //=====================================================================================
    // Summary
    //=====================================================================================

    /// Fetches the aggregate counts. On failure the cached summary is
    /// dropped rather than left stale.
    pub async fn refresh_summary(&self) -> PortResult<()> {
        let token = self.authorize()?;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.subscribers.notify();
        let outcome = self.api.summary(&token).await;
        {
            let mut inner = self.inner.write();
            match &outcome {
                Ok(summary) => {
                    debug!(
                        schools = summary.schools,
                        students = summary.students,
                        "summary fetched"
                    );
                    inner.summary = Some(summary.clone());
                    inner.error = None;
                }
                Err(err) => {
                    warn!(error = %err, "summary fetch failed");
                    inner.summary = None;
                    inner.error = Some(err.to_string());
                }
            }
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.subscribers.notify();
        outcome.map(|_| ())
    }

    pub fn summary(&self) -> Option<Summary> {
        self.inner.read().summary.clone()
    }

    //=====================================================================================
    // Spreadsheet import / template download
    //=====================================================================================

    /// Uploads a student spreadsheet and returns the server's import
    /// report. The caller refreshes the student store afterwards; imported
    /// rows are not patched into any cache here.
    pub async fn import_students(&self, file_name: &str, bytes: Vec<u8>) -> PortResult<ImportReport> {
        let token = self.authorize()?;
        self.passthrough(self.api.import_students(&token, file_name, bytes).await, "student import")
    }

    /// Uploads a staff spreadsheet; same contract as `import_students`.
    pub async fn import_staff(&self, file_name: &str, bytes: Vec<u8>) -> PortResult<ImportReport> {
        let token = self.authorize()?;
        self.passthrough(self.api.import_staff(&token, file_name, bytes).await, "staff import")
    }

    /// Downloads the student import template as raw spreadsheet bytes.
    pub async fn student_template(&self) -> PortResult<Vec<u8>> {
        let token = self.authorize()?;
        self.passthrough(self.api.student_template(&token).await, "student template")
    }

    /// Downloads the staff import template.
    pub async fn staff_template(&self) -> PortResult<Vec<u8>> {
        let token = self.authorize()?;
        self.passthrough(self.api.staff_template(&token).await, "staff template")
    }

    fn passthrough<T>(&self, outcome: PortResult<T>, what: &str) -> PortResult<T> {
        match outcome {
            Ok(value) => {
                self.commit(|inner| inner.error = None);
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "{what} failed");
                self.commit(|inner| inner.error = Some(err.to_string()));
                Err(err)
            }
        }
    }

    //=====================================================================================
    // Queries and subscriptions
    //=====================================================================================

    pub fn error(&self) -> Option<String> {
        self.inner.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.commit(|inner| inner.error = None);
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.subscribers.add(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}
