//! services/console/src/stores/session.rs
//!
//! The single authoritative in-memory representation of the current
//! session, plus its persistence mirror. Role and user id are only ever
//! populated from a freshly decoded token; a session is either fully
//! populated or fully cleared, never partial. The only mutation paths are
//! `restore`, `login`, and `logout`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{info, warn};

use school_console_core::domain::{LoginCredentials, PersistedSession, Role};
use school_console_core::ports::{AuthApi, PortError, PortResult, SessionVault};
use school_console_core::token;

use super::notify::{Subscribers, SubscriptionId};

/// A fully populated authenticated session.
#[derive(Debug, Clone)]
struct ActiveSession {
    token: String,
    role: Role,
    user_id: i64,
    school_name: Option<String>,
}

enum Phase {
    Unauthenticated,
    Authenticating,
    Authenticated(ActiveSession),
}

struct Inner {
    phase: Phase,
    error: Option<String>,
}

/// Owns authentication state and the vault mirror. Injected by reference
/// into every resource store, which asks it for the bearer token before
/// each remote call.
pub struct SessionStore {
    auth: Arc<dyn AuthApi>,
    vault: Arc<dyn SessionVault>,
    inner: RwLock<Inner>,
    subscribers: Subscribers,
}

impl SessionStore {
    /// Creates an unauthenticated store. Call `restore` to pick up a
    /// persisted session from a previous run.
    pub fn new(auth: Arc<dyn AuthApi>, vault: Arc<dyn SessionVault>) -> Self {
        Self {
            auth,
            vault,
            inner: RwLock::new(Inner {
                phase: Phase::Unauthenticated,
                error: None,
            }),
            subscribers: Subscribers::new(),
        }
    }

    /// Applies a state change and then notifies subscribers, outside the
    /// lock. All mutations of one logical operation commit together.
    fn commit(&self, apply: impl FnOnce(&mut Inner)) {
        {
            let mut inner = self.inner.write();
            apply(&mut inner);
        }
        self.subscribers.notify();
    }

    //=====================================================================================
    // Lifecycle
    //=====================================================================================

    /// Restores the session persisted by a previous run, if it is still
    /// valid. An absent, expired, or undecodable token clears the vault
    /// and leaves the store unauthenticated.
    pub fn restore(&self) {
        self.restore_at(Utc::now());
    }

    /// `restore` against an explicit clock, for deterministic tests.
    pub fn restore_at(&self, now: DateTime<Utc>) {
        let persisted = match self.vault.load() {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!(error = %err, "could not read persisted session");
                None
            }
        };

        let active = persisted.and_then(|p| {
            if token::is_expired(&p.token, now) {
                return None;
            }
            // Claims win over the mirror; the persisted school name is only
            // a display fallback.
            match token::decode(&p.token) {
                Ok(claims) => Some(ActiveSession {
                    token: p.token,
                    role: claims.role,
                    user_id: claims.user_id,
                    school_name: claims.school_name.or(p.school_name),
                }),
                Err(_) => None,
            }
        });

        match active {
            Some(session) => {
                info!(user_id = session.user_id, role = %session.role, "session restored");
                self.commit(|inner| {
                    inner.phase = Phase::Authenticated(session);
                    inner.error = None;
                });
            }
            None => {
                if let Err(err) = self.vault.clear() {
                    warn!(error = %err, "could not clear persisted session");
                }
                self.commit(|inner| {
                    inner.phase = Phase::Unauthenticated;
                    inner.error = None;
                });
            }
        }
    }

    /// Exchanges credentials for a session. Issues exactly one remote call.
    pub async fn login(&self, credentials: &LoginCredentials) -> PortResult<()> {
        self.commit(|inner| {
            inner.phase = Phase::Authenticating;
            inner.error = None;
        });

        let raw_token = match self.auth.login(credentials).await {
            Ok(token) => token,
            Err(err) => {
                let message = err.to_string();
                warn!(error = %message, "login rejected");
                self.commit(|inner| {
                    inner.phase = Phase::Unauthenticated;
                    inner.error = Some(message);
                });
                return Err(err);
            }
        };

        let claims = match token::decode(&raw_token) {
            Ok(claims) => claims,
            Err(err) => {
                warn!(error = %err, "login endpoint returned an undecodable token");
                self.commit(|inner| {
                    inner.phase = Phase::Unauthenticated;
                    inner.error = Some(format!("invalid token from server: {err}"));
                });
                return Err(PortError::InvalidToken(err));
            }
        };

        let persisted = PersistedSession {
            token: raw_token.clone(),
            role: claims.role,
            school_name: claims.school_name.clone(),
        };
        if let Err(err) = self.vault.store(&persisted) {
            // The in-memory session is still usable; it just won't survive
            // a restart.
            warn!(error = %err, "could not persist session");
        }

        info!(user_id = claims.user_id, role = %claims.role, "login succeeded");
        self.commit(|inner| {
            inner.phase = Phase::Authenticated(ActiveSession {
                token: raw_token,
                role: claims.role,
                user_id: claims.user_id,
                school_name: claims.school_name,
            });
            inner.error = None;
        });
        Ok(())
    }

    /// Pure local invalidation: clears all session fields and the vault.
    /// Never calls the remote API.
    pub fn logout(&self) {
        if let Err(err) = self.vault.clear() {
            warn!(error = %err, "could not clear persisted session");
        }
        info!("logged out");
        self.commit(|inner| {
            inner.phase = Phase::Unauthenticated;
            inner.error = None;
        });
    }

    //=====================================================================================
    // Queries
    //=====================================================================================

    /// True iff a token is present and unexpired, evaluated fresh on every
    /// call: a session that outlives its expiry reads as logged out with
    /// no explicit logout.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        let inner = self.inner.read();
        match &inner.phase {
            Phase::Authenticated(session) => !token::is_expired(&session.token, now),
            _ => false,
        }
    }

    /// The bearer token for an authorized call, or `Unauthenticated`.
    /// Resource stores call this before any network I/O.
    pub fn bearer_token(&self) -> PortResult<String> {
        self.bearer_token_at(Utc::now())
    }

    pub fn bearer_token_at(&self, now: DateTime<Utc>) -> PortResult<String> {
        let inner = self.inner.read();
        match &inner.phase {
            Phase::Authenticated(session) if !token::is_expired(&session.token, now) => {
                Ok(session.token.clone())
            }
            _ => Err(PortError::Unauthenticated),
        }
    }

    /// Pure role comparison; the view layer gates navigation and feature
    /// visibility on this.
    pub fn has_role(&self, role: Role) -> bool {
        matches!(&self.inner.read().phase, Phase::Authenticated(s) if s.role == role)
    }

    pub fn role(&self) -> Option<Role> {
        match &self.inner.read().phase {
            Phase::Authenticated(session) => Some(session.role),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match &self.inner.read().phase {
            Phase::Authenticated(session) => Some(session.user_id),
            _ => None,
        }
    }

    pub fn school_name(&self) -> Option<String> {
        match &self.inner.read().phase {
            Phase::Authenticated(session) => session.school_name.clone(),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<String> {
        match &self.inner.read().phase {
            Phase::Authenticated(session) => Some(session.token.clone()),
            _ => None,
        }
    }

    /// True while a login request is in flight.
    pub fn is_logging_in(&self) -> bool {
        matches!(self.inner.read().phase, Phase::Authenticating)
    }

    pub fn error(&self) -> Option<String> {
        self.inner.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.commit(|inner| inner.error = None);
    }

    //=====================================================================================
    // Subscriptions
    //=====================================================================================

    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.subscribers.add(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}
