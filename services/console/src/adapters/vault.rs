//! services/console/src/adapters/vault.rs
//!
//! Session persistence adapters: the concrete implementations of the
//! `SessionVault` port. `FileVault` mirrors the session into a small JSON
//! file; `MemoryVault` backs tests and ephemeral runs.

use std::path::PathBuf;

use parking_lot::Mutex;
use school_console_core::domain::PersistedSession;
use school_console_core::ports::{PortError, PortResult, SessionVault};
use tracing::warn;

//=========================================================================================
// FileVault
//=========================================================================================

/// A session vault backed by a single JSON file on disk.
pub struct FileVault {
    path: PathBuf,
}

impl FileVault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionVault for FileVault {
    fn load(&self) -> PortResult<Option<PersistedSession>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(PortError::Unexpected(err.to_string())),
        };
        match serde_json::from_str(&text) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                // A corrupt mirror must not wedge startup; treat it as absent.
                warn!(path = %self.path.display(), error = %err, "discarding unreadable session file");
                Ok(None)
            }
        }
    }

    fn store(&self, session: &PersistedSession) -> PortResult<()> {
        let text = serde_json::to_string_pretty(session)
            .map_err(|err| PortError::Unexpected(err.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| PortError::Unexpected(err.to_string()))?;
            }
        }
        // Write-then-rename so a crash mid-write never truncates the mirror.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, text).map_err(|err| PortError::Unexpected(err.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|err| PortError::Unexpected(err.to_string()))
    }

    fn clear(&self) -> PortResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PortError::Unexpected(err.to_string())),
        }
    }
}

//=========================================================================================
// MemoryVault
//=========================================================================================

/// An in-memory session vault for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryVault {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds the vault, as if a previous process had persisted a session.
    pub fn seeded(session: PersistedSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl SessionVault for MemoryVault {
    fn load(&self) -> PortResult<Option<PersistedSession>> {
        Ok(self.inner.lock().clone())
    }

    fn store(&self, session: &PersistedSession) -> PortResult<()> {
        *self.inner.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        *self.inner.lock() = None;
        Ok(())
    }
}
