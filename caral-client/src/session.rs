// caral-client/src/session.rs
// Session store: the authenticated identity, optionally persisted as JSON

use serde::{Deserialize, Serialize};
use shared::client::UserInfo;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Authenticated identity: bearer token plus user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserInfo,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserInfo) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.user.role.is_staff()
    }
}

/// JSON file holding the saved session
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, session: &Session) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)
    }

    /// Unreadable or malformed files count as no session.
    pub fn load(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }
        let json = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&json).ok()
    }

    pub fn delete(&self) -> std::io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Shared handle to the one active session of a client instance
///
/// Cloning the store clones the handle; all clones see the same session.
/// Written only by [`SessionStore::begin`] and [`SessionStore::end`].
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
    file: Option<SessionFile>,
}

impl SessionStore {
    /// In-memory store starting anonymous.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bound to `path`; a session saved there is restored immediately.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let file = SessionFile::new(path);
        let restored = file.load();
        if restored.is_some() {
            tracing::debug!(path = %file.path().display(), "Restored saved session");
        }
        Self {
            current: Arc::new(RwLock::new(restored)),
            file: Some(file),
        }
    }

    /// Install `session` as the active identity, replacing any previous one.
    pub fn begin(&self, session: Session) {
        if let Some(file) = &self.file {
            if let Err(e) = file.save(&session) {
                tracing::warn!(path = %file.path().display(), "Failed to save session: {}", e);
            }
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Drop the active identity. Returns whether one was active.
    pub fn end(&self) -> bool {
        if let Some(file) = &self.file {
            if let Err(e) = file.delete() {
                tracing::warn!(path = %file.path().display(), "Failed to delete session file: {}", e);
            }
        }
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.current().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn is_staff(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Session::is_staff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::client::UserRole;
    use tempfile::TempDir;

    fn staff() -> Session {
        Session::new(
            "tok-1",
            UserInfo {
                id: 1,
                client_id: None,
                role: UserRole::Staff("admin".into()),
                display_name: "Rosa".into(),
                email: Some("admin@caral.pe".into()),
            },
        )
    }

    #[test]
    fn clones_share_one_session() {
        let store = SessionStore::new();
        let view = store.clone();
        assert!(!view.is_authenticated());

        store.begin(staff());
        assert_eq!(view.token().as_deref(), Some("tok-1"));
        assert!(view.is_staff());

        assert!(view.end());
        assert!(!store.is_authenticated());
        assert!(!store.end());
    }

    #[test]
    fn persistent_store_restores_and_forgets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        SessionStore::persistent(&path).begin(staff());
        assert!(path.exists());

        let restored = SessionStore::persistent(&path);
        assert_eq!(restored.current(), Some(staff()));

        restored.end();
        assert!(!path.exists());
        assert!(SessionStore::persistent(&path).current().is_none());
    }

    #[test]
    fn malformed_file_is_anonymous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(!SessionStore::persistent(&path).is_authenticated());
    }
}
