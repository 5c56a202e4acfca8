//! Persisted login state.
//!
//! A session is three string entries under fixed keys. They live behind a
//! [`SessionStore`], and views receive the store explicitly.
//!
//! The file store holds the bearer token in plain text, so on unix the file
//! is created readable and writable by its owner only.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use marketplace_core::Session;
use secrecy::ExposeSecret;
use thiserror::Error;

/// Storage keys for the three session entries.
pub mod keys {
    /// Key for the bearer token.
    pub const TOKEN: &str = "Token";

    /// Key for the logged-in user's first name.
    pub const FIRST_NAME: &str = "first_name";

    /// Key for the logged-in user's id.
    pub const USER_ID: &str = "user_id";
}

/// Errors from reading or writing session state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session file could not be read or written.
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Session file exists but is not a JSON object of strings.
    #[error("session file {path} is corrupt: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value storage for the logged-in session.
///
/// `load` yields `None` whenever any of the three entries is missing;
/// callers treat that as "not logged in". Nothing here checks whether the
/// token is still valid; only the backend knows that.
pub trait SessionStore: Send + Sync {
    /// Persist all three session entries.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backing storage cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Load the session, or `None` if any entry is missing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backing storage cannot be read.
    fn load(&self) -> Result<Option<Session>, SessionError>;

    /// Remove all three entries. Clearing an absent session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backing storage cannot be written.
    fn clear(&self) -> Result<(), SessionError>;
}

type Entries = HashMap<String, String>;

fn entries_from(session: &Session) -> Entries {
    HashMap::from([
        (keys::TOKEN.to_owned(), session.token().expose_secret().to_owned()),
        (keys::FIRST_NAME.to_owned(), session.first_name().to_owned()),
        (keys::USER_ID.to_owned(), session.user_id().to_string()),
    ])
}

fn session_from(entries: &Entries) -> Option<Session> {
    Session::from_parts(
        entries.get(keys::TOKEN).cloned(),
        entries.get(keys::USER_ID).cloned(),
        entries.get(keys::FIRST_NAME).cloned(),
    )
}

// =============================================================================
// File-backed store
// =============================================================================

/// Session stored as a flat JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_entries(&self) -> Result<Entries, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&raw).map_err(|source| SessionError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(&entries_from(session)).map_err(|source| {
            SessionError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        write_private(&self.path, json.as_bytes()).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), user_id = %session.user_id(), "Session saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>, SessionError> {
        let entries = self.read_entries()?;
        let session = session_from(&entries);
        if session.is_none() && !entries.is_empty() {
            tracing::warn!(path = %self.path.display(), "Ignoring partial session state");
        }
        Ok(session)
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Write `contents` to `path`, restricting the file to its owner.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies when the file is created.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)
}

// =============================================================================
// In-memory store
// =============================================================================

/// Session kept in process memory.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<Entries>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `session`.
    #[must_use]
    pub fn with_session(session: &Session) -> Self {
        Self {
            entries: Mutex::new(entries_from(session)),
        }
    }

    /// A store holding arbitrary raw entries, including partial ones.
    #[must_use]
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: Mutex::new(
                entries
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                    .collect(),
            ),
        }
    }

    /// Raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.lock() = entries_from(session);
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(session_from(&self.lock()))
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut entries = self.lock();
        entries.remove(keys::TOKEN);
        entries.remove(keys::FIRST_NAME);
        entries.remove(keys::USER_ID);
        drop(entries);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketplace_core::UserId;
    use secrecy::SecretString;

    use super::*;

    fn session() -> Session {
        Session::new(SecretString::from("tok-123"), UserId::new(7), "Noa")
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested/session.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&session()).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.user_id(), UserId::new(7));
        assert_eq!(loaded.first_name(), "Noa");
        assert_eq!(loaded.token().expose_secret(), "tok-123");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileSessionStore::new(&path);
        store.save(&session()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        store.clear().unwrap();
        store.save(&session()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_uses_local_storage_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&session()).unwrap();

        let raw: Entries =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw.get("Token").map(String::as_str), Some("tok-123"));
        assert_eq!(raw.get("first_name").map(String::as_str), Some("Noa"));
        assert_eq!(raw.get("user_id").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_file_store_partial_state_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"Token":"tok","first_name":"Noa"}"#).unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let err = FileSessionStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SessionError::Json { .. }));
    }

    #[test]
    fn test_file_store_clear_twice() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&session()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&session()).unwrap();
        assert_eq!(store.get(keys::USER_ID).as_deref(), Some("7"));
        assert!(store.load().unwrap().is_some());

        store.clear().unwrap();
        assert!(store.get(keys::TOKEN).is_none());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_missing_user_id_is_absent() {
        let store = MemorySessionStore::with_entries(&[
            (keys::TOKEN, "tok"),
            (keys::FIRST_NAME, "Noa"),
        ]);
        assert!(store.load().unwrap().is_none());
    }
}
