//! Persistence for the session cookie

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use super::store::Session;

/// Errors that can occur while reading or writing the session cookie
#[derive(Debug, Error)]
pub enum CookieError {
    /// No cookie has been persisted yet
    #[error("Session cookie not found")]
    NotFound,

    /// I/O error during storage operations
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable backing for a [`Session`]
///
/// Implementations must tolerate `clear` on an already-empty jar.
pub trait CookieJar: Send + Sync {
    /// Read the persisted session
    ///
    /// # Errors
    ///
    /// Returns `CookieError::NotFound` if nothing was persisted.
    fn load(&self) -> Result<Session, CookieError>;

    /// Persist the session, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    fn save(&self, session: &Session) -> Result<(), CookieError>;

    /// Remove the persisted session
    ///
    /// # Errors
    ///
    /// Returns an error if an existing cookie cannot be removed.
    fn clear(&self) -> Result<(), CookieError>;
}

/// Session cookie stored as a JSON file with user-only permissions
#[derive(Debug, Clone)]
pub struct FileCookieJar {
    path: PathBuf,
}

impl Default for FileCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCookieJar {
    /// Cookie file in the platform-specific config directory
    #[must_use]
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ldx-insight");

        Self {
            path: config_dir.join("session.json"),
        }
    }

    /// Cookie file at a custom path
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the storage path
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CookieJar for FileCookieJar {
    fn load(&self) -> Result<Session, CookieError> {
        if !self.path.exists() {
            return Err(CookieError::NotFound);
        }

        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, session: &Session) -> Result<(), CookieError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, &content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), CookieError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Process-local cookie jar, lost on exit
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookie: Mutex<Option<Session>>,
}

impl MemoryCookieJar {
    /// Empty jar
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar pre-populated with a session
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            cookie: Mutex::new(Some(session)),
        }
    }
}

impl CookieJar for MemoryCookieJar {
    fn load(&self) -> Result<Session, CookieError> {
        self.cookie
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CookieError::NotFound)
    }

    fn save(&self, session: &Session) -> Result<(), CookieError> {
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CookieError> {
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

impl<T: CookieJar + ?Sized> CookieJar for std::sync::Arc<T> {
    fn load(&self) -> Result<Session, CookieError> {
        (**self).load()
    }

    fn save(&self, session: &Session) -> Result<(), CookieError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), CookieError> {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(Some("T1".to_string()), Some("R1".to_string()))
    }

    #[test]
    fn test_file_jar_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let jar = FileCookieJar::with_path(temp_dir.path().join("nested").join("session.json"));

        jar.save(&session()).unwrap();
        let loaded = jar.load().unwrap();

        assert_eq!(loaded, session());
    }

    #[test]
    fn test_file_jar_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let jar = FileCookieJar::with_path(temp_dir.path().join("missing.json"));

        assert!(matches!(jar.load(), Err(CookieError::NotFound)));
    }

    #[test]
    fn test_file_jar_clear_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let jar = FileCookieJar::with_path(temp_dir.path().join("session.json"));

        jar.save(&session()).unwrap();
        jar.clear().unwrap();
        jar.clear().unwrap();

        assert!(matches!(jar.load(), Err(CookieError::NotFound)));
    }

    #[test]
    fn test_file_jar_corrupt_cookie() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let jar = FileCookieJar::with_path(path);
        assert!(matches!(jar.load(), Err(CookieError::Json(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_jar_user_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let jar = FileCookieJar::with_path(temp_dir.path().join("session.json"));
        jar.save(&session()).unwrap();

        let mode = std::fs::metadata(jar.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_jar() {
        let jar = MemoryCookieJar::new();
        assert!(matches!(jar.load(), Err(CookieError::NotFound)));

        jar.save(&session()).unwrap();
        assert_eq!(jar.load().unwrap(), session());

        jar.clear().unwrap();
        assert!(matches!(jar.load(), Err(CookieError::NotFound)));
    }
}
