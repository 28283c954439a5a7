/// Token persistence
///
/// The session token lives in one file with an explicit load/set/clear
/// lifecycle, owned by whoever constructs the store. Nothing else in the
/// client reads or writes the token location.
use crate::error::ClientResult;
use std::fs;
use std::path::PathBuf;

/// File-backed storage for the bearer token
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves the default location: `$TICKLIST_SESSION_FILE` if set,
    /// otherwise `~/.ticklist/session`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("TICKLIST_SESSION_FILE") {
            return PathBuf::from(path);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".ticklist").join("session")
    }

    /// Returns the stored token, if any
    ///
    /// A missing file means no session; an empty or whitespace-only file
    /// is treated the same way.
    pub fn load(&self) -> ClientResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persists a token, creating parent directories as needed
    pub fn set(&self, token: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;
        Ok(())
    }

    /// Forgets the stored token; clearing an absent session is not an error
    pub fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> SessionStore {
        let path = std::env::temp_dir()
            .join(format!("ticklist-session-test-{}", uuid::Uuid::new_v4()));
        SessionStore::new(path)
    }

    #[test]
    fn test_load_set_clear_lifecycle() {
        let store = temp_store();

        assert!(store.load().unwrap().is_none());

        store.set("some-token").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("some-token"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());

        // Clearing twice stays fine
        store.clear().unwrap();
    }

    #[test]
    fn test_blank_file_means_no_session() {
        let store = temp_store();
        store.set("   ").unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }
}
