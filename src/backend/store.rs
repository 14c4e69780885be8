#[cfg(not(target_arch = "wasm32"))]
use rusqlite::{params, Connection, OptionalExtension};
#[cfg(target_arch = "wasm32")]
use gloo_storage::{errors::StorageError, LocalStorage, Storage};
#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const USER_EMAIL: &str = "user_email";

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN, REFRESH_TOKEN, USER_EMAIL];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[cfg(target_arch = "wasm32")]
    #[error("local storage error: {0}")]
    Browser(#[from] StorageError),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Signed-in state handed to the view tree. Only `access_token` decides
/// whether protected views are reachable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_email: Option<String>,
}

/// Persistent key-value store for the session. SQLite on native targets,
/// the browser's `localStorage` on the web.
#[derive(Clone)]
pub struct SessionStore {
    #[cfg(not(target_arch = "wasm32"))]
    conn: Arc<Mutex<Connection>>,
    /// `None` means `localStorage`.
    #[cfg(target_arch = "wasm32")]
    memory: Option<Arc<Mutex<HashMap<String, String>>>>,
}

impl SessionStore {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// The path only names the SQLite file; the browser keeps the keys in
    /// `localStorage`.
    #[cfg(target_arch = "wasm32")]
    pub fn new<P: AsRef<Path>>(_path: P) -> Result<Self, StoreError> {
        Ok(Self { memory: None })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new_in_memory() -> Result<Self, StoreError> {
        Ok(Self { memory: Some(Arc::new(Mutex::new(HashMap::new()))) })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if let Some(memory) = &self.memory {
            let entries = memory.lock().map_err(|_| StoreError::Poisoned)?;
            return Ok(entries.get(key).cloned());
        }
        match LocalStorage::get::<String>(key) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(memory) = &self.memory {
            let mut entries = memory.lock().map_err(|_| StoreError::Poisoned)?;
            entries.insert(key.to_string(), value.to_string());
            return Ok(());
        }
        LocalStorage::set(key, value)?;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        if let Some(memory) = &self.memory {
            let mut entries = memory.lock().map_err(|_| StoreError::Poisoned)?;
            entries.remove(key);
            return Ok(());
        }
        LocalStorage::delete(key);
        Ok(())
    }

    /// Drops every session key. Other keys the origin keeps are left alone.
    pub fn clear(&self) -> Result<(), StoreError> {
        for key in SESSION_KEYS {
            self.remove(key)?;
        }
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<Session>, StoreError> {
        let access_token = match self.get(ACCESS_TOKEN)? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };
        Ok(Some(Session {
            access_token,
            refresh_token: self.get(REFRESH_TOKEN)?,
            user_email: self.get(USER_EMAIL)?,
        }))
    }

    pub fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        self.set(ACCESS_TOKEN, &session.access_token)?;
        // Absent values must not leak over from a previous session.
        for (key, value) in [(REFRESH_TOKEN, &session.refresh_token), (USER_EMAIL, &session.user_email)] {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_session_round_trip_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.db");

        let store = SessionStore::new(&path).expect("Failed to open store");
        assert!(store.load_session().unwrap().is_none());

        let session = Session {
            access_token: "tok".into(),
            refresh_token: Some("ref".into()),
            user_email: Some("ana@smartpol.co".into()),
        };
        store.save_session(&session).expect("Failed to save session");
        drop(store);

        let reopened = SessionStore::new(&path).expect("Failed to reopen store");
        assert_eq!(reopened.load_session().unwrap(), Some(session));
    }

    #[test]
    fn test_clear_removes_every_key() {
        let store = SessionStore::new_in_memory().unwrap();
        store.set(ACCESS_TOKEN, "tok").unwrap();
        store.set(USER_EMAIL, "x@y.z").unwrap();

        store.clear().unwrap();
        assert!(store.get(USER_EMAIL).unwrap().is_none());
        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn test_new_session_replaces_optional_keys() {
        let store = SessionStore::new_in_memory().unwrap();
        store
            .save_session(&Session {
                access_token: "a1".into(),
                refresh_token: Some("old-refresh".into()),
                user_email: Some("old@smartpol.co".into()),
            })
            .unwrap();

        let fresh = Session { access_token: "a2".into(), ..Default::default() };
        store.save_session(&fresh).unwrap();
        assert_eq!(store.load_session().unwrap(), Some(fresh));
    }

    #[test]
    fn test_clear_keeps_unrelated_keys() {
        let store = SessionStore::new_in_memory().unwrap();
        store.set(ACCESS_TOKEN, "tok").unwrap();
        store.set("theme", "dark").unwrap();

        store.clear().unwrap();
        assert!(store.load_session().unwrap().is_none());
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_empty_token_is_not_a_session() {
        let store = SessionStore::new_in_memory().unwrap();
        store.set(ACCESS_TOKEN, "").unwrap();
        assert!(store.load_session().unwrap().is_none());
    }
}
