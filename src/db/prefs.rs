use super::DbError;
use crate::models::Theme;
use rusqlite::{Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

const USER_ID_KEY: &str = "user_id";
const THEME_KEY: &str = "theme";

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[derive(Debug)]
pub struct PrefsStore {
    conn: Connection,
}

impl PrefsStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open_default() -> Result<Self, DbError> {
        Ok(Self::new(super::open_db(&super::get_db_path())?))
    }

    fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now()],
        )?;
        Ok(())
    }

    /// The session id, created on first use and reused afterwards.
    pub fn user_id(&self) -> Result<String, DbError> {
        if let Some(id) = self.get(USER_ID_KEY)?.filter(|id| !id.is_empty()) {
            return Ok(id);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.set(USER_ID_KEY, &id)?;
        info!(target: "dsa_workspace", "Created new session id");
        Ok(id)
    }

    pub fn theme(&self) -> Result<Theme, DbError> {
        Ok(match self.get(THEME_KEY)? {
            Some(raw) => Theme::parse(&raw).unwrap_or_else(|| {
                warn!(target: "dsa_workspace", %raw, "Unknown stored theme, using default");
                Theme::default()
            }),
            None => Theme::default(),
        })
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), DbError> {
        self.set(THEME_KEY, theme.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_db, open_in_memory};

    #[test]
    fn test_user_id_is_created_once() {
        let store = PrefsStore::new(open_in_memory().unwrap());
        let first = store.user_id().unwrap();
        let second = store.user_id().unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_user_id_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workspace.db");

        let first = PrefsStore::new(open_db(&path).unwrap()).user_id().unwrap();
        let second = PrefsStore::new(open_db(&path).unwrap()).user_id().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_theme_default_and_persist() {
        let store = PrefsStore::new(open_in_memory().unwrap());
        assert_eq!(store.theme().unwrap(), Theme::Dark);
        store.set_theme(Theme::Light).unwrap();
        assert_eq!(store.theme().unwrap(), Theme::Light);
        store.set_theme(Theme::Dark).unwrap();
        assert_eq!(store.theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let store = PrefsStore::new(open_in_memory().unwrap());
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(store.theme().unwrap(), Theme::default());
    }
}
