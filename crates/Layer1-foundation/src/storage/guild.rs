//! SQLite Storage for guild records
//!
//! 봇이 참여한 길드마다 한 행을 유지한다. 이벤트 핸들러
//! (`guild_create`, `guild_delete`, `ready`)가 이 저장소를 갱신한다.

use crate::{Error, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Guild record storage
#[derive(Clone)]
pub struct GuildStore {
    conn: Arc<Mutex<Connection>>,
}

impl GuildStore {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Storage(format!("Failed to create data directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Storage(format!("Failed to open database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory storage (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Storage(format!("Failed to create in-memory database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Internal("Lock poisoned".to_string()))
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS guilds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_guilds_guild_id ON guilds(guild_id);
            "#,
        )
        .map_err(|e| Error::Storage(format!("Failed to initialize schema: {}", e)))?;
        Ok(())
    }

    /// 길드 레코드 추가 (중복 검사 없음)
    pub fn insert(&self, guild_id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("INSERT INTO guilds (guild_id) VALUES (?1)", params![guild_id])?;
        debug!("Inserted guild record {}", guild_id);
        Ok(())
    }

    /// 해당 길드의 모든 레코드 삭제 (중복 포함), 삭제된 행 수 반환
    pub fn delete_all(&self, guild_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM guilds WHERE guild_id = ?1", params![guild_id])?;
        Ok(removed)
    }

    /// 중복을 제거하고 새 레코드 하나로 교체
    pub fn replace(&self, guild_id: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM guilds WHERE guild_id = ?1", params![guild_id])?;
        tx.execute("INSERT INTO guilds (guild_id) VALUES (?1)", params![guild_id])?;
        tx.commit()?;
        Ok(())
    }

    pub fn exists(&self, guild_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM guilds WHERE guild_id = ?1",
            params![guild_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 누락된 길드만 추가, 추가된 수 반환
    pub fn ensure_all<'a, I>(&self, guild_ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = 0;
        for guild_id in guild_ids {
            if !self.exists(guild_id)? {
                self.insert(guild_id)?;
                added += 1;
            }
        }
        Ok(added)
    }

    /// 전체 레코드 수
    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM guilds", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_replace_removes_duplicates() {
        let store = GuildStore::in_memory().unwrap();
        store.insert("42").unwrap();
        store.insert("42").unwrap();
        assert_eq!(store.count().unwrap(), 2);

        store.replace("42").unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.exists("42").unwrap());
    }

    #[test]
    fn test_delete_all() {
        let store = GuildStore::in_memory().unwrap();
        store.insert("1").unwrap();
        store.insert("1").unwrap();
        store.insert("2").unwrap();

        assert_eq!(store.delete_all("1").unwrap(), 2);
        assert!(!store.exists("1").unwrap());
        assert!(store.exists("2").unwrap());
    }

    #[test]
    fn test_ensure_all_only_adds_missing() {
        let store = GuildStore::in_memory().unwrap();
        store.insert("1").unwrap();

        let added = store.ensure_all(["1", "2", "3"]).unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_open_file_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("pinboard.db");

        GuildStore::open(&path).unwrap().insert("7").unwrap();
        assert!(GuildStore::open(&path).unwrap().exists("7").unwrap());
    }
}
