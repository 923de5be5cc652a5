//! Durable key-value tier.
//!
//! [`SessionStore`] is the seam between the response cache and whatever
//! persists entries for the session. [`SessionDb`] stores them in SQLite;
//! [`MemorySessionStore`] keeps them in a map for the life of the process.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::{params, rusqlite};

use super::connection::SessionDb;
use crate::Error;

/// String key-value store addressed by fully prefixed keys.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns None if the key doesn't exist.
    async fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Insert or replace a value.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Delete every key starting with `prefix`, returning the number removed.
    async fn remove_prefixed(&self, prefix: &str) -> Result<u64, Error>;
}

#[async_trait]
impl SessionStore for SessionDb {
    async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row("SELECT value FROM session_store WHERE key = ?1", params![key], |row| {
                    row.get(0)
                });

                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();
        let stored_at = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO session_store (key, value, stored_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        stored_at = excluded.stored_at",
                    params![key, value, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn remove_prefixed(&self, prefix: &str) -> Result<u64, Error> {
        // substr instead of LIKE: `_` in the prefix is a LIKE wildcard.
        let prefix = prefix.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM session_store WHERE substr(key, 1, length(?1)) = ?1",
                    params![prefix],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

/// Process-lifetime store backed by a map.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_prefixed(&self, prefix: &str) -> Result<u64, Error> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let before = items.len();
        items.retain(|k, _| !k.starts_with(prefix));
        Ok((before - items.len()) as u64)
    }
}
