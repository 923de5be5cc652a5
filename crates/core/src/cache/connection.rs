//! SQLite handle for the durable cache tier.
//!
//! Opens the SQLite database that backs the durable cache tier, applies
//! pragmas (WAL mode), and runs migrations.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Session database handle.
///
/// Queries run on tokio-rusqlite's background thread. Clones share one
/// connection, so every clone sees the same session.
#[derive(Clone, Debug)]
pub struct SessionDb {
    pub(crate) conn: Connection,
}

impl SessionDb {
    /// Open (or create) the session file at `path`, set pragmas and bring
    /// the schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database.
    ///
    /// The session lasts as long as the handle (and its clones) live.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}
