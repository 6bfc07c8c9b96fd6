//! Connection bootstrap.
//!
//! # Invariants
//! - Every returned connection has `foreign_keys=ON`, a busy timeout and the
//!   latest schema.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::config::CoreConfig;
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const DATABASE_TYPE: &str = "sqlite";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage location of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    File(PathBuf),
    Memory,
}

impl DbTarget {
    /// `database_path` when configured, otherwise a private in-memory database.
    pub fn from_config(config: &CoreConfig) -> Self {
        config
            .database_path
            .clone()
            .map_or(Self::Memory, Self::File)
    }

    /// Connects, configures and migrates.
    ///
    /// Emits one `db_open` event with the elapsed time and outcome.
    pub fn open(&self) -> DbResult<Connection> {
        let started_at = Instant::now();
        let mode = self.mode();
        let result = self
            .connect()
            .map_err(DbError::from)
            .and_then(|mut conn| {
                prepare(&mut conn)?;
                Ok(conn)
            });

        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => info!("event=db_open module=db status=ok mode={mode} duration_ms={duration_ms}"),
            Err(err) => error!(
                "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error={err}"
            ),
        }
        result
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        match self {
            Self::File(path) => Connection::open(path),
            Self::Memory => Connection::open_in_memory(),
        }
    }
}

pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    DbTarget::File(path.as_ref().to_path_buf()).open()
}

pub fn open_db_in_memory() -> DbResult<Connection> {
    DbTarget::Memory.open()
}

/// Opens the database named by `config`.
pub fn open_db_from_config(config: &CoreConfig) -> DbResult<Connection> {
    DbTarget::from_config(config).open()
}

/// Dialect name of connections produced by this module.
pub fn database_type(_conn: &Connection) -> &'static str {
    DATABASE_TYPE
}

fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let applied = apply_migrations(conn)?;
    debug!("event=db_prepare module=db status=ok migrations_applied={applied}");
    Ok(())
}
