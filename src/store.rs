use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{Connection, OptionalExtension};

use crate::collection::Collection;
use crate::error::{Error, Result};

/// A single-file document store holding any number of named collections.
///
/// One `Store` owns one SQLite connection for its whole lifetime; every
/// [`Collection`] handle it hands out borrows that connection, so a handle can
/// never outlive the store. The store adds no locking of its own — concurrent
/// access from several threads or processes is bounded by SQLite's own
/// guarantees (one writer, serialized transactions).
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database file at `path`, creating it if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Store> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened store at {}", path.display());
        Ok(Store { conn })
    }

    /// Open an ephemeral in-memory store with the same semantics as a
    /// file-backed one. Contents are lost when the store is dropped.
    pub fn open_in_memory() -> Result<Store> {
        let conn = Connection::open_in_memory().map_err(|source| Error::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Ok(Store { conn })
    }

    /// Names of all collections currently present in the file.
    ///
    /// Order is whatever the engine catalog returns.
    pub fn collection_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Return a handle to the named collection, creating its backing table on
    /// first use. Idempotent: repeated calls never fail and never duplicate
    /// the table, and all handles for one name address the same rows.
    pub fn collection(&self, name: &str) -> Result<Collection<'_>> {
        validate_name(name)?;
        let exists: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            // Name is validated above; identifiers cannot be bound as parameters.
            self.conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {name} \
                     (key TEXT PRIMARY KEY, value BLOB NOT NULL, ts INTEGER NOT NULL)"
                ),
                [],
            )?;
            debug!("created collection {name}");
        }
        Ok(Collection::new(&self.conn, name.to_string()))
    }

    /// Close the store explicitly, surfacing any teardown error.
    ///
    /// Every mutating operation commits before returning, so dropping a
    /// `Store` without calling `close` loses nothing; this exists for callers
    /// that want the engine's close failure instead of a silent drop.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Sqlite(e))?;
        debug!("store closed");
        Ok(())
    }
}

/// Collection names end up inside DDL and query text, so only a strict
/// identifier grammar is accepted: `[A-Za-z_][A-Za-z0-9_]*`, excluding the
/// engine-reserved `sqlite_` prefix.
fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let head_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !head_ok || !tail_ok || name.to_ascii_lowercase().starts_with("sqlite_") {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}
