use std::collections::HashMap;

use log::trace;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::value::Value;

/// Sort direction for [`Collection::items_by_timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// A named mapping from unique keys to timestamped [`Value`] documents.
///
/// Handles are lightweight and borrow the owning store's connection; get one
/// from [`Store::collection`](crate::Store::collection). Every read issues a
/// fresh query, so results always reflect the latest committed state, and
/// every mutation (`set`, `delete`) runs in its own transaction and commits
/// before returning.
pub struct Collection<'db> {
    conn: &'db Connection,
    name: String,
}

impl<'db> Collection<'db> {
    pub(crate) fn new(conn: &'db Connection, name: String) -> Collection<'db> {
        Collection { conn, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(key) FROM {}", self.name),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Upsert a batch of key-value pairs as one atomic, committed unit.
    ///
    /// Existing keys are overwritten in place; new keys are inserted. Every
    /// pair in the batch receives the same timestamp, captured once before
    /// the batch is applied. Any iterable of pairs works: a `HashMap`, a
    /// `Vec<(&str, Value)>`, or `std::iter::once((key, value))`.
    pub fn set<K, I>(&self, items: I) -> Result<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let now = now_micros();
        let tx = self.conn.unchecked_transaction()?;
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO {} (key, value, ts) VALUES (?1, ?2, ?3)",
                self.name
            ))?;
            for (key, value) in items {
                let key: String = key.into();
                let blob = value.encode()?;
                stmt.execute(params![key, blob, now])?;
                written += 1;
            }
        }
        tx.commit()?;
        trace!("collection {}: set {} pair(s)", self.name, written);
        Ok(())
    }

    /// Single-pair convenience over [`Collection::set`].
    pub fn set_one(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.set(std::iter::once((key, value.into())))
    }

    /// Look up a batch of keys in one query.
    ///
    /// Returns a map holding every key that exists; missing keys are silently
    /// omitted, never an error. An empty `keys` slice returns an empty map.
    pub fn get<K: AsRef<str>>(&self, keys: &[K]) -> Result<HashMap<String, Value>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT key, value FROM {} WHERE key IN ({})",
            self.name,
            placeholders(keys.len())
        ))?;
        let rows = stmt.query_map(
            params_from_iter(keys.iter().map(|k| k.as_ref())),
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?)),
        )?;
        let mut found = HashMap::with_capacity(keys.len());
        for row in rows {
            let (key, blob) = row?;
            found.insert(key, Value::decode(&blob)?);
        }
        Ok(found)
    }

    /// Point lookup that treats absence as `None`.
    pub fn try_get(&self, key: &str) -> Result<Option<Value>> {
        let blob: Option<Vec<u8>> = self
            .conn
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", self.name),
                [key],
                |row| row.get(0),
            )
            .optional()?;
        blob.map(|b| Value::decode(&b)).transpose()
    }

    /// Point lookup that fails with [`Error::KeyNotFound`] on absence.
    pub fn get_one(&self, key: &str) -> Result<Value> {
        self.try_get(key)?
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Remove a batch of keys as one committed unit. Keys that do not exist
    /// are ignored; an empty slice does nothing.
    pub fn delete<K: AsRef<str>>(&self, keys: &[K]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            &format!(
                "DELETE FROM {} WHERE key IN ({})",
                self.name,
                placeholders(keys.len())
            ),
            params_from_iter(keys.iter().map(|k| k.as_ref())),
        )?;
        tx.commit()?;
        trace!("collection {}: deleted {} row(s)", self.name, removed);
        Ok(())
    }

    /// Single-key convenience over [`Collection::delete`].
    pub fn delete_one(&self, key: &str) -> Result<()> {
        self.delete(&[key])
    }

    /// Whether a row with exactly this key exists.
    pub fn contains(&self, key: &str) -> Result<bool> {
        let hit: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE key = ?1", self.name),
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hit.is_some())
    }

    /// All keys, in whatever order the engine returns them. Each call issues
    /// a fresh read; order is not guaranteed stable between calls.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT key FROM {}", self.name))?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }

    /// All key-value pairs, decoded, unsorted. Fresh read per call.
    pub fn items(&self) -> Result<Vec<(String, Value)>> {
        self.query_items(&format!("SELECT key, value FROM {}", self.name))
    }

    /// All key-value pairs ordered by last-write timestamp.
    ///
    /// Rows written by one `set` batch share a timestamp; their relative
    /// order within the batch is whatever the engine's sort yields.
    pub fn items_by_timestamp(&self, order: Order) -> Result<Vec<(String, Value)>> {
        let dir = match order {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        };
        self.query_items(&format!(
            "SELECT key, value FROM {} ORDER BY ts {dir}",
            self.name
        ))
    }

    /// Last write time recorded for `key`, or `None` if the key is absent.
    pub fn timestamp(&self, key: &str) -> Result<Option<OffsetDateTime>> {
        let micros: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT ts FROM {} WHERE key = ?1", self.name),
                [key],
                |row| row.get(0),
            )
            .optional()?;
        micros
            .map(|us| {
                OffsetDateTime::from_unix_timestamp_nanos(us as i128 * 1_000)
                    .map_err(|e| Error::Serialization(format!("stored timestamp out of range: {e}")))
            })
            .transpose()
    }

    fn query_items(&self, sql: &str) -> Result<Vec<(String, Value)>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;
        let mut items = Vec::new();
        for row in rows {
            let (key, blob) = row?;
            items.push((key, Value::decode(&blob)?));
        }
        Ok(items)
    }
}

/// `?,?,...,?` for an `IN` clause of `n` bound keys.
fn placeholders(n: usize) -> String {
    let mut s = String::with_capacity(n * 2);
    for i in 0..n {
        if i > 0 {
            s.push(',');
        }
        s.push('?');
    }
    s
}

fn now_micros() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_lists() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?,?,?");
    }
}
