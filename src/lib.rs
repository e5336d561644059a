//! Document-collection storage over SQLite.
//!
//! # Intention
//!
//! - Offer MongoDB-style named collections of key-value documents on top of a
//!   single SQLite file, with last-write timestamps and timestamp-ordered
//!   iteration.
//! - Keep SQLite purely as a durable key/blob table; values are opaque,
//!   heterogeneous [`Value`] documents serialized to a binary column.
//!
//! # Architectural Boundaries
//!
//! - No query language over values, no secondary indexes, no schema
//!   validation, no multi-document transactions.
//! - Concurrency is whatever SQLite provides; this crate adds no locking or
//!   write arbitration of its own.
//!
//! # Example
//!
//! ```no_run
//! use nosqlite::{Store, Value};
//!
//! # fn main() -> nosqlite::Result<()> {
//! let store = Store::open("example.db")?;
//! let col = store.collection("grades")?;
//! col.set([("pi", Value::from(3.14)), ("e", Value::from(2.71))])?;
//! assert_eq!(col.get_one("pi")?, Value::Real(3.14));
//! store.close()?;
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod error;
pub mod store;
pub mod value;

pub use collection::{Collection, Order};
pub use error::{Error, Result};
pub use store::Store;
pub use value::Value;
