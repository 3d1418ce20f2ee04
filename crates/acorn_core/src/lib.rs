//! # acorn core
//!
//! A typed bucket facade over the redb storage engine.
//!
//! acorn stores serde values under string keys, organized into nested
//! named buckets, and exposes:
//! - Callback-scoped transactions: [`Database::view`] (read-only) and
//!   [`Database::update`] (read-write, commit-on-success).
//! - Typed access through [`Bucket`]: get/put/delete, child-bucket
//!   navigation, and per-bucket monotone id tokens.
//! - Ordered traversal through [`Cursor`] in raw byte order of keys,
//!   with nested buckets surfaced inline.
//!
//! The engine supplies durability, snapshot isolation for readers, and
//! writer exclusivity; this crate holds no locks of its own. Values are
//! serialized by a pluggable codec from `acorn_codec` (JSON by default).
//!
//! ## Example
//!
//! ```rust,ignore
//! use acorn_core::{Database, Entry};
//!
//! let db = Database::open("app.db")?;
//! db.ensure_bucket("users")?;
//!
//! db.update(|tx| {
//!     let users = tx.bucket("users")?.expect("ensured above");
//!     users.put("u1", &serde_json::json!({"name": "Ada"}))
//! })?;
//!
//! db.view(|tx| {
//!     let users = tx.bucket("users")?.expect("ensured above");
//!     match users.get::<serde_json::Value>("u1")? {
//!         Entry::Value(v) => println!("{v}"),
//!         Entry::Bucket => println!("u1 is a nested bucket"),
//!         Entry::Absent => println!("no such user"),
//!     }
//!     Ok(())
//! })?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bucket;
mod cursor;
mod database;
mod error;
mod keys;
mod tables;
mod transaction;

pub use bucket::{Bucket, Entry};
pub use cursor::{Cursor, CursorEntry};
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use transaction::Tx;

pub use acorn_codec::{CborCodec, CodecError, JsonCodec, ValueCodec};
