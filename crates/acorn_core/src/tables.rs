//! Engine table definitions.
//!
//! The whole bucket tree lives in three redb tables. All three are
//! created eagerly when the database is opened, so read-only
//! transactions never race table creation.

use redb::TableDefinition;

/// Every bucket entry, leaf values and child-bucket markers alike.
///
/// Key: 8-byte big-endian bucket id followed by the UTF-8 key bytes.
/// Value: one tag byte followed by the body (see `keys`).
pub(crate) const DATA: TableDefinition<&[u8], &[u8]> = TableDefinition::new("data");

/// Per-bucket sequence counters: bucket id to last allocated value.
pub(crate) const SEQUENCES: TableDefinition<u64, u64> = TableDefinition::new("sequences");

/// Facade bookkeeping. Currently only the bucket id allocator.
pub(crate) const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Meta key for the next unassigned bucket id.
pub(crate) const NEXT_BUCKET_ID: &str = "next_bucket_id";
