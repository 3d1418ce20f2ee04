//! Ordered traversal over one bucket.

use std::ops::Bound;

use acorn_codec::ValueCodec;
use serde::de::DeserializeOwned;

use crate::error::{CoreError, CoreResult};
use crate::keys::{self, BucketId, RawEntry};
use crate::transaction::Tx;

/// One entry surfaced by a cursor step.
///
/// Exhaustion of the range is signalled by `Ok(None)` from the step
/// itself; landing on a nested bucket is an ordinary variant carrying
/// the key, so traversal can skip it and continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorEntry<T> {
    /// A leaf entry with its decoded value.
    Value {
        /// The entry's key.
        key: String,
        /// The decoded value.
        value: T,
    },
    /// A nested bucket encountered in the traversal order.
    Bucket {
        /// The bucket's key within the parent.
        key: String,
    },
}

impl<T> CursorEntry<T> {
    /// Returns the key of this entry, leaf or bucket.
    pub fn key(&self) -> &str {
        match self {
            CursorEntry::Value { key, .. } | CursorEntry::Bucket { key } => key,
        }
    }
}

enum Direction {
    Forward,
    Backward,
}

/// A position within one bucket's key ordering.
///
/// Traversal order is the raw byte order of keys. Each step runs a
/// fresh bounded scan against the transaction's snapshot from the
/// remembered position, so a cursor stays usable after unrelated
/// mutations; `first`/`last` reset the position to the extrema, `seek`
/// lands on the given key or its ascending successor.
pub struct Cursor<'tx, C: ValueCodec> {
    tx: &'tx Tx<C>,
    bucket: BucketId,
    /// Key of the entry the cursor last landed on.
    pos: Option<String>,
}

impl<'tx, C: ValueCodec> Cursor<'tx, C> {
    pub(crate) fn new(tx: &'tx Tx<C>, bucket: BucketId) -> Self {
        Self {
            tx,
            bucket,
            pos: None,
        }
    }

    /// Moves to the first entry of the bucket.
    pub fn first<T: DeserializeOwned>(&mut self) -> CoreResult<Option<CursorEntry<T>>> {
        self.step(self.lower_bound(), self.upper_bound(), Direction::Forward)
    }

    /// Moves to the last entry of the bucket.
    pub fn last<T: DeserializeOwned>(&mut self) -> CoreResult<Option<CursorEntry<T>>> {
        self.step(self.lower_bound(), self.upper_bound(), Direction::Backward)
    }

    /// Moves one entry forward. Before any positioning call this
    /// behaves like [`Cursor::first`].
    pub fn next<T: DeserializeOwned>(&mut self) -> CoreResult<Option<CursorEntry<T>>> {
        let lo = match &self.pos {
            Some(key) => Bound::Excluded(keys::entry_key(self.bucket, key)),
            None => self.lower_bound(),
        };
        self.step(lo, self.upper_bound(), Direction::Forward)
    }

    /// Moves one entry backward. Before any positioning call this
    /// behaves like [`Cursor::last`].
    pub fn prev<T: DeserializeOwned>(&mut self) -> CoreResult<Option<CursorEntry<T>>> {
        let hi = match &self.pos {
            Some(key) => Bound::Excluded(keys::entry_key(self.bucket, key)),
            None => self.upper_bound(),
        };
        self.step(self.lower_bound(), hi, Direction::Backward)
    }

    /// Moves to `key`, or to the next key in ascending order if `key`
    /// is absent.
    pub fn seek<T: DeserializeOwned>(&mut self, key: &str) -> CoreResult<Option<CursorEntry<T>>> {
        let lo = Bound::Included(keys::entry_key(self.bucket, key));
        self.step(lo, self.upper_bound(), Direction::Forward)
    }

    /// Removes the entry at the cursor's current position.
    ///
    /// Fails with [`CoreError::ReadOnlyTransaction`] in a read-only
    /// transaction, [`CoreError::CursorNotPositioned`] if the cursor
    /// never landed on an entry or the entry is already gone, and
    /// [`CoreError::KeyHoldsBucket`] if it sits on a nested bucket.
    pub fn delete(&mut self) -> CoreResult<()> {
        self.tx.require_write()?;
        let key = self.pos.as_ref().ok_or(CoreError::CursorNotPositioned)?;

        let raw_key = keys::entry_key(self.bucket, key);
        match self.tx.get_raw(&raw_key)? {
            None => Err(CoreError::CursorNotPositioned),
            Some(raw) => {
                if matches!(keys::parse_value(&raw)?, RawEntry::Bucket(_)) {
                    return Err(CoreError::key_holds_bucket(key.clone()));
                }
                self.tx.remove_raw(&raw_key)
            }
        }
    }

    fn lower_bound(&self) -> Bound<Vec<u8>> {
        Bound::Included(keys::prefix_start(self.bucket))
    }

    fn upper_bound(&self) -> Bound<Vec<u8>> {
        match keys::prefix_end(self.bucket) {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        }
    }

    fn step<T: DeserializeOwned>(
        &mut self,
        lo: Bound<Vec<u8>>,
        hi: Bound<Vec<u8>>,
        direction: Direction,
    ) -> CoreResult<Option<CursorEntry<T>>> {
        let backward = matches!(direction, Direction::Backward);
        let Some((raw_key, raw_value)) = self.tx.scan_step(lo, hi, backward)? else {
            // Exhausted: keep the position, repeated steps stay exhausted.
            return Ok(None);
        };

        let key = keys::user_key(&raw_key)?.to_string();
        self.pos = Some(key.clone());

        match keys::parse_value(&raw_value)? {
            RawEntry::Leaf(payload) => Ok(Some(CursorEntry::Value {
                key,
                value: C::decode(payload)?,
            })),
            RawEntry::Bucket(_) => Ok(Some(CursorEntry::Bucket { key })),
        }
    }
}
