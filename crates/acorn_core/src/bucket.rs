//! Typed bucket handle.

use acorn_codec::ValueCodec;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cursor::Cursor;
use crate::error::{CoreError, CoreResult};
use crate::keys::{self, BucketId, RawEntry};
use crate::transaction::Tx;

/// Result of a bucket lookup.
///
/// The engine reports "missing" and "is a nested bucket" through one
/// collapsed signal; the facade keeps them apart so callers never
/// mistake a sub-bucket for an absent key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<T> {
    /// The key holds a leaf value, decoded into `T`.
    Value(T),
    /// The key holds a nested bucket.
    Bucket,
    /// The key is absent.
    Absent,
}

impl<T> Entry<T> {
    /// Returns the leaf value, discarding the bucket/absent distinction.
    pub fn value(self) -> Option<T> {
        match self {
            Entry::Value(v) => Some(v),
            Entry::Bucket | Entry::Absent => None,
        }
    }

    /// Returns true if the key was absent.
    pub fn is_absent(&self) -> bool {
        matches!(self, Entry::Absent)
    }
}

/// A named, ordered namespace of key-value entries inside a transaction.
///
/// Bucket handles borrow their transaction and become unusable when the
/// `view`/`update` callback returns. Two handles obtained for the same
/// name within one transaction refer to the same underlying namespace.
pub struct Bucket<'tx, C: ValueCodec> {
    tx: &'tx Tx<C>,
    id: BucketId,
}

impl<C: ValueCodec> core::fmt::Debug for Bucket<'_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bucket").field("id", &self.id).finish()
    }
}

impl<'tx, C: ValueCodec> Bucket<'tx, C> {
    pub(crate) fn new(tx: &'tx Tx<C>, id: BucketId) -> Self {
        Self { tx, id }
    }

    /// Looks up `key` and decodes the stored payload into `T`.
    ///
    /// Distinguishes leaf values, nested buckets, and absent keys; see
    /// [`Entry`]. Decode failures propagate as codec errors.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CoreResult<Entry<T>> {
        match self.tx.get_raw(&keys::entry_key(self.id, key))? {
            Some(raw) => match keys::parse_value(&raw)? {
                RawEntry::Leaf(payload) => Ok(Entry::Value(C::decode(payload)?)),
                RawEntry::Bucket(_) => Ok(Entry::Bucket),
            },
            None => Ok(Entry::Absent),
        }
    }

    /// Encodes `value` and stores it under `key`, replacing any existing
    /// leaf entry.
    ///
    /// Fails with [`CoreError::ReadOnlyTransaction`] in a read-only
    /// transaction and with [`CoreError::KeyHoldsBucket`] if `key`
    /// currently holds a nested bucket. Encoding happens before any
    /// write, so an encode failure never touches stored state.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> CoreResult<()> {
        let payload = C::encode(value)?;
        self.tx.require_write()?;

        let raw_key = keys::entry_key(self.id, key);
        if let Some(existing) = self.tx.get_raw(&raw_key)? {
            if matches!(keys::parse_value(&existing)?, RawEntry::Bucket(_)) {
                return Err(CoreError::key_holds_bucket(key));
            }
        }
        self.tx
            .insert_raw(&raw_key, &keys::leaf_value(&payload))?;
        tracing::trace!(bucket = self.id, key, len = payload.len(), "put");
        Ok(())
    }

    /// Removes the leaf entry at `key`. Removing an absent key is a
    /// no-op; removing a nested bucket fails with
    /// [`CoreError::KeyHoldsBucket`].
    pub fn delete(&self, key: &str) -> CoreResult<()> {
        self.tx.require_write()?;

        let raw_key = keys::entry_key(self.id, key);
        match self.tx.get_raw(&raw_key)? {
            None => Ok(()),
            Some(raw) => {
                if matches!(keys::parse_value(&raw)?, RawEntry::Bucket(_)) {
                    return Err(CoreError::key_holds_bucket(key));
                }
                self.tx.remove_raw(&raw_key)?;
                tracing::trace!(bucket = self.id, key, "delete");
                Ok(())
            }
        }
    }

    /// Navigates to a direct child bucket.
    ///
    /// Returns `Ok(None)` if no such child exists, or if `name` holds a
    /// leaf value.
    pub fn bucket(&self, name: &str) -> CoreResult<Option<Bucket<'tx, C>>> {
        Ok(self
            .tx
            .child_bucket_id(self.id, name)?
            .map(|id| Bucket::new(self.tx, id)))
    }

    /// Idempotently ensures a direct child bucket exists.
    pub fn create_bucket_if_absent(&self, name: &str) -> CoreResult<Bucket<'tx, C>> {
        let id = self.tx.create_child_bucket(self.id, name)?;
        Ok(Bucket::new(self.tx, id))
    }

    /// Opens a cursor positioned before the first entry of this bucket.
    pub fn cursor(&self) -> Cursor<'tx, C> {
        Cursor::new(self.tx, self.id)
    }

    /// Allocates the bucket's next sequence value and renders it as a
    /// base-32 token.
    ///
    /// Tokens from consecutive calls strictly increase as integers and
    /// are never reused, even across database reopens.
    pub fn next_id(&self) -> CoreResult<String> {
        let seq = self.tx.next_sequence(self.id)?;
        Ok(keys::sequence_token(seq))
    }
}
