//! Transaction wrapper.
//!
//! A [`Tx`] wraps exactly one engine transaction, read-only or
//! read-write, fixed at creation. Bucket and cursor handles borrow the
//! transaction, so they cannot outlive it; the callback convention in
//! `Database::view`/`update` keeps the transaction itself from escaping.
//!
//! All raw table access funnels through the `pub(crate)` helpers here so
//! buckets and cursors share one code path for both transaction modes.

use std::marker::PhantomData;
use std::ops::Bound;

use acorn_codec::{JsonCodec, ValueCodec};
use redb::ReadableTable;

use crate::bucket::Bucket;
use crate::error::{CoreError, CoreResult};
use crate::keys::{self, BucketId, RawEntry, ROOT};
use crate::tables::{DATA, META, NEXT_BUCKET_ID, SEQUENCES};

pub(crate) enum TxInner {
    Read(redb::ReadTransaction),
    Write(redb::WriteTransaction),
}

/// One read-only or read-write transaction.
///
/// Obtained inside a `Database::view` or `Database::update` callback.
/// Any mutating call through a read-only transaction fails with
/// [`CoreError::ReadOnlyTransaction`].
pub struct Tx<C: ValueCodec = JsonCodec> {
    pub(crate) inner: TxInner,
    _codec: PhantomData<fn() -> C>,
}

impl<C: ValueCodec> Tx<C> {
    pub(crate) fn read(inner: redb::ReadTransaction) -> Self {
        Self {
            inner: TxInner::Read(inner),
            _codec: PhantomData,
        }
    }

    pub(crate) fn write(inner: redb::WriteTransaction) -> Self {
        Self {
            inner: TxInner::Write(inner),
            _codec: PhantomData,
        }
    }

    /// Returns whether this transaction may write.
    pub fn is_writable(&self) -> bool {
        matches!(self.inner, TxInner::Write(_))
    }

    /// Looks up a top-level bucket by name.
    ///
    /// Returns `Ok(None)` if no such bucket exists, or if the name is
    /// taken by something that is not a bucket.
    pub fn bucket(&self, name: &str) -> CoreResult<Option<Bucket<'_, C>>> {
        Ok(self
            .child_bucket_id(ROOT, name)?
            .map(|id| Bucket::new(self, id)))
    }

    /// Ensures a top-level bucket exists and returns it.
    ///
    /// Idempotent. Fails with [`CoreError::ReadOnlyTransaction`] inside a
    /// read-only transaction.
    pub fn create_bucket_if_absent(&self, name: &str) -> CoreResult<Bucket<'_, C>> {
        let id = self.create_child_bucket(ROOT, name)?;
        Ok(Bucket::new(self, id))
    }

    pub(crate) fn require_write(&self) -> CoreResult<&redb::WriteTransaction> {
        match &self.inner {
            TxInner::Write(wtx) => Ok(wtx),
            TxInner::Read(_) => Err(CoreError::ReadOnlyTransaction),
        }
    }

    pub(crate) fn commit(self) -> CoreResult<()> {
        match self.inner {
            TxInner::Write(wtx) => {
                wtx.commit()?;
                Ok(())
            }
            TxInner::Read(_) => Ok(()),
        }
    }

    pub(crate) fn abort(self) -> CoreResult<()> {
        match self.inner {
            TxInner::Write(wtx) => {
                wtx.abort()?;
                Ok(())
            }
            TxInner::Read(_) => Ok(()),
        }
    }

    /// Reads the raw stored value for an engine key.
    pub(crate) fn get_raw(&self, key: &[u8]) -> CoreResult<Option<Vec<u8>>> {
        match &self.inner {
            TxInner::Read(rtx) => get_in(&rtx.open_table(DATA)?, key),
            TxInner::Write(wtx) => get_in(&wtx.open_table(DATA)?, key),
        }
    }

    /// Writes a raw value under an engine key. Write transactions only.
    pub(crate) fn insert_raw(&self, key: &[u8], value: &[u8]) -> CoreResult<()> {
        let wtx = self.require_write()?;
        let mut table = wtx.open_table(DATA)?;
        table.insert(key, value)?;
        Ok(())
    }

    /// Removes an engine key. Write transactions only.
    pub(crate) fn remove_raw(&self, key: &[u8]) -> CoreResult<()> {
        let wtx = self.require_write()?;
        let mut table = wtx.open_table(DATA)?;
        table.remove(key)?;
        Ok(())
    }

    /// Returns the first entry within `(lo, hi)`, from whichever end.
    pub(crate) fn scan_step(
        &self,
        lo: Bound<Vec<u8>>,
        hi: Bound<Vec<u8>>,
        backward: bool,
    ) -> CoreResult<Option<(Vec<u8>, Vec<u8>)>> {
        let lo = as_bound_slice(&lo);
        let hi = as_bound_slice(&hi);
        match &self.inner {
            TxInner::Read(rtx) => step_in(&rtx.open_table(DATA)?, lo, hi, backward),
            TxInner::Write(wtx) => step_in(&wtx.open_table(DATA)?, lo, hi, backward),
        }
    }

    /// Resolves a direct child bucket id, if `name` holds one.
    pub(crate) fn child_bucket_id(
        &self,
        parent: BucketId,
        name: &str,
    ) -> CoreResult<Option<BucketId>> {
        match self.get_raw(&keys::entry_key(parent, name))? {
            Some(raw) => match keys::parse_value(&raw)? {
                RawEntry::Bucket(id) => Ok(Some(id)),
                RawEntry::Leaf(_) => Ok(None),
            },
            None => Ok(None),
        }
    }

    /// Idempotently creates a direct child bucket and returns its id.
    ///
    /// Fails with [`CoreError::KeyHoldsValue`] if the name is taken by a
    /// leaf entry.
    pub(crate) fn create_child_bucket(&self, parent: BucketId, name: &str) -> CoreResult<BucketId> {
        let wtx = self.require_write()?;

        let key = keys::entry_key(parent, name);
        if let Some(raw) = self.get_raw(&key)? {
            return match keys::parse_value(&raw)? {
                RawEntry::Bucket(id) => Ok(id),
                RawEntry::Leaf(_) => Err(CoreError::key_holds_value(name)),
            };
        }

        let id = {
            let mut meta = wtx.open_table(META)?;
            let id = meta.get(NEXT_BUCKET_ID)?.map(|g| g.value()).unwrap_or(1);
            meta.insert(NEXT_BUCKET_ID, id + 1)?;
            id
        };
        {
            let mut data = wtx.open_table(DATA)?;
            data.insert(key.as_slice(), keys::bucket_value(id).as_slice())?;
        }
        tracing::debug!(name, id, "created bucket");
        Ok(id)
    }

    /// Atomically bumps a bucket's persisted sequence counter.
    pub(crate) fn next_sequence(&self, bucket: BucketId) -> CoreResult<u64> {
        let wtx = self.require_write()?;
        let mut table = wtx.open_table(SEQUENCES)?;
        let next = table.get(bucket)?.map(|g| g.value()).unwrap_or(0) + 1;
        table.insert(bucket, next)?;
        Ok(next)
    }
}

fn as_bound_slice(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(v) => Bound::Included(v.as_slice()),
        Bound::Excluded(v) => Bound::Excluded(v.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn get_in<T>(table: &T, key: &[u8]) -> CoreResult<Option<Vec<u8>>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
}

fn step_in<T>(
    table: &T,
    lo: Bound<&[u8]>,
    hi: Bound<&[u8]>,
    backward: bool,
) -> CoreResult<Option<(Vec<u8>, Vec<u8>)>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let mut range = table.range::<&[u8]>((lo, hi))?;
    let hit = if backward {
        range.next_back()
    } else {
        range.next()
    };
    match hit {
        Some(entry) => {
            let (k, v) = entry?;
            Ok(Some((k.value().to_vec(), v.value().to_vec())))
        }
        None => Ok(None),
    }
}
