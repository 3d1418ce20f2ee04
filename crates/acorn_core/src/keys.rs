//! Byte-keyspace mapping.
//!
//! redb exposes flat byte-ordered tables, so the nested bucket tree is
//! flattened into the `data` table here:
//!
//! - Entry key: 8-byte big-endian bucket id, then the raw UTF-8 key
//!   bytes. The fixed-width prefix keeps one bucket's entries contiguous
//!   and ordered exactly by the byte order of their user keys.
//! - Entry value: one tag byte, then the body. Tag 0 is a leaf (the body
//!   is the codec payload); tag 1 is a child-bucket marker (the body is
//!   the child's 8-byte big-endian id). Markers live in the parent's
//!   keyspace, which is what lets cursors surface nested buckets
//!   interleaved with leaves.

use crate::error::{CoreError, CoreResult};

/// Identifier of one bucket namespace.
pub(crate) type BucketId = u64;

/// The top-level namespace. Never allocated to a user bucket.
pub(crate) const ROOT: BucketId = 0;

const TAG_LEAF: u8 = 0;
const TAG_BUCKET: u8 = 1;

const PREFIX_LEN: usize = 8;

/// Builds the engine key for `key` inside `bucket`.
pub(crate) fn entry_key(bucket: BucketId, key: &str) -> Vec<u8> {
    let raw = key.as_bytes();
    let mut buf = Vec::with_capacity(PREFIX_LEN + raw.len());
    buf.extend_from_slice(&bucket.to_be_bytes());
    buf.extend_from_slice(raw);
    buf
}

/// Strips the bucket prefix from an engine key, returning the user key.
pub(crate) fn user_key(raw: &[u8]) -> CoreResult<&str> {
    if raw.len() < PREFIX_LEN {
        return Err(CoreError::corrupt("entry key shorter than bucket prefix"));
    }
    std::str::from_utf8(&raw[PREFIX_LEN..])
        .map_err(|_| CoreError::corrupt("entry key is not valid UTF-8"))
}

/// Inclusive lower bound of a bucket's keyspace.
pub(crate) fn prefix_start(bucket: BucketId) -> Vec<u8> {
    bucket.to_be_bytes().to_vec()
}

/// Exclusive upper bound of a bucket's keyspace.
///
/// `None` means unbounded; only reachable for `u64::MAX`, which the
/// allocator never hands out.
pub(crate) fn prefix_end(bucket: BucketId) -> Option<Vec<u8>> {
    bucket.checked_add(1).map(|next| next.to_be_bytes().to_vec())
}

/// A decoded entry value.
pub(crate) enum RawEntry<'a> {
    /// Leaf entry carrying a codec payload.
    Leaf(&'a [u8]),
    /// Child-bucket marker carrying the child's id.
    Bucket(BucketId),
}

/// Builds the stored bytes for a leaf payload.
pub(crate) fn leaf_value(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + payload.len());
    buf.push(TAG_LEAF);
    buf.extend_from_slice(payload);
    buf
}

/// Builds the stored bytes for a child-bucket marker.
pub(crate) fn bucket_value(child: BucketId) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + PREFIX_LEN);
    buf.push(TAG_BUCKET);
    buf.extend_from_slice(&child.to_be_bytes());
    buf
}

/// Parses a stored entry value.
pub(crate) fn parse_value(raw: &[u8]) -> CoreResult<RawEntry<'_>> {
    match raw.split_first() {
        Some((&TAG_LEAF, payload)) => Ok(RawEntry::Leaf(payload)),
        Some((&TAG_BUCKET, body)) => {
            let id: [u8; PREFIX_LEN] = body
                .try_into()
                .map_err(|_| CoreError::corrupt("bucket marker has malformed id"))?;
            Ok(RawEntry::Bucket(u64::from_be_bytes(id)))
        }
        Some((tag, _)) => Err(CoreError::corrupt(format!("unknown entry tag {tag}"))),
        None => Err(CoreError::corrupt("empty entry value")),
    }
}

/// Renders a sequence value as a base-32 token.
///
/// Alphabet is `0-9a-v`, matching the tokens the original issued, so the
/// same counter value always yields the same key text.
pub(crate) fn sequence_token(mut n: u64) -> String {
    const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";
    let mut buf = [0u8; 13];
    let mut at = buf.len();
    loop {
        at -= 1;
        buf[at] = DIGITS[(n % 32) as usize];
        n /= 32;
        if n == 0 {
            break;
        }
    }
    // The alphabet is ASCII, so the slice is valid UTF-8.
    String::from_utf8_lossy(&buf[at..]).into_owned()
}
