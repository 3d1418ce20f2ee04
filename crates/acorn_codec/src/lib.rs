//! # acorn codec
//!
//! Pluggable value codecs for acorn.
//!
//! The storage layer treats every value as an opaque byte payload; this
//! crate owns the conversion between in-memory values and those payloads.
//! The contract is the round-trip law: for every value a codec can
//! encode, decoding the encoded bytes yields a structurally equal value.
//!
//! Two codecs are provided:
//! - [`JsonCodec`] — the default. Textual, human-inspectable, maps are
//!   unordered, numbers follow JSON's number model.
//! - [`CborCodec`] — compact binary CBOR for size-sensitive data.
//!
//! ## Usage
//!
//! ```
//! use acorn_codec::{JsonCodec, ValueCodec};
//!
//! let bytes = JsonCodec::encode(&vec![1u32, 2, 3]).unwrap();
//! let back: Vec<u32> = JsonCodec::decode(&bytes).unwrap();
//! assert_eq!(back, vec![1, 2, 3]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;

pub use error::{CodecError, CodecResult};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A value codec: converts serde values to and from opaque byte payloads.
///
/// Codecs are stateless capabilities selected at the type level, so the
/// database handle can be generic over the codec without paying for
/// dynamic dispatch on every get/put.
pub trait ValueCodec {
    /// Encode a value to bytes.
    ///
    /// Fails with [`CodecError::EncodingFailed`] if the value contains
    /// data the codec cannot represent.
    fn encode<T: Serialize>(value: &T) -> CodecResult<Vec<u8>>;

    /// Decode bytes into a value of the requested shape.
    ///
    /// Fails with [`CodecError::DecodingFailed`] if the bytes are
    /// malformed or do not match `T`.
    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T>;
}

/// JSON codec backed by `serde_json`. The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn encode<T: Serialize>(value: &T) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CodecError::encoding_failed(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
    }
}

/// Binary CBOR codec backed by `ciborium`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl ValueCodec for CborCodec {
    fn encode<T: Serialize>(value: &T) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
        Ok(buf)
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
        ciborium::from_reader(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Account {
        name: String,
        balance: i64,
        tags: Vec<String>,
    }

    fn sample() -> Account {
        Account {
            name: "Ada".to_string(),
            balance: -250,
            tags: vec!["admin".to_string(), "beta".to_string()],
        }
    }

    #[test]
    fn json_roundtrip_struct() {
        let account = sample();
        let bytes = JsonCodec::encode(&account).unwrap();
        let decoded: Account = JsonCodec::decode(&bytes).unwrap();
        assert_eq!(account, decoded);
    }

    #[test]
    fn cbor_roundtrip_struct() {
        let account = sample();
        let bytes = CborCodec::encode(&account).unwrap();
        let decoded: Account = CborCodec::decode(&bytes).unwrap();
        assert_eq!(account, decoded);
    }

    #[test]
    fn json_roundtrip_map() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u64);
        map.insert("b".to_string(), 2u64);
        let bytes = JsonCodec::encode(&map).unwrap();
        let decoded: BTreeMap<String, u64> = JsonCodec::decode(&bytes).unwrap();
        assert_eq!(map, decoded);
    }

    #[test]
    fn json_decode_shape_mismatch() {
        let bytes = JsonCodec::encode(&"just a string").unwrap();
        let err = JsonCodec::decode::<Account>(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::DecodingFailed { .. }));
    }

    #[test]
    fn json_decode_malformed() {
        let err = JsonCodec::decode::<Account>(b"{not json").unwrap_err();
        assert!(matches!(err, CodecError::DecodingFailed { .. }));
    }

    #[test]
    fn json_key_order_is_irrelevant() {
        let a: Account = JsonCodec::decode(
            br#"{"name":"Ada","balance":-250,"tags":["admin","beta"]}"#,
        )
        .unwrap();
        let b: Account = JsonCodec::decode(
            br#"{"tags":["admin","beta"],"balance":-250,"name":"Ada"}"#,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cbor_decode_malformed() {
        let err = CborCodec::decode::<Account>(&[0xff, 0x00]).unwrap_err();
        assert!(matches!(err, CodecError::DecodingFailed { .. }));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn json_roundtrip_law(
                name in ".*",
                balance in any::<i64>(),
                tags in proptest::collection::vec(".*", 0..8),
            ) {
                let account = Account { name, balance, tags };
                let bytes = JsonCodec::encode(&account).unwrap();
                let decoded: Account = JsonCodec::decode(&bytes).unwrap();
                prop_assert_eq!(account, decoded);
            }

            #[test]
            fn cbor_roundtrip_law(
                name in ".*",
                balance in any::<i64>(),
                tags in proptest::collection::vec(".*", 0..8),
            ) {
                let account = Account { name, balance, tags };
                let bytes = CborCodec::encode(&account).unwrap();
                let decoded: Account = CborCodec::decode(&bytes).unwrap();
                prop_assert_eq!(account, decoded);
            }
        }
    }
}
