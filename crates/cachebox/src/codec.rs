// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Value encoding façade.
//!
//! [`marshal`] and [`unmarshal`] convert between application values and the
//! byte payloads the cache stores. Raw byte types pass through untouched;
//! [`MsgPack`] wraps a value for MessagePack encoding and [`Json`] for the
//! JSON fallback. Unmarshaling a miss (`None`) yields a dedicated sentinel
//! recognizable via [`CodecError::is_miss`], enabling hit/miss branches in
//! calling code.
//!
//! ```
//! use cachebox::codec::{self, Json};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     name: String,
//! }
//!
//! let user = User { name: "ada".into() };
//! let payload = codec::marshal(&Json(&user))?;
//!
//! let Json(decoded): Json<User> = codec::unmarshal(Some(&payload))?;
//! assert_eq!(decoded, user);
//!
//! // A miss is not decodable:
//! let err = codec::unmarshal::<Json<User>>(None).unwrap_err();
//! assert!(err.is_miss());
//! # Ok::<(), cachebox::codec::CodecError>(())
//! ```

use std::error::Error as StdError;

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

/// Marker cause for unmarshaling a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Miss;

impl std::fmt::Display for Miss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("cachebox: can't unmarshal miss")
    }
}

impl StdError for Miss {}

/// An error from marshaling or unmarshaling a value.
#[ohno::error]
pub struct CodecError;

impl CodecError {
    /// Creates the miss sentinel returned by [`unmarshal`] for `None` input.
    #[must_use]
    pub fn miss() -> Self {
        Self::caused_by(Miss)
    }

    /// Returns `true` if this error is the miss sentinel.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        self.source().and_then(|s| s.downcast_ref::<Miss>()).is_some()
    }
}

/// A value that can be encoded into cache payload bytes.
pub trait Encode {
    /// Encodes the value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying encoder fails.
    fn encode(&self) -> Result<Bytes, CodecError>;
}

/// A value that can be decoded from cache payload bytes.
pub trait Decode: Sized {
    /// Decodes a value from the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying decoder fails.
    fn decode(b: &[u8]) -> Result<Self, CodecError>;
}

/// Encodes a value into payload bytes.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn marshal<T: Encode + ?Sized>(value: &T) -> Result<Bytes, CodecError> {
    value.encode()
}

/// Decodes payload bytes into a value.
///
/// `None` (a miss) yields the miss sentinel; see [`CodecError::is_miss`].
///
/// # Errors
///
/// Returns the miss sentinel for `None` input, or a decoder error.
pub fn unmarshal<T: Decode>(b: Option<&[u8]>) -> Result<T, CodecError> {
    match b {
        None => Err(CodecError::miss()),
        Some(b) => T::decode(b),
    }
}

impl Encode for Bytes {
    fn encode(&self) -> Result<Bytes, CodecError> {
        Ok(self.clone())
    }
}

impl Encode for Vec<u8> {
    fn encode(&self) -> Result<Bytes, CodecError> {
        Ok(Bytes::copy_from_slice(self))
    }
}

impl Encode for [u8] {
    fn encode(&self) -> Result<Bytes, CodecError> {
        Ok(Bytes::copy_from_slice(self))
    }
}

impl Decode for Bytes {
    fn decode(b: &[u8]) -> Result<Self, CodecError> {
        Ok(Bytes::copy_from_slice(b))
    }
}

impl Decode for Vec<u8> {
    fn decode(b: &[u8]) -> Result<Self, CodecError> {
        Ok(b.to_vec())
    }
}

/// Wrapper selecting MessagePack encoding for a serde value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgPack<T>(pub T);

impl<T: Serialize> Encode for MsgPack<T> {
    fn encode(&self) -> Result<Bytes, CodecError> {
        rmp_serde::to_vec(&self.0).map(Bytes::from).map_err(CodecError::caused_by)
    }
}

impl<T: DeserializeOwned> Decode for MsgPack<T> {
    fn decode(b: &[u8]) -> Result<Self, CodecError> {
        rmp_serde::from_slice(b).map(MsgPack).map_err(CodecError::caused_by)
    }
}

/// Wrapper selecting JSON encoding for a serde value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Encode for Json<T> {
    fn encode(&self) -> Result<Bytes, CodecError> {
        serde_json::to_vec(&self.0).map(Bytes::from).map_err(CodecError::caused_by)
    }
}

impl<T: DeserializeOwned> Decode for Json<T> {
    fn decode(b: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(b).map(Json).map_err(CodecError::caused_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Payload {
        id: u64,
        name: String,
    }

    fn payload() -> Payload {
        Payload {
            id: 42,
            name: "ada".into(),
        }
    }

    #[test]
    fn raw_bytes_pass_through() {
        let raw = Bytes::from_static(b"raw");
        assert_eq!(marshal(&raw).expect("marshal failed"), raw);

        let decoded: Bytes = unmarshal(Some(b"raw")).expect("unmarshal failed");
        assert_eq!(decoded, raw);
    }

    #[test]
    fn unmarshal_miss_returns_the_sentinel() {
        let err = unmarshal::<Bytes>(None).expect_err("miss should not decode");
        assert!(err.is_miss());
    }

    #[test]
    fn decoder_errors_are_not_the_sentinel() {
        let err = unmarshal::<Json<Payload>>(Some(b"not json")).expect_err("garbage should not decode");
        assert!(!err.is_miss());
    }

    #[test]
    fn json_round_trip() {
        let encoded = marshal(&Json(payload())).expect("marshal failed");
        let Json(decoded): Json<Payload> = unmarshal(Some(&encoded)).expect("unmarshal failed");
        assert_eq!(decoded, payload());
    }

    #[test]
    fn msgpack_round_trip() {
        let encoded = marshal(&MsgPack(payload())).expect("marshal failed");
        let MsgPack(decoded): MsgPack<Payload> = unmarshal(Some(&encoded)).expect("unmarshal failed");
        assert_eq!(decoded, payload());
    }

    #[test]
    fn msgpack_is_denser_than_json() {
        let msgpack = marshal(&MsgPack(payload())).expect("marshal failed");
        let json = marshal(&Json(payload())).expect("marshal failed");
        assert!(msgpack.len() < json.len());
    }
}
