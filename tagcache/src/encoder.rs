//! Pluggable value encoders.
//!
//! An [`Encoder`] turns any `Serialize` value into the opaque bytes stored
//! under a cache key and back again. The cache never looks inside those
//! bytes, so every encoder is a drop-in replacement for the others.
//!
//! | Encoder | Format | Feature |
//! |---------|--------|---------|
//! | [`JsonEncoder`] | JSON text | always |
//! | [`MessagePackEncoder`] | MessagePack, structs as maps | `msgpack` |
//! | [`BincodeEncoder`] | bincode 1.x | `bincode` |
//!
//! [`Encoding`] names one of them and is what [`CacheConfig`](crate::CacheConfig)
//! carries.

use crate::error::{CacheError, CacheResult};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;

/// Converts typed values to and from stored bytes.
pub trait Encoder: Send + Sync {
    /// Short name of the format, used in logs.
    fn name(&self) -> &'static str;

    /// Encode a value.
    ///
    /// Fails with [`CacheError::Encode`] when the value cannot be represented
    /// in this format. No partial output is returned.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<Vec<u8>>;

    /// Decode bytes into a new value.
    ///
    /// Fails with [`CacheError::Decode`] when the bytes are malformed,
    /// truncated or describe a different shape than `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<T>;

    /// Decode bytes into an existing value.
    ///
    /// `target` is only overwritten when decoding succeeds.
    fn decode_into<T: DeserializeOwned>(&self, bytes: &[u8], target: &mut T) -> CacheResult<()> {
        *target = self.decode(bytes)?;
        Ok(())
    }
}

/// JSON encoder backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CacheError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<T> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))
    }
}

/// MessagePack encoder backed by `rmp-serde`.
///
/// Structs are written as maps keyed by field name, so entries survive
/// field reordering.
#[cfg(feature = "msgpack")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackEncoder;

#[cfg(feature = "msgpack")]
impl Encoder for MessagePackEncoder {
    fn name(&self) -> &'static str {
        "msgpack"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<Vec<u8>> {
        rmp_serde::to_vec_named(value).map_err(|e| CacheError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<T> {
        rmp_serde::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))
    }
}

/// Compact binary encoder backed by `bincode`.
#[cfg(feature = "bincode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeEncoder;

#[cfg(feature = "bincode")]
impl Encoder for BincodeEncoder {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<Vec<u8>> {
        bincode::serialize(value).map_err(|e| CacheError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<T> {
        bincode::deserialize(bytes).map_err(|e| CacheError::Decode(e.to_string()))
    }
}

/// Encoding selected at cache construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// JSON text
    #[default]
    Json,
    /// MessagePack
    #[cfg(feature = "msgpack")]
    MessagePack,
    /// bincode
    #[cfg(feature = "bincode")]
    Bincode,
}

impl Encoding {
    /// Get encoding from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Encoding::Json),
            #[cfg(feature = "msgpack")]
            "msgpack" | "messagepack" => Some(Encoding::MessagePack),
            #[cfg(feature = "bincode")]
            "bincode" => Some(Encoding::Bincode),
            _ => None,
        }
    }

    /// Get encoding name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Json => JsonEncoder.name(),
            #[cfg(feature = "msgpack")]
            Encoding::MessagePack => MessagePackEncoder.name(),
            #[cfg(feature = "bincode")]
            Encoding::Bincode => BincodeEncoder.name(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Encoder for Encoding {
    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CacheResult<Vec<u8>> {
        match self {
            Encoding::Json => JsonEncoder.encode(value),
            #[cfg(feature = "msgpack")]
            Encoding::MessagePack => MessagePackEncoder.encode(value),
            #[cfg(feature = "bincode")]
            Encoding::Bincode => BincodeEncoder.encode(value),
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<T> {
        match self {
            Encoding::Json => JsonEncoder.decode(bytes),
            #[cfg(feature = "msgpack")]
            Encoding::MessagePack => MessagePackEncoder.decode(bytes),
            #[cfg(feature = "bincode")]
            Encoding::Bincode => BincodeEncoder.decode(bytes),
        }
    }
}
