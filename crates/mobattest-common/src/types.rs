// ============================================
// File: crates/mobattest-common/src/types.rs
// ============================================
//! # Core Type Definitions
//!
//! ## Creation Reason
//! Centralizes the identifiers exchanged during attestation so that every
//! crate parses, compares and logs them the same way.
//!
//! ## Main Functionality
//! - `ResponderId`: Name of the enclave service a handshake targets
//! - `Measurement`: 32-byte MRENCLAVE / MRSIGNER value
//! - `ChannelId`: 32-byte channel-binding value of an attested session
//!
//! ## ⚠️ Important Note for Next Developer
//! - `ResponderId` is embedded in the auth request with a u16 length prefix,
//!   so construction rejects ids longer than `MAX_RESPONDER_ID_LEN`
//! - `Measurement` serializes as lowercase hex in human-readable formats
//! - `ChannelId` Display prints a short prefix only, for log lines
//!
//! ## Last Modified
//! v0.1.0 - Initial type definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, Result};

// ============================================
// Constants
// ============================================

/// Size of an enclave measurement in bytes.
pub const MEASUREMENT_SIZE: usize = 32;

/// Size of a channel-binding value in bytes.
pub const CHANNEL_ID_SIZE: usize = 32;

/// Longest responder id accepted (bounded by the wire length prefix).
pub const MAX_RESPONDER_ID_LEN: usize = 1024;

// ============================================
// ResponderId
// ============================================

/// Identity of the enclave service a handshake is addressed to.
///
/// Usually the host name of the service, e.g. `fog-view.example.com`.
/// The responder checks this value so that a request meant for one
/// enclave cannot be replayed against another.
///
/// # Example
/// ```
/// use mobattest_common::ResponderId;
///
/// let id: ResponderId = "fog-view.example.com".parse().unwrap();
/// assert_eq!(id.as_str(), "fog-view.example.com");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResponderId(String);

impl ResponderId {
    /// Creates a responder id after validating it.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the id is empty, too long or contains
    /// whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(CommonError::invalid_input("responder_id", "must not be empty"));
        }
        if id.len() > MAX_RESPONDER_ID_LEN {
            return Err(CommonError::invalid_input(
                "responder_id",
                format!("longer than {MAX_RESPONDER_ID_LEN} bytes"),
            ));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(CommonError::invalid_input("responder_id", "contains whitespace"));
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the id as raw bytes (as placed on the wire).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for ResponderId {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResponderId {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ResponderId> for String {
    fn from(id: ResponderId) -> Self {
        id.0
    }
}

impl fmt::Display for ResponderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ResponderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResponderId({})", self.0)
    }
}

// ============================================
// Measurement
// ============================================

/// A 32-byte enclave measurement (MRENCLAVE or MRSIGNER).
///
/// # Example
/// ```
/// use mobattest_common::Measurement;
///
/// let hex = "deadbeef".repeat(8);
/// let m = Measurement::from_hex(&hex).unwrap();
/// assert_eq!(m.to_hex(), hex);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Measurement([u8; MEASUREMENT_SIZE]);

impl Measurement {
    /// Wraps raw measurement bytes.
    #[must_use]
    pub const fn new(bytes: [u8; MEASUREMENT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a measurement from a slice.
    ///
    /// # Errors
    /// Returns `InvalidLength` unless the slice is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; MEASUREMENT_SIZE] = bytes
            .try_into()
            .map_err(|_| CommonError::invalid_length(MEASUREMENT_SIZE, bytes.len()))?;
        Ok(Self(arr))
    }

    /// Parses a measurement from a hex string (64 hex digits).
    ///
    /// # Errors
    /// Returns `Decoding` for non-hex input and `InvalidLength` for a
    /// value that is not 32 bytes long.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())?;
        Self::from_slice(&bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; MEASUREMENT_SIZE] {
        &self.0
    }

    /// Returns the lowercase hex encoding.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Measurement {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Measurement({}...)", hex::encode(&self.0[..4]))
    }
}

impl Serialize for Measurement {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Measurement {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Self::from_slice(&bytes).map_err(serde::de::Error::custom)
        }
    }
}

// ============================================
// ChannelId
// ============================================

/// Channel-binding value derived from a handshake transcript.
///
/// Travels in every attested envelope so the peer can detect a session
/// mismatch without first attempting decryption.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ChannelId([u8; CHANNEL_ID_SIZE]);

impl ChannelId {
    /// Wraps raw channel-binding bytes.
    #[must_use]
    pub const fn new(bytes: [u8; CHANNEL_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a channel id from a slice.
    ///
    /// Returns `None` unless the slice is exactly 32 bytes.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; CHANNEL_ID_SIZE] {
        &self.0
    }

    /// Returns an owned copy of the bytes, as placed in the envelope.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId({}...)", hex::encode(&self.0[..4]))
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responder_id_validation() {
        assert!(ResponderId::new("fog-view.example.com").is_ok());
        assert!(ResponderId::new("").is_err());
        assert!(ResponderId::new("has space").is_err());
        assert!(ResponderId::new("a".repeat(MAX_RESPONDER_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_responder_id_serde() {
        let id: ResponderId = serde_json::from_str("\"consensus.example.com:443\"").unwrap();
        assert_eq!(id.as_str(), "consensus.example.com:443");
        assert!(serde_json::from_str::<ResponderId>("\"\"").is_err());
    }

    #[test]
    fn test_measurement_hex() {
        let hex = "deadbeef".repeat(8);
        let m: Measurement = hex.parse().unwrap();
        assert_eq!(m.as_bytes()[..4], [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(m.to_string(), hex);

        assert!(matches!(
            Measurement::from_hex("deadbeef"),
            Err(CommonError::InvalidLength { expected: 32, actual: 4 })
        ));
        assert!(matches!(
            Measurement::from_hex(&"zz".repeat(32)),
            Err(CommonError::Decoding { .. })
        ));
    }

    #[test]
    fn test_measurement_serde_is_hex() {
        let m = Measurement::new([0xab; MEASUREMENT_SIZE]);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: Measurement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_channel_id_from_slice() {
        assert!(ChannelId::from_slice(&[0u8; 31]).is_none());
        let id = ChannelId::from_slice(&[7u8; 32]).unwrap();
        assert_eq!(id.to_vec(), vec![7u8; 32]);
        assert_eq!(id.to_string(), "0707070707070707");
    }
}
